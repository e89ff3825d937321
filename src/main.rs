use anyhow::{Context, Result};
use log::info;

use lwr_godunov::initialization::{
    initialize_mesh1d, initialize_params_by_file, initialize_solution,
};
use lwr_godunov::solver::Solver;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let param_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "inputs/solverparam.json".to_string());
    let (params, solver_params) = initialize_params_by_file(&param_file)
        .with_context(|| format!("reading parameters from {param_file}"))?;
    params.flux.validate().context("checking flux parameters")?;

    let mesh = initialize_mesh1d(
        params.mesh.elem_num,
        params.mesh.left_coord,
        params.mesh.right_coord,
    )
    .context("building mesh")?;
    let solutions = initialize_solution(&mesh, &params.initial_condition);
    info!("initial condition: {:?}", params.initial_condition);

    let mut solver = Solver::new(params.flux, &mesh, &solver_params, solutions)
        .context("setting up solver")?;
    solver
        .solve(&params.output_dir)
        .with_context(|| format!("running simulation into {}", params.output_dir))?;
    Ok(())
}
