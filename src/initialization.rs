use std::path::Path;

use ndarray::Array1;
use serde::Deserialize;

use crate::{
    disc::mesh::mesh1d::Mesh1d,
    error::SolverError,
    io::param_parser::{ParamError, SolverParamParser},
    solver::SolverParameters,
};

/// Density profile at `t = 0`, evaluated at cell centers.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InitialCondition {
    /// Queue at jam density behind a traffic light at `x_light`, empty road ahead.
    RedLight { umax: f64, x_light: f64 },
    Riemann {
        left: f64,
        right: f64,
        x_discontinuity: f64,
    },
    Uniform { value: f64 },
}
impl InitialCondition {
    pub fn evaluate(&self, x: f64) -> f64 {
        match *self {
            InitialCondition::RedLight { umax, x_light } => {
                if x < x_light {
                    umax
                } else {
                    0.0
                }
            }
            InitialCondition::Riemann {
                left,
                right,
                x_discontinuity,
            } => {
                if x < x_discontinuity {
                    left
                } else {
                    right
                }
            }
            InitialCondition::Uniform { value } => value,
        }
    }
}

pub fn initialize_params_by_file<P: AsRef<Path>>(
    file_path: P,
) -> Result<(SolverParamParser, SolverParameters), ParamError> {
    let parser = SolverParamParser::parse(file_path)?;
    let solver_params = SolverParameters {
        cfl: parser.cfl,
        final_time: parser.final_time,
        final_step: parser.final_step,
        time_step: parser.time_step,
        output_interval: parser.output_interval,
        interface_rule: parser.interface_rule,
        parallel: parser.parallel,
    };
    Ok((parser, solver_params))
}
pub fn initialize_mesh1d(
    elem_num: usize,
    left_coord: f64,
    right_coord: f64,
) -> Result<Mesh1d, SolverError> {
    Mesh1d::new(elem_num, left_coord, right_coord)
}
pub fn initialize_solution(mesh: &Mesh1d, initial_condition: &InitialCondition) -> Array1<f64> {
    mesh.cell_centers.mapv(|x| initial_condition.evaluate(x))
}
