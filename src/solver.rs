use std::fs;
use std::path::Path;

use log::info;
use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;

use crate::{
    disc::{
        flux::FluxModel, godunov::GodunovStepper, mesh::mesh1d::Mesh1d,
        riemann_solver::InterfaceRule,
    },
    error::SolverError,
    io::write_to_csv::write_to_csv,
    temporal_disc::TemporalDisc,
};

/// Upper bound on the states reserved up front by `run_collect`.
const HISTORY_PREALLOC: usize = 4096;

#[derive(Clone, Debug, PartialEq)]
pub struct SolverParameters {
    pub cfl: f64,
    pub final_time: f64,
    pub final_step: Option<usize>,
    pub time_step: Option<f64>,
    pub output_interval: usize,
    pub interface_rule: InterfaceRule,
    pub parallel: bool,
}
impl SolverParameters {
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.cfl.is_finite() && self.cfl > 0.0) {
            return Err(SolverError::InvalidParameter(format!(
                "cfl must be positive, got {}",
                self.cfl
            )));
        }
        if self.output_interval == 0 {
            return Err(SolverError::InvalidParameter(
                "output_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            cfl: 0.4,
            final_time: 800.0,
            final_step: None,
            time_step: None,
            output_interval: 100,
            interface_rule: InterfaceRule::default(),
            parallel: false,
        }
    }
}

pub struct Solver<'a, F: FluxModel> {
    pub solutions: Array1<f64>,
    pub disc: GodunovStepper<F>,
    pub temporal_disc: TemporalDisc,
    pub mesh: &'a Mesh1d,
    pub solver_params: &'a SolverParameters,
}
impl<'a, F: FluxModel> Solver<'a, F> {
    /// Checks the initial state against the mesh and the CFL bound before anything is marched.
    pub fn new(
        flux: F,
        mesh: &'a Mesh1d,
        solver_params: &'a SolverParameters,
        solutions: Array1<f64>,
    ) -> Result<Self, SolverError> {
        solver_params.validate()?;
        mesh.check_state(solutions.view())?;
        let disc = GodunovStepper::new(flux, solver_params.interface_rule)?
            .with_parallel(solver_params.parallel);
        let time_step = match solver_params.time_step {
            Some(time_step) => time_step,
            None => compute_time_step(&disc.flux, solutions.view(), mesh.dx, solver_params.cfl)?,
        };
        let courant = disc.check_stability(solutions.view(), mesh.dx, time_step)?;
        let temporal_disc = TemporalDisc::new(
            time_step,
            solver_params.final_time,
            solver_params.final_step,
        )?;
        info!(
            "{} cells, dx = {}, dt = {}, courant number {:.3}, {:?} interface rule",
            mesh.elem_num, mesh.dx, time_step, courant, solver_params.interface_rule
        );
        Ok(Self {
            solutions,
            disc,
            temporal_disc,
            mesh,
            solver_params,
        })
    }
    pub fn time_step(&self) -> f64 {
        self.temporal_disc.time_step
    }
    /// Runs the remaining steps and returns every new state, one per completed step.
    pub fn run_collect(&mut self) -> Result<Vec<Array1<f64>>, SolverError> {
        let mut history = Vec::with_capacity(history_capacity(self.temporal_disc.total_steps));
        let solutions = self.temporal_disc.time_march(
            &self.disc,
            self.mesh.dx,
            self.solutions.clone(),
            |_, _, state| {
                history.push(state.to_owned());
                Ok(())
            },
        )?;
        self.solutions = solutions;
        Ok(history)
    }
    /// Runs the remaining steps, writing `solutions_<step>.csv` snapshots into `output_dir`
    /// for the starting state, every `output_interval` steps and the final step.
    pub fn solve<P: AsRef<Path>>(&mut self, output_dir: P) -> Result<(), SolverError> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;
        let mesh = self.mesh;
        let output_interval = self.solver_params.output_interval;
        let final_step = self.temporal_disc.total_steps;
        write_to_csv(
            self.solutions.view(),
            mesh,
            self.temporal_disc.curr_time,
            output_dir.join(format!("solutions_{}.csv", self.temporal_disc.curr_step)),
        )?;
        let solutions = self.temporal_disc.time_march(
            &self.disc,
            mesh.dx,
            self.solutions.clone(),
            |step, time, state| {
                if step % output_interval == 0 || step == final_step {
                    write_to_csv(
                        state,
                        mesh,
                        time,
                        output_dir.join(format!("solutions_{step}.csv")),
                    )?;
                }
                Ok(())
            },
        )?;
        self.solutions = solutions;
        info!(
            "finished at t = {} after {} steps, total mass {:.6}",
            self.temporal_disc.curr_time,
            self.temporal_disc.curr_step,
            self.solutions.sum() * mesh.dx
        );
        Ok(())
    }
}

fn history_capacity(total_steps: usize) -> usize {
    total_steps.min(HISTORY_PREALLOC)
}

/// Largest stable step for `cfl` given the wave speeds present in `solutions`.
pub fn compute_time_step<F: FluxModel>(
    flux: &F,
    solutions: ArrayView1<f64>,
    dx: f64,
    cfl: f64,
) -> Result<f64, SolverError> {
    if solutions.iter().any(|u| !u.is_finite()) {
        return Err(SolverError::NonFiniteState);
    }
    let umin = *solutions.min().map_err(|_| SolverError::NonFiniteState)?;
    let umax = *solutions.max().map_err(|_| SolverError::NonFiniteState)?;
    let speed = flux.max_wave_speed(umin, umax);
    if speed <= f64::EPSILON {
        return Err(SolverError::InvalidGrid(format!(
            "wave speed vanishes on [{umin}, {umax}], a time step cannot be derived from the cfl number"
        )));
    }
    Ok(cfl * dx / speed)
}
