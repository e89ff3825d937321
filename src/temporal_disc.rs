use log::{debug, info};
use ndarray::{Array1, ArrayView1};

use crate::{
    disc::{
        boundary::{BoundaryPosition, OpenBoundary},
        flux::FluxModel,
        godunov::{GodunovStepper, check_scheme_parameters},
    },
    error::SolverError,
};

/// Explicit Euler time marching with a fixed step.
pub struct TemporalDisc {
    pub curr_time: f64,
    pub curr_step: usize,
    pub time_step: f64,
    pub total_steps: usize,
}
impl TemporalDisc {
    /// Plans `ceil(final_time / time_step)` steps, optionally capped at `final_step`.
    pub fn new(
        time_step: f64,
        final_time: f64,
        final_step: Option<usize>,
    ) -> Result<Self, SolverError> {
        if !(time_step.is_finite() && time_step > 0.0) {
            return Err(SolverError::InvalidGrid(format!(
                "dt must be positive, got {time_step}"
            )));
        }
        if !(final_time.is_finite() && final_time >= 0.0) {
            return Err(SolverError::InvalidGrid(format!(
                "final time must be non-negative, got {final_time}"
            )));
        }
        let mut total_steps = step_count(final_time, time_step);
        if let Some(cap) = final_step {
            total_steps = total_steps.min(cap);
        }
        Ok(Self {
            curr_time: 0.0,
            curr_step: 0,
            time_step,
            total_steps,
        })
    }
    /// Advances `solutions` until the planned step count is reached and returns the final state.
    ///
    /// `observer` receives every new state together with its step index and time.
    pub fn time_march<F, O>(
        &mut self,
        stepper: &GodunovStepper<F>,
        dx: f64,
        mut solutions: Array1<f64>,
        mut observer: O,
    ) -> Result<Array1<f64>, SolverError>
    where
        F: FluxModel,
        O: FnMut(usize, f64, ArrayView1<f64>) -> Result<(), SolverError>,
    {
        check_scheme_parameters(solutions.len(), dx, self.time_step)?;
        let mut boundaries = [
            OpenBoundary::new(BoundaryPosition::Left, solutions.view())?,
            OpenBoundary::new(BoundaryPosition::Right, solutions.view())?,
        ];
        info!(
            "marching {} steps with dt = {} to t = {}",
            self.total_steps - self.curr_step,
            self.time_step,
            self.total_steps as f64 * self.time_step
        );
        while self.curr_step < self.total_steps {
            solutions = stepper.step(solutions.view(), dx, self.time_step)?;
            self.curr_step += 1;
            self.curr_time = self.curr_step as f64 * self.time_step;
            for boundary in boundaries.iter_mut() {
                boundary.monitor(solutions.view(), self.curr_step);
            }
            debug!(
                "step {} t = {:.4} mass = {:.6}",
                self.curr_step,
                self.curr_time,
                solutions.sum() * dx
            );
            observer(self.curr_step, self.curr_time, solutions.view())?;
        }
        Ok(solutions)
    }
}

/// `ceil(final_time / time_step)`, treating ratios within round-off of an integer as exact.
fn step_count(final_time: f64, time_step: f64) -> usize {
    let ratio = final_time / time_step;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest as usize
    } else {
        ratio.ceil() as usize
    }
}
