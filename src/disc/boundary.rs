use log::warn;
use ndarray::ArrayView1;

use crate::error::SolverError;

/// Tolerance on the density change that counts as a wave reaching an end cell.
const DISTURBANCE_TOL: f64 = 1e-10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPosition {
    Left,
    Right,
}

/// Open end of the domain. The end cell itself is never updated, which is only
/// consistent while the neighbouring interior cell keeps its initial density.
#[derive(Clone, Debug)]
pub struct OpenBoundary {
    pub position: BoundaryPosition,
    /// Interior cell adjacent to the end cell.
    pub iwatch: usize,
    pub reference_value: f64,
    pub disturbed_at: Option<usize>,
}
impl OpenBoundary {
    pub fn new(
        position: BoundaryPosition,
        initial_state: ArrayView1<f64>,
    ) -> Result<Self, SolverError> {
        if initial_state.len() < 3 {
            return Err(SolverError::InvalidGrid(format!(
                "an open boundary needs at least 3 cells, got {}",
                initial_state.len()
            )));
        }
        let iwatch = match position {
            BoundaryPosition::Left => 1,
            BoundaryPosition::Right => initial_state.len() - 2,
        };
        Ok(Self {
            position,
            iwatch,
            reference_value: initial_state[iwatch],
            disturbed_at: None,
        })
    }
    /// Records the first step at which a wave reaches this end. Returns true only on that step.
    pub fn monitor(&mut self, state: ArrayView1<f64>, step: usize) -> bool {
        if self.disturbed_at.is_some() {
            return false;
        }
        let Some(&value) = state.get(self.iwatch) else {
            return false;
        };
        if (value - self.reference_value).abs() > DISTURBANCE_TOL {
            self.disturbed_at = Some(step);
            warn!(
                "wave reached the {:?} boundary at step {step}: cell {} moved from {} to {}; the static end cell is no longer consistent",
                self.position, self.iwatch, self.reference_value, value
            );
            return true;
        }
        false
    }
}
