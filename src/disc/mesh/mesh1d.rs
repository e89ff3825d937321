use ndarray::{Array1, ArrayView1};

use crate::error::SolverError;

/// Uniform finite-volume mesh on `[left_coord, right_coord]`.
///
/// Element `ielem` spans `[nodes[ielem], nodes[ielem + 1]]` and carries one
/// density value located at `cell_centers[ielem]`.
#[derive(Clone, Debug)]
pub struct Mesh1d {
    pub elem_num: usize,
    pub node_num: usize,
    pub left_coord: f64,
    pub right_coord: f64,
    pub dx: f64,
    pub nodes: Array1<f64>,
    pub cell_centers: Array1<f64>,
}
impl Mesh1d {
    pub fn new(elem_num: usize, left_coord: f64, right_coord: f64) -> Result<Self, SolverError> {
        if elem_num < 3 {
            return Err(SolverError::InvalidGrid(format!(
                "at least 3 cells are needed for an interior update, got {elem_num}"
            )));
        }
        if !(left_coord.is_finite() && right_coord.is_finite()) || left_coord >= right_coord {
            return Err(SolverError::InvalidGrid(format!(
                "domain bounds must satisfy xmin < xmax, got [{left_coord}, {right_coord}]"
            )));
        }
        let node_num = elem_num + 1;
        let dx = (right_coord - left_coord) / elem_num as f64;
        let nodes = Array1::from_shape_fn(node_num, |inode| left_coord + inode as f64 * dx);
        let cell_centers =
            Array1::from_shape_fn(elem_num, |ielem| left_coord + (ielem as f64 + 0.5) * dx);
        Ok(Self {
            elem_num,
            node_num,
            left_coord,
            right_coord,
            dx,
            nodes,
            cell_centers,
        })
    }
    pub fn cell_centers(&self) -> ArrayView1<f64> {
        self.cell_centers.view()
    }
    /// Fails unless `state` holds exactly one value per element.
    pub fn check_state(&self, state: ArrayView1<f64>) -> Result<(), SolverError> {
        if state.len() != self.elem_num {
            return Err(SolverError::InvalidGrid(format!(
                "state has {} values but the mesh has {} cells",
                state.len(),
                self.elem_num
            )));
        }
        Ok(())
    }
}
