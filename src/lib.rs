//! First-order Godunov finite-volume solver for the Lighthill-Whitham-Richards
//! traffic flow model `u_t + f(u)_x = 0` on a uniform one-dimensional mesh.
pub mod disc;
pub mod error;
pub mod initialization;
pub mod io;
pub mod solver;
pub mod temporal_disc;
