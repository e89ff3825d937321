pub mod boundary;
pub mod flux;
pub mod godunov;
pub mod mesh;
pub mod riemann_solver;
