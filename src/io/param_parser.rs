use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::disc::{flux::FluxKind, riemann_solver::InterfaceRule};
use crate::initialization::InitialCondition;

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse parameter file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid parameter: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MeshParamParser {
    pub elem_num: usize,
    pub left_coord: f64,
    pub right_coord: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SolverParamParser {
    pub mesh: MeshParamParser,
    #[serde(default)]
    pub flux: FluxKind,
    pub initial_condition: InitialCondition,
    pub cfl: f64,
    pub final_time: f64,
    #[serde(default)]
    pub final_step: Option<usize>,
    /// Overrides the time step derived from `cfl`.
    #[serde(default)]
    pub time_step: Option<f64>,
    #[serde(default = "default_output_interval")]
    pub output_interval: usize,
    #[serde(default)]
    pub interface_rule: InterfaceRule,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}
fn default_output_interval() -> usize {
    100
}
fn default_output_dir() -> String {
    "outputs".to_string()
}
impl SolverParamParser {
    pub fn parse<P: AsRef<Path>>(file_path: P) -> Result<Self, ParamError> {
        let file_content = fs::read_to_string(file_path)?;
        Self::parse_str(&file_content)
    }
    pub fn parse_str(content: &str) -> Result<Self, ParamError> {
        let param: SolverParamParser = serde_json::from_str(content)?;
        if !(param.cfl.is_finite() && param.cfl > 0.0) {
            return Err(ParamError::Invalid(format!(
                "cfl must be positive, got {}",
                param.cfl
            )));
        }
        if param.output_interval == 0 {
            return Err(ParamError::Invalid(
                "output_interval must be at least 1".to_string(),
            ));
        }
        Ok(param)
    }
}
