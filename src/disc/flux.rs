use ndarray::Array1;
use num_dual::{Dual64, DualNum, first_derivative};
use serde::Deserialize;

use crate::error::SolverError;

/// Number of points used to bound `|f'|` over a density interval.
const WAVE_SPEED_SAMPLES: usize = 65;

/// Physical flux of a scalar conservation law `u_t + f(u)_x = 0`.
///
/// Implementors write the formula once, generically over dual numbers, and get
/// the flux value and its derivative (the characteristic speed) from it.
/// The formula must be total over the reals: densities outside the physical
/// range are extrapolated, never clamped.
pub trait FluxModel: Send + Sync {
    fn flux_dual<D: DualNum<f64>>(&self, u: D) -> D;

    fn flux(&self, u: f64) -> f64 {
        self.flux_dual(u)
    }

    fn wave_speed(&self, u: f64) -> f64 {
        let (_, df) = first_derivative(|u: Dual64| self.flux_dual(u), u);
        df
    }

    /// Interior extrema of the flux, where the wave speed vanishes.
    fn stationary_points(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Largest `|f'(u)|` for `u` in `[lo, hi]`, both endpoints included.
    fn max_wave_speed(&self, lo: f64, hi: f64) -> f64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if lo == hi {
            return self.wave_speed(lo).abs();
        }
        Array1::linspace(lo, hi, WAVE_SPEED_SAMPLES)
            .iter()
            .fold(0.0_f64, |acc, &u| acc.max(self.wave_speed(u).abs()))
    }
}

/// Greenshields' fundamental diagram, `f(u) = vmax * u * (1 - u / umax)`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Greenshields {
    #[serde(default = "unit")]
    pub vmax: f64,
    #[serde(default = "unit")]
    pub umax: f64,
}
fn unit() -> f64 {
    1.0
}
impl Default for Greenshields {
    fn default() -> Self {
        Self {
            vmax: 1.0,
            umax: 1.0,
        }
    }
}
impl Greenshields {
    pub fn new(vmax: f64, umax: f64) -> Result<Self, SolverError> {
        let flux = Self { vmax, umax };
        flux.validate()?;
        Ok(flux)
    }
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.vmax.is_finite() && self.vmax > 0.0) {
            return Err(SolverError::InvalidFlux(format!(
                "vmax must be positive, got {}",
                self.vmax
            )));
        }
        if !(self.umax.is_finite() && self.umax > 0.0) {
            return Err(SolverError::InvalidFlux(format!(
                "umax must be positive, got {}",
                self.umax
            )));
        }
        Ok(())
    }
}
impl FluxModel for Greenshields {
    fn flux_dual<D: DualNum<f64>>(&self, u: D) -> D {
        u.clone() * self.vmax - u.clone() * u * (self.vmax / self.umax)
    }
    fn stationary_points(&self) -> Vec<f64> {
        vec![0.5 * self.umax]
    }
}

/// Inviscid Burgers flux, `f(u) = u^2 / 2`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Burgers;
impl FluxModel for Burgers {
    fn flux_dual<D: DualNum<f64>>(&self, u: D) -> D {
        u.clone() * u * 0.5
    }
    fn stationary_points(&self) -> Vec<f64> {
        vec![0.0]
    }
}

/// Flux models selectable from the parameter file.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FluxKind {
    Greenshields(Greenshields),
    Burgers,
}
impl Default for FluxKind {
    fn default() -> Self {
        FluxKind::Greenshields(Greenshields::default())
    }
}
impl FluxKind {
    pub fn validate(&self) -> Result<(), SolverError> {
        match self {
            FluxKind::Greenshields(flux) => flux.validate(),
            FluxKind::Burgers => Ok(()),
        }
    }
}
impl FluxModel for FluxKind {
    fn flux_dual<D: DualNum<f64>>(&self, u: D) -> D {
        match self {
            FluxKind::Greenshields(flux) => flux.flux_dual(u),
            FluxKind::Burgers => Burgers.flux_dual(u),
        }
    }
    fn stationary_points(&self) -> Vec<f64> {
        match self {
            FluxKind::Greenshields(flux) => flux.stationary_points(),
            FluxKind::Burgers => Burgers.stationary_points(),
        }
    }
}
