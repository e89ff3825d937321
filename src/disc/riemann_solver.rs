use serde::Deserialize;

use super::flux::FluxModel;

/// How the Riemann problem at a cell interface is reduced to one flux value.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceRule {
    /// Compare the fluxes of the two interface states only. Valid for fluxes
    /// with a single extremum; misses the sonic value of transonic fans.
    #[default]
    Endpoint,
    /// Godunov's rule: min of f over [ul, ur] if ul <= ur, max over [ur, ul]
    /// otherwise, using the stationary points of the flux inside the interval.
    Exact,
}

/// Godunov flux at the interface between a left state `ul` and a right state `ur`.
pub fn godunov_flux<F: FluxModel>(ul: f64, ur: f64, flux: &F, rule: InterfaceRule) -> f64 {
    let fl = flux.flux(ul);
    let fr = flux.flux(ur);
    match rule {
        InterfaceRule::Endpoint => {
            if ul <= ur {
                fl.min(fr)
            } else {
                fl.max(fr)
            }
        }
        InterfaceRule::Exact => {
            let (lo, hi) = if ul <= ur { (ul, ur) } else { (ur, ul) };
            let interior = flux
                .stationary_points()
                .into_iter()
                .filter(|&us| us > lo && us < hi)
                .map(|us| flux.flux(us));
            if ul <= ur {
                interior.fold(fl.min(fr), f64::min)
            } else {
                interior.fold(fl.max(fr), f64::max)
            }
        }
    }
}
