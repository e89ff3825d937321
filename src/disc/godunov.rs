use log::debug;
use ndarray::{Array1, ArrayView1, Zip, s};
use ndarray_stats::QuantileExt;

use super::{
    flux::FluxModel,
    riemann_solver::{InterfaceRule, godunov_flux},
};
use crate::error::SolverError;

/// First-order Godunov finite-volume scheme with static end cells.
///
/// `step` never writes into its input: all interface fluxes are taken from the
/// previous state before the new state is assembled in a separate buffer, and
/// each interface flux is shared by the two cells it separates.
pub struct GodunovStepper<F: FluxModel> {
    pub flux: F,
    pub rule: InterfaceRule,
    pub parallel: bool,
}
impl<F: FluxModel> GodunovStepper<F> {
    pub fn new(flux: F, rule: InterfaceRule) -> Result<Self, SolverError> {
        let nstationary = flux.stationary_points().len();
        if rule == InterfaceRule::Endpoint && nstationary > 1 {
            return Err(SolverError::InvalidFlux(format!(
                "endpoint interface rule needs a flux with at most one extremum, found {nstationary}"
            )));
        }
        Ok(Self {
            flux,
            rule,
            parallel: false,
        })
    }
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn interface_flux(&self, ul: f64, ur: f64) -> f64 {
        godunov_flux(ul, ur, &self.flux, self.rule)
    }
    /// Fluxes at the `N - 1` interior interfaces; entry `k` sits between cells `k` and `k + 1`.
    pub fn interface_fluxes(&self, state: ArrayView1<f64>) -> Array1<f64> {
        let zip = Zip::from(state.slice(s![..-1])).and(state.slice(s![1..]));
        if self.parallel {
            zip.par_map_collect(|&ul, &ur| self.interface_flux(ul, ur))
        } else {
            zip.map_collect(|&ul, &ur| self.interface_flux(ul, ur))
        }
    }
    /// Advances `state` by one time step of size `dt` on cells of width `dx`.
    pub fn step(&self, state: ArrayView1<f64>, dx: f64, dt: f64) -> Result<Array1<f64>, SolverError> {
        check_scheme_parameters(state.len(), dx, dt)?;
        let fluxes = self.interface_fluxes(state);
        Ok(apply_interface_fluxes(state, fluxes.view(), dt / dx, self.parallel))
    }
    /// Courant number `max|f'(u)| * dt / dx` over the density range of `state`.
    ///
    /// Returns `UnstableStep` when it exceeds one. `step` does not call this;
    /// drivers are expected to check once before marching.
    pub fn check_stability(&self, state: ArrayView1<f64>, dx: f64, dt: f64) -> Result<f64, SolverError> {
        check_scheme_parameters(state.len(), dx, dt)?;
        if state.iter().any(|u| !u.is_finite()) {
            return Err(SolverError::NonFiniteState);
        }
        let umin = *state.min().map_err(|_| SolverError::NonFiniteState)?;
        let umax = *state.max().map_err(|_| SolverError::NonFiniteState)?;
        let max_wave_speed = self.flux.max_wave_speed(umin, umax);
        let courant = max_wave_speed * dt / dx;
        debug!(
            "density range [{umin}, {umax}], max wave speed {max_wave_speed}, courant number {courant}"
        );
        if courant > 1.0 {
            return Err(SolverError::UnstableStep {
                courant,
                max_wave_speed,
            });
        }
        Ok(courant)
    }
}

/// One serial Godunov step of `state` under `flux`, with the end cells held fixed.
pub fn step<F: FluxModel>(
    state: ArrayView1<f64>,
    dx: f64,
    dt: f64,
    flux: &F,
    rule: InterfaceRule,
) -> Result<Array1<f64>, SolverError> {
    check_scheme_parameters(state.len(), dx, dt)?;
    let fluxes = Zip::from(state.slice(s![..-1]))
        .and(state.slice(s![1..]))
        .map_collect(|&ul, &ur| godunov_flux(ul, ur, flux, rule));
    Ok(apply_interface_fluxes(state, fluxes.view(), dt / dx, false))
}

/// `new[i] = state[i] - ratio * (fluxes[i] - fluxes[i - 1])` for interior cells, into a fresh buffer.
fn apply_interface_fluxes(
    state: ArrayView1<f64>,
    fluxes: ArrayView1<f64>,
    ratio: f64,
    parallel: bool,
) -> Array1<f64> {
    let ncell = state.len();
    let mut new_state = state.to_owned();
    let update = |u: &mut f64, &f_left: &f64, &f_right: &f64| {
        *u -= ratio * (f_right - f_left);
    };
    let zip = Zip::from(new_state.slice_mut(s![1..ncell - 1]))
        .and(fluxes.slice(s![..-1]))
        .and(fluxes.slice(s![1..]));
    if parallel {
        zip.par_for_each(update);
    } else {
        zip.for_each(update);
    }
    new_state
}

pub fn check_scheme_parameters(ncell: usize, dx: f64, dt: f64) -> Result<(), SolverError> {
    if ncell < 3 {
        return Err(SolverError::InvalidGrid(format!(
            "at least 3 cells are needed for an interior update, got {ncell}"
        )));
    }
    if !(dx.is_finite() && dx > 0.0) {
        return Err(SolverError::InvalidGrid(format!("dx must be positive, got {dx}")));
    }
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SolverError::InvalidGrid(format!("dt must be positive, got {dt}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::flux::{Burgers, Greenshields};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::{Array1, array};
    use num_dual::DualNum;

    fn traffic_stepper(rule: InterfaceRule) -> GodunovStepper<Greenshields> {
        GodunovStepper::new(Greenshields::default(), rule).unwrap()
    }
    fn mixed_state(ncell: usize) -> Array1<f64> {
        Array1::from_shape_fn(ncell, |i| 0.5 + 0.5 * (1.7 * i as f64).sin())
    }

    #[test]
    fn test_shock_scenario_endpoint_rule() {
        // Both interfaces around the jump see f(1) = f(0) = 0, so nothing moves.
        let stepper = traffic_stepper(InterfaceRule::Endpoint);
        let state = array![1.0, 1.0, 0.0, 0.0, 0.0];
        let new_state = stepper.step(state.view(), 1.0, 0.4).unwrap();
        assert_eq!(new_state, array![1.0, 1.0, 0.0, 0.0, 0.0]);
        assert!(new_state.iter().all(|u| u.is_finite() && *u >= 0.0));
    }

    #[test]
    fn test_shock_scenario_exact_rule() {
        // F(3/2) = f(1/2) = 0.25, all other interfaces carry no flux.
        let stepper = traffic_stepper(InterfaceRule::Exact);
        let state = array![1.0, 1.0, 0.0, 0.0, 0.0];
        let new_state = stepper.step(state.view(), 1.0, 0.4).unwrap();
        let expected = array![1.0, 0.9, 0.1, 0.0, 0.0];
        for (u, e) in new_state.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*u, *e, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_input_state_is_untouched() {
        let stepper = traffic_stepper(InterfaceRule::Exact);
        let state = array![1.0, 1.0, 0.0, 0.0, 0.0];
        let copy = state.clone();
        let _ = stepper.step(state.view(), 1.0, 0.4).unwrap();
        assert_eq!(state, copy);
    }

    #[test]
    fn test_discrete_conservation() {
        for rule in [InterfaceRule::Endpoint, InterfaceRule::Exact] {
            let stepper = traffic_stepper(rule);
            let state = array![0.1, 0.7, 0.3, 0.95, 0.5, 0.2, 0.6, 0.05];
            let (dx, dt) = (0.5, 0.3);
            let ncell = state.len();
            let new_state = stepper.step(state.view(), dx, dt).unwrap();
            let change: f64 = (1..ncell - 1).map(|i| new_state[i] - state[i]).sum();
            let f_first = godunov_flux(state[0], state[1], &stepper.flux, rule);
            let f_last = godunov_flux(state[ncell - 2], state[ncell - 1], &stepper.flux, rule);
            assert_abs_diff_eq!(change, -(dt / dx) * (f_last - f_first), epsilon = 1e-13);
        }
    }

    #[test]
    fn test_boundary_cells_are_static() {
        let stepper = traffic_stepper(InterfaceRule::Exact);
        let mut state = mixed_state(12);
        let (left, right) = (state[0], state[11]);
        for _ in 0..20 {
            state = stepper.step(state.view(), 1.0, 0.5).unwrap();
            assert_eq!(state[0], left);
            assert_eq!(state[11], right);
        }
    }

    #[test]
    fn test_uniform_state_is_fixed_point() {
        for rule in [InterfaceRule::Endpoint, InterfaceRule::Exact] {
            let stepper = traffic_stepper(rule);
            for u0 in [0.0, 0.3, 0.5, 0.8, 1.0] {
                let state = Array1::from_elem(9, u0);
                let new_state = stepper.step(state.view(), 1.0, 0.4).unwrap();
                for u in new_state.iter() {
                    assert_relative_eq!(*u, u0, epsilon = 1e-14);
                }
            }
        }
    }

    #[test]
    fn test_range_preservation_under_cfl() {
        for rule in [InterfaceRule::Endpoint, InterfaceRule::Exact] {
            let stepper = traffic_stepper(rule);
            for ratio in [0.4, 0.9, 1.0] {
                let mut state = mixed_state(40);
                for _ in 0..200 {
                    state = stepper.step(state.view(), 1.0, ratio).unwrap();
                    for u in state.iter() {
                        assert!(*u >= -1e-12 && *u <= 1.0 + 1e-12, "density {u} left [0, 1]");
                    }
                }
            }
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let serial = traffic_stepper(InterfaceRule::Exact);
        let parallel = traffic_stepper(InterfaceRule::Exact).with_parallel(true);
        let mut a = mixed_state(257);
        let mut b = a.clone();
        for _ in 0..10 {
            a = serial.step(a.view(), 1.0, 0.8).unwrap();
            b = parallel.step(b.view(), 1.0, 0.8).unwrap();
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_swapping_flux_changes_the_law() {
        // Burgers with a right-moving shock: upwind transport of u^2 / 2
        let stepper = GodunovStepper::new(Burgers, InterfaceRule::Exact).unwrap();
        let state = array![1.0, 1.0, 0.0, 0.0];
        let new_state = stepper.step(state.view(), 1.0, 0.5).unwrap();
        assert_abs_diff_eq!(new_state[1], 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(new_state[2], 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_precondition_errors() {
        let stepper = traffic_stepper(InterfaceRule::Endpoint);
        let short = array![1.0, 0.0];
        assert!(matches!(
            stepper.step(short.view(), 1.0, 0.4),
            Err(SolverError::InvalidGrid(_))
        ));
        let state = array![1.0, 1.0, 0.0, 0.0, 0.0];
        for (dx, dt) in [(0.0, 0.4), (-1.0, 0.4), (1.0, 0.0), (1.0, -0.1), (1.0, f64::NAN)] {
            assert!(matches!(
                stepper.step(state.view(), dx, dt),
                Err(SolverError::InvalidGrid(_))
            ));
        }
    }

    #[test]
    fn test_stability_check() {
        let stepper = traffic_stepper(InterfaceRule::Endpoint);
        let state = array![1.0, 1.0, 0.0, 0.0, 0.0];
        let courant = stepper.check_stability(state.view(), 1.0, 0.4).unwrap();
        assert_relative_eq!(courant, 0.4, epsilon = 1e-12);
        assert!(matches!(
            stepper.check_stability(state.view(), 1.0, 1.5),
            Err(SolverError::UnstableStep { .. })
        ));
        // free-flow densities only reach wave speeds up to 0.8
        let free_flow = array![0.2, 0.2, 0.1, 0.1];
        assert!(stepper.check_stability(free_flow.view(), 1.0, 1.2).is_ok());
        let broken = array![0.2, f64::NAN, 0.1];
        assert!(matches!(
            stepper.check_stability(broken.view(), 1.0, 0.4),
            Err(SolverError::NonFiniteState)
        ));
    }

    #[test]
    fn test_free_step_takes_flux_and_rule() {
        let state = array![1.0, 1.0, 0.0, 0.0, 0.0];
        let flux = Greenshields::default();
        let endpoint = step(state.view(), 1.0, 0.4, &flux, InterfaceRule::Endpoint).unwrap();
        assert_eq!(endpoint, array![1.0, 1.0, 0.0, 0.0, 0.0]);
        let exact = step(state.view(), 1.0, 0.4, &flux, InterfaceRule::Exact).unwrap();
        assert_eq!(
            exact,
            traffic_stepper(InterfaceRule::Exact)
                .step(state.view(), 1.0, 0.4)
                .unwrap()
        );
        let mixed = mixed_state(30);
        assert_eq!(
            step(mixed.view(), 1.0, 0.7, &Burgers, InterfaceRule::Exact).unwrap(),
            GodunovStepper::new(Burgers, InterfaceRule::Exact)
                .unwrap()
                .step(mixed.view(), 1.0, 0.7)
                .unwrap()
        );
        assert!(matches!(
            step(array![0.5, 0.5].view(), 1.0, 0.4, &flux, InterfaceRule::Exact),
            Err(SolverError::InvalidGrid(_))
        ));
    }

    struct Cubic;
    impl FluxModel for Cubic {
        fn flux_dual<D: DualNum<f64>>(&self, u: D) -> D {
            u.clone() * u.clone() * u.clone() - u
        }
        fn stationary_points(&self) -> Vec<f64> {
            let us = 1.0 / 3.0_f64.sqrt();
            vec![-us, us]
        }
    }

    #[test]
    fn test_endpoint_rule_needs_unimodal_flux() {
        assert!(matches!(
            GodunovStepper::new(Cubic, InterfaceRule::Endpoint),
            Err(SolverError::InvalidFlux(_))
        ));
        assert!(GodunovStepper::new(Cubic, InterfaceRule::Exact).is_ok());
    }
}
