//! Global defaults used when building reactions and running flux analyses
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Clone, Debug)]
pub struct Configuration {
    /// Default lower bound for new reactions
    pub lower_bound: f64,
    /// Default upper bound for new reactions
    pub upper_bound: f64,
    /// Feasibility tolerance handed to the solvers built by
    /// [`crate::optimize::solvers::solver_for`], also the relative slack allowed when checking
    /// an absolute CORSO target against the optimum
    pub tolerance: f64,
    /// Optimal objective values with a smaller magnitude are treated as degenerate
    pub objective_tolerance: f64,
    /// Recombined fluxes with a smaller magnitude are reported as exactly zero
    pub flux_zero_threshold: f64,
    /// Treat a single cost value as "unit cost for every reaction" rather than broadcasting
    /// the value itself
    pub legacy_unit_cost_on_singleton: bool,
    /// Solver used by [`crate::optimize::solvers::default_solver`]
    pub solver: Solver,
}

impl Configuration {
    /// Snapshot of the current global configuration
    ///
    /// A poisoned lock still holds a usable configuration, so it is read anyway.
    pub fn current() -> Configuration {
        match CONFIGURATION.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            objective_tolerance: 1e-06,
            flux_zero_threshold: 1e-08,
            legacy_unit_cost_on_singleton: true,
            solver: Solver::Clarabel,
        }
    }
}

/// Enum used to specify the default solver to use
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Solver {
    /// Use the Clarabel interior point solver
    Clarabel,
    /// Use the HiGHS LP solver, requires the highs feature to be enabled
    Highs,
    /// Use the microlp simplex solver, requires the minilp feature to be enabled
    Microlp,
}
