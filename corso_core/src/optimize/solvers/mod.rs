//! Interfaces to the solvers used for optimizing [`Problem`]s
use thiserror::Error;

use crate::configuration::{Configuration, Solver};
use crate::optimize::problem::Problem;
use crate::optimize::ProblemSolution;

pub mod clarabel;
#[cfg(feature = "highs")]
pub mod highs;
#[cfg(feature = "minilp")]
pub mod microlp;

/// A solver able to optimize linear problems
///
/// Infeasible and unbounded problems are not errors, they are reported through
/// [`ProblemSolution::status`]. Errors are reserved for failures to hand the problem to
/// the solver at all.
pub trait LinearSolver {
    /// Short name of the solver, used in log messages
    fn name(&self) -> &'static str;

    /// Optimize the problem
    fn solve(&mut self, problem: &Problem) -> Result<ProblemSolution, SolverError>;
}

impl<S: LinearSolver + ?Sized> LinearSolver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&mut self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        (**self).solve(problem)
    }
}

/// Create the solver selected in the global configuration
///
/// Falls back to Clarabel when the configured solver's feature isn't enabled.
pub fn default_solver() -> Box<dyn LinearSolver> {
    let config = Configuration::current();
    configured_solver(config.solver, &config)
}

/// Create a solver of the requested kind, with the globally configured tolerance
pub fn solver_for(solver: Solver) -> Box<dyn LinearSolver> {
    configured_solver(solver, &Configuration::current())
}

fn configured_solver(solver: Solver, config: &Configuration) -> Box<dyn LinearSolver> {
    match solver {
        Solver::Clarabel => Box::new(clarabel::ClarabelSolver::from_configuration(config)),
        Solver::Highs => highs_solver(config),
        Solver::Microlp => microlp_solver(config),
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "highs")] {
        fn highs_solver(config: &Configuration) -> Box<dyn LinearSolver> {
            Box::new(highs::HighsSolver::from_configuration(config))
        }
    } else {
        fn highs_solver(config: &Configuration) -> Box<dyn LinearSolver> {
            log::warn!("highs feature not enabled, falling back to Clarabel");
            Box::new(clarabel::ClarabelSolver::from_configuration(config))
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "minilp")] {
        // microlp has no tolerance settings
        fn microlp_solver(_config: &Configuration) -> Box<dyn LinearSolver> {
            Box::new(microlp::MicrolpSolver::default())
        }
    } else {
        fn microlp_solver(config: &Configuration) -> Box<dyn LinearSolver> {
            log::warn!("minilp feature not enabled, falling back to Clarabel");
            Box::new(clarabel::ClarabelSolver::from_configuration(config))
        }
    }
}

/// Errors raised while handing a problem to a solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The solver settings couldn't be created
    #[error("Invalid {solver} settings: {message}")]
    InvalidSettings {
        solver: &'static str,
        message: String,
    },
    /// The solver rejected the problem data
    #[error("{solver} failed to set up the problem: {message}")]
    SetupFailed {
        solver: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_selection() {
        let solver = solver_for(Solver::Clarabel);
        assert_eq!(solver.name(), "clarabel");
        let solver = default_solver();
        assert!(!solver.name().is_empty());
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn missing_feature_falls_back() {
        let solver = configured_solver(Solver::Highs, &Configuration::default());
        assert_eq!(solver.name(), "clarabel");
    }
}
