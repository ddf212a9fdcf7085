//! Flux analysis methods operating on [`StoichiometricModel`]s
//!
//! - [`fba`]: Flux Balance Analysis, optimize the model's objective
//! - [`corso::corso`]: optimize the objective, fix it (possibly below its optimum), then find
//!   the flux distribution with the lowest weighted total flux
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use thiserror::Error;

use crate::metabolic_model::model::ModelError;
use crate::metabolic_model::stoichiometric::StoichiometricModel;
use crate::optimize::objective::{ObjectiveSense, ObjectiveSenseError};
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::{LinearSolver, SolverError};
use crate::optimize::OptimizationStatus;

pub mod corso;
pub mod cost;
pub mod projection;
pub mod split;

pub use corso::{compute_corso_flux, corso, ConstraintMode, CorsoOptions, CorsoOptionsBuilder};
pub use cost::{normalize_costs, CostSpec, NormalizedCosts};
pub use projection::{project_solution, FluxResult};
pub use split::{augment_model, check_reserved_ids, AugmentedModel};

/// Result of a Flux Balance Analysis
#[derive(Clone, Debug, PartialEq)]
pub struct FbaSolution {
    /// Optimal value of the objective
    pub objective_value: f64,
    /// Flux through each reaction, keyed by reaction id
    pub fluxes: IndexMap<String, f64>,
    /// Shadow price of each metabolite, if the solver reports duals
    pub shadow_prices: Option<IndexMap<String, f64>>,
}

/// Optimize the model according to Flux Balance Analysis (FBA).
///
/// # Examples
/// ```rust
/// use corso_core::flux_analysis::fba;
/// use corso_core::metabolic_model::stoichiometric::StoichiometricModel;
/// use corso_core::optimize::objective::ObjectiveSense;
/// use corso_core::optimize::solvers::clarabel::ClarabelSolver;
/// let model = StoichiometricModel::from_triplets(
///     vec!["A".to_string()],
///     vec!["EX_A".to_string(), "DM_A".to_string()],
///     &[(0, 0, 1.), (0, 1, -1.)],
///     vec![0., 0.],
///     vec![10., 1000.],
///     vec![0., 1.],
/// )
/// .unwrap();
/// let solution = fba(&model, ObjectiveSense::Maximize, &mut ClarabelSolver::default()).unwrap();
/// assert!((solution.objective_value - 10.).abs() < 1e-6);
/// ```
pub fn fba<S: LinearSolver + ?Sized>(
    model: &StoichiometricModel,
    sense: ObjectiveSense,
    solver: &mut S,
) -> Result<FbaSolution, CorsoError> {
    let problem = Problem::from_stoichiometric(model, sense)?;
    let solution = solver.solve(&problem)?;
    match (
        solution.is_optimal(),
        solution.objective_value,
        solution.variable_values,
    ) {
        (true, Some(objective_value), Some(fluxes)) => Ok(FbaSolution {
            objective_value,
            fluxes,
            shadow_prices: solution.dual_values,
        }),
        _ => Err(CorsoError::SolverFailure {
            phase: Phase::ObjectiveOptimization,
            status: solution.status,
        }),
    }
}

/// The two linear programs solved by CORSO
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Optimization of the model's own objective
    ObjectiveOptimization,
    /// Minimization of the total weighted flux with the objective fixed
    CostMinimization,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::ObjectiveOptimization => write!(f, "objective optimization"),
            Phase::CostMinimization => write!(f, "cost minimization"),
        }
    }
}

/// Errors raised by the flux analysis methods
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorsoError {
    /// The cost specification has neither 1, n, nor 2n entries
    #[error("Expected 1, n or 2n costs for n = {num_reactions} reactions, found {found}")]
    InvalidCostLength { num_reactions: usize, found: usize },
    /// A cost is negative or not a number
    #[error("Cost at position {index} must be finite and non-negative, found {value}")]
    InvalidCost { index: usize, value: f64 },
    /// The constraint mode is neither percentage nor absolute
    #[error("Unknown constraint mode {0:?}, expected \"percentage\" or \"absolute\"")]
    InvalidConstraintMode(String),
    /// The objective sense is neither max nor min
    #[error(transparent)]
    InvalidObjectiveSense(#[from] ObjectiveSenseError),
    /// The requested objective value lies beyond the optimum
    #[error("Objective value {requested} can't be reached, the {sense} is {optimum}")]
    ObjectiveUnattainable {
        sense: ObjectiveSense,
        requested: f64,
        optimum: f64,
    },
    /// The model already uses an id the cost minimization model adds
    #[error("The id {0} is reserved for the cost minimization model")]
    ReservedId(String),
    /// The model has no reaction with a nonzero objective coefficient
    #[error("The model has no objective reaction")]
    MissingObjective,
    /// A solve ended without an optimal solution
    #[error("The {phase} solve ended with status {status:?}")]
    SolverFailure {
        phase: Phase,
        status: OptimizationStatus,
    },
    /// The solver couldn't be run
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
    /// The optimization problem couldn't be built
    #[error("Unable to build optimization problem: {0}")]
    Problem(#[from] ProblemError),
    /// The model is malformed
    #[error("Invalid model: {0}")]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::solvers::clarabel::ClarabelSolver;

    fn chain(uptake: f64) -> StoichiometricModel {
        StoichiometricModel::from_triplets(
            vec!["A".to_string(), "B".to_string()],
            vec!["EX_A".to_string(), "R1".to_string(), "EX_B".to_string()],
            &[(0, 0, 1.), (0, 1, -1.), (1, 1, 1.), (1, 2, -1.)],
            vec![0., -1000., 0.],
            vec![uptake, f64::INFINITY, f64::INFINITY],
            vec![0., 0., 1.],
        )
        .unwrap()
    }

    #[test]
    fn fba_chain() {
        let solution = fba(
            &chain(10.),
            ObjectiveSense::Maximize,
            &mut ClarabelSolver::default(),
        )
        .unwrap();
        assert!((solution.objective_value - 10.).abs() < 1e-6);
        assert!((solution.fluxes["R1"] - 10.).abs() < 1e-6);
        assert!(solution.shadow_prices.is_some());
    }

    #[test]
    fn fba_unbounded() {
        let res = fba(
            &chain(f64::INFINITY),
            ObjectiveSense::Maximize,
            &mut ClarabelSolver::default(),
        );
        assert!(matches!(
            res,
            Err(CorsoError::SolverFailure {
                phase: Phase::ObjectiveOptimization,
                status: OptimizationStatus::Unbounded,
            })
        ));
    }

    #[test]
    fn error_messages() {
        let err = CorsoError::InvalidCostLength {
            num_reactions: 3,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "Expected 1, n or 2n costs for n = 3 reactions, found 4"
        );
        let err = CorsoError::ObjectiveUnattainable {
            sense: ObjectiveSense::Maximize,
            requested: 20.,
            optimum: 10.,
        };
        assert_eq!(
            err.to_string(),
            "Objective value 20 can't be reached, the max is 10"
        );
        let err = CorsoError::ReservedId("pseudomet".to_string());
        assert_eq!(
            err.to_string(),
            "The id pseudomet is reserved for the cost minimization model"
        );
    }
}
