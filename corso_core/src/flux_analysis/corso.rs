//! CORSO: flux distributions of minimal cost at a fixed objective value
//!
//! The model's objective is optimized first. Its value is then fixed, either to a percentage
//! of the optimum or to an absolute value, and a second problem finds the flux distribution
//! with the lowest total weighted flux among those reaching it. Reversible reactions are
//! split in two for the second problem so that flux in either direction adds to the cost.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::flux_analysis::cost::{normalize_costs, CostSpec};
use crate::flux_analysis::projection::{project_solution, FluxResult};
use crate::flux_analysis::split::{augment_model, check_reserved_ids};
use crate::flux_analysis::{CorsoError, Phase};
use crate::metabolic_model::model::Model;
use crate::metabolic_model::stoichiometric::StoichiometricModel;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::LinearSolver;
use crate::optimize::OptimizationStatus;

/// How the constraint value of a CORSO run is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintMode {
    /// Percentage of the optimal flux of the objective reaction
    Percentage,
    /// Objective value to fix
    ///
    /// The attainability check compares the constraint with the optimal objective value
    /// `c·x`, but the constraint is then used as the flux of every objective reaction. Those
    /// only agree when the objective is a single reaction with coefficient 1. Otherwise a
    /// target that passed the check can leave the cost minimization infeasible, reported as
    /// [`CorsoError::SolverFailure`] in [`Phase::CostMinimization`].
    Absolute,
}

impl Display for ConstraintMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintMode::Percentage => write!(f, "percentage"),
            ConstraintMode::Absolute => write!(f, "absolute"),
        }
    }
}

impl FromStr for ConstraintMode {
    type Err = CorsoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percentage" => Ok(ConstraintMode::Percentage),
            "absolute" => Ok(ConstraintMode::Absolute),
            _ => Err(CorsoError::InvalidConstraintMode(s.to_string())),
        }
    }
}

/// Parameters of a CORSO run
///
/// # Examples
/// ```rust
/// use corso_core::flux_analysis::{ConstraintMode, CorsoOptionsBuilder};
/// let options = CorsoOptionsBuilder::default()
///     .constraint(90.)
///     .costs(vec![1., 2., 1.])
///     .build()
///     .unwrap();
/// assert_eq!(options.mode, ConstraintMode::Percentage);
/// ```
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct CorsoOptions {
    /// Direction in which the model's objective is optimized
    #[builder(default = "ObjectiveSense::Maximize")]
    pub sense: ObjectiveSense,
    /// Percentage of the optimum, or the absolute objective value, depending on `mode`
    #[builder(default = "100.")]
    pub constraint: f64,
    #[builder(default = "ConstraintMode::Percentage")]
    pub mode: ConstraintMode,
    /// Cost of flux through each reaction
    #[builder(default, setter(into))]
    pub costs: CostSpec,
    /// Treat a single cost value as a unit cost for all reactions
    #[builder(default = "Configuration::current().legacy_unit_cost_on_singleton")]
    pub legacy_unit_cost_on_singleton: bool,
}

impl Default for CorsoOptions {
    fn default() -> Self {
        CorsoOptions {
            sense: ObjectiveSense::Maximize,
            constraint: 100.,
            mode: ConstraintMode::Percentage,
            costs: CostSpec::default(),
            legacy_unit_cost_on_singleton: Configuration::current().legacy_unit_cost_on_singleton,
        }
    }
}

impl CorsoOptions {
    /// Options from textual sense and mode, e.g. `"max"` and `"percentage"`
    pub fn parse(
        sense: &str,
        constraint: f64,
        mode: &str,
        costs: CostSpec,
    ) -> Result<Self, CorsoError> {
        Ok(CorsoOptions {
            sense: ObjectiveSense::from_str(sense)?,
            constraint,
            mode: ConstraintMode::from_str(mode)?,
            costs,
            ..CorsoOptions::default()
        })
    }
}

/// Run CORSO with the given sense, constraint and costs
///
/// See [`corso`].
pub fn compute_corso_flux<S: LinearSolver + ?Sized>(
    model: &StoichiometricModel,
    sense: ObjectiveSense,
    constraint: f64,
    mode: ConstraintMode,
    costs: &CostSpec,
    solver: &mut S,
) -> Result<FluxResult, CorsoError> {
    let options = CorsoOptions {
        sense,
        constraint,
        mode,
        costs: costs.clone(),
        ..CorsoOptions::default()
    };
    corso(model, &options, solver)
}

/// Find the cheapest flux distribution reaching the requested objective value
///
/// Returns a degenerate [`FluxResult`] (no objective value, all fluxes zero) when the
/// objective optimization is infeasible or its optimum is zero.
///
/// # Examples
/// ```rust
/// use corso_core::flux_analysis::{corso, CorsoOptionsBuilder};
/// use corso_core::metabolic_model::stoichiometric::StoichiometricModel;
/// use corso_core::optimize::solvers::clarabel::ClarabelSolver;
/// // -> A <-> B ->
/// let model = StoichiometricModel::from_triplets(
///     vec!["A".to_string(), "B".to_string()],
///     vec!["EX_A".to_string(), "R2".to_string(), "EX_B".to_string()],
///     &[(0, 0, 1.), (0, 1, -1.), (1, 1, 1.), (1, 2, -1.)],
///     vec![0., -1000., 0.],
///     vec![10., 1000., 1000.],
///     vec![0., 0., 1.],
/// )
/// .unwrap();
/// let options = CorsoOptionsBuilder::default().constraint(50.).build().unwrap();
/// let result = corso(&model, &options, &mut ClarabelSolver::default()).unwrap();
/// assert!((result.f.unwrap() - 5.).abs() < 1e-6);
/// assert!((result.fm.unwrap() - 15.).abs() < 1e-5);
/// ```
pub fn corso<S: LinearSolver + ?Sized>(
    model: &StoichiometricModel,
    options: &CorsoOptions,
    solver: &mut S,
) -> Result<FluxResult, CorsoError> {
    let config = Configuration::current();
    let costs = normalize_costs(
        &options.costs,
        model.num_reactions(),
        options.legacy_unit_cost_on_singleton,
    )?;
    check_reserved_ids(model)?;
    let objective_reactions = model.objective_reactions();
    let Some(&first_objective) = objective_reactions.first() else {
        return Err(CorsoError::MissingObjective);
    };
    if objective_reactions.len() > 1 {
        log::warn!(
            "Model has {} objective reactions, all will be fixed to the target of {}",
            objective_reactions.len(),
            model.reactions()[first_objective]
        );
    }

    // Objective optimization
    let problem = Problem::from_stoichiometric(model, options.sense)?;
    log::debug!(
        "Optimizing objective ({}) with {} over {} reactions and {} metabolites",
        options.sense,
        solver.name(),
        model.num_reactions(),
        model.num_metabolites()
    );
    let solution = solver.solve(&problem)?;
    if solution.status == OptimizationStatus::Infeasible {
        log::warn!("Objective optimization is infeasible, returning zero fluxes");
        return Ok(FluxResult::degenerate(model.reactions().to_vec(), None));
    }
    let (optimum, x1) = match (
        solution.is_optimal(),
        solution.objective_value,
        solution.primal_vector(),
    ) {
        (true, Some(optimum), Some(x1)) => (optimum, x1),
        _ => {
            return Err(CorsoError::SolverFailure {
                phase: Phase::ObjectiveOptimization,
                status: solution.status,
            })
        }
    };
    let y = solution.dual_vector();
    if optimum.abs() < config.objective_tolerance {
        log::warn!("Objective optimum {} is zero, returning zero fluxes", optimum);
        return Ok(FluxResult::degenerate(model.reactions().to_vec(), y));
    }
    log::info!("Objective optimum: {}", optimum);

    let target = match options.mode {
        ConstraintMode::Percentage => x1[first_objective] * options.constraint.abs() / 100.,
        ConstraintMode::Absolute => {
            let slack = config.tolerance * optimum.abs().max(1.);
            let beyond = match options.sense {
                ObjectiveSense::Maximize => options.constraint > optimum + slack,
                ObjectiveSense::Minimize => options.constraint < optimum - slack,
            };
            if beyond {
                return Err(CorsoError::ObjectiveUnattainable {
                    sense: options.sense,
                    requested: options.constraint,
                    optimum,
                });
            }
            options.constraint
        }
    };

    // Cost minimization
    let mut augmented = augment_model(model, &costs)?;
    for &idx in &objective_reactions {
        augmented.fix_objective_reaction(idx, target);
    }
    let problem = Problem::from_stoichiometric(augmented.model(), ObjectiveSense::Minimize)?;
    log::debug!(
        "Minimizing cost at objective {} with {} reversible reactions split",
        target,
        augmented.num_split()
    );
    let solution = solver.solve(&problem)?;
    let (fm, x2) = match (
        solution.is_optimal(),
        solution.objective_value,
        solution.primal_vector(),
    ) {
        (true, Some(fm), Some(x2)) => (fm, x2),
        _ => {
            return Err(CorsoError::SolverFailure {
                phase: Phase::CostMinimization,
                status: solution.status,
            })
        }
    };
    log::info!("Minimal cost {} at objective {}", fm, target);

    Ok(FluxResult {
        x: project_solution(&augmented, &x2, config.flux_zero_threshold),
        y,
        f: Some(target),
        fm: Some(fm),
        reaction_ids: model.reactions().to_vec(),
    })
}

impl Model {
    /// Run [`corso`] on the matrix form of the model
    pub fn corso<S: LinearSolver + ?Sized>(
        &self,
        options: &CorsoOptions,
        solver: &mut S,
    ) -> Result<FluxResult, CorsoError> {
        corso(&self.to_stoichiometric()?, options, solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::solvers::clarabel::ClarabelSolver;

    // -> A <-> B ->, with R2 written as B -> A when `backwards` is set
    fn toy(uptake: f64, backwards: bool) -> StoichiometricModel {
        let r2 = if backwards { 1. } else { -1. };
        StoichiometricModel::from_triplets(
            vec!["A".to_string(), "B".to_string()],
            vec!["EX_A".to_string(), "R2".to_string(), "EX_B".to_string()],
            &[(0, 0, 1.), (0, 1, r2), (1, 1, -r2), (1, 2, -1.)],
            vec![0., -1000., 0.],
            vec![uptake, 1000., 1000.],
            vec![0., 0., 1.],
        )
        .unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
    }

    #[test]
    fn constraint_mode_parsing() {
        assert_eq!(
            ConstraintMode::from_str("percentage"),
            Ok(ConstraintMode::Percentage)
        );
        assert_eq!(
            ConstraintMode::from_str(" Absolute"),
            Ok(ConstraintMode::Absolute)
        );
        assert_eq!(
            ConstraintMode::from_str("relative"),
            Err(CorsoError::InvalidConstraintMode("relative".to_string()))
        );
        assert_eq!(ConstraintMode::Absolute.to_string(), "absolute");
        let mode: ConstraintMode = serde_json::from_str("\"percentage\"").unwrap();
        assert_eq!(mode, ConstraintMode::Percentage);
    }

    #[test]
    fn options() {
        let options = CorsoOptionsBuilder::default().build().unwrap();
        assert_eq!(options.sense, ObjectiveSense::Maximize);
        assert_eq!(options.constraint, 100.);
        assert_eq!(options.costs, CostSpec::Scalar(1.));

        let options = CorsoOptions::parse("min", 3., "absolute", 2.0.into()).unwrap();
        assert_eq!(options.sense, ObjectiveSense::Minimize);
        assert_eq!(options.mode, ConstraintMode::Absolute);
        assert!(matches!(
            CorsoOptions::parse("maxx", 3., "absolute", CostSpec::default()),
            Err(CorsoError::InvalidObjectiveSense(_))
        ));
        assert!(matches!(
            CorsoOptions::parse("max", 3., "percent", CostSpec::default()),
            Err(CorsoError::InvalidConstraintMode(_))
        ));
    }

    #[test]
    fn half_optimum() {
        let result = compute_corso_flux(
            &toy(10., false),
            ObjectiveSense::Maximize,
            50.,
            ConstraintMode::Percentage,
            &CostSpec::default(),
            &mut ClarabelSolver::default(),
        )
        .unwrap();
        assert_close(result.f.unwrap(), 5.);
        assert_close(result.fm.unwrap(), 15.);
        assert_eq!(result.x.len(), 3);
        for flux in &result.x {
            assert_close(*flux, 5.);
        }
        assert!(result.y.is_some());
    }

    #[test]
    fn negative_net_flux() {
        let result = compute_corso_flux(
            &toy(10., true),
            ObjectiveSense::Maximize,
            50.,
            ConstraintMode::Percentage,
            &CostSpec::default(),
            &mut ClarabelSolver::default(),
        )
        .unwrap();
        assert_close(result.x[1], -5.);
        assert_close(result.fm.unwrap(), 15.);
    }

    #[test]
    fn absolute_target() {
        let result = compute_corso_flux(
            &toy(10., false),
            ObjectiveSense::Maximize,
            2.,
            ConstraintMode::Absolute,
            &CostSpec::default(),
            &mut ClarabelSolver::default(),
        )
        .unwrap();
        assert_close(result.f.unwrap(), 2.);
        assert_close(result.x[2], 2.);
        assert_close(result.fm.unwrap(), 6.);
    }

    #[test]
    fn unattainable() {
        let res = compute_corso_flux(
            &toy(10., false),
            ObjectiveSense::Maximize,
            20.,
            ConstraintMode::Absolute,
            &CostSpec::default(),
            &mut ClarabelSolver::default(),
        );
        assert!(matches!(
            res,
            Err(CorsoError::ObjectiveUnattainable { requested, .. }) if requested == 20.
        ));
    }

    #[test]
    fn absolute_target_scaled_objective() {
        // Objective 2*EX_B has optimum 20, but EX_B itself can't exceed 10
        let model = StoichiometricModel::from_triplets(
            vec!["A".to_string(), "B".to_string()],
            vec!["EX_A".to_string(), "R2".to_string(), "EX_B".to_string()],
            &[(0, 0, 1.), (0, 1, -1.), (1, 1, 1.), (1, 2, -1.)],
            vec![0., -1000., 0.],
            vec![10., 1000., 1000.],
            vec![0., 0., 2.],
        )
        .unwrap();
        let options = CorsoOptions {
            constraint: 15.,
            mode: ConstraintMode::Absolute,
            ..CorsoOptions::default()
        };
        let res = corso(&model, &options, &mut ClarabelSolver::default());
        assert!(matches!(
            res,
            Err(CorsoError::SolverFailure {
                phase: Phase::CostMinimization,
                ..
            })
        ));

        let options = CorsoOptions {
            constraint: 8.,
            ..options
        };
        let result = corso(&model, &options, &mut ClarabelSolver::default()).unwrap();
        assert_close(result.x[2], 8.);
    }

    #[test]
    fn degenerate() {
        let result = corso(
            &toy(0., false),
            &CorsoOptions::default(),
            &mut ClarabelSolver::default(),
        )
        .unwrap();
        assert!(result.is_degenerate());
        assert_eq!(result.fm, None);
        assert_eq!(result.x, vec![0.; 3]);
    }

    #[test]
    fn no_objective() {
        let model = StoichiometricModel::from_triplets(
            vec!["A".to_string()],
            vec!["EX_A".to_string(), "DM_A".to_string()],
            &[(0, 0, 1.), (0, 1, -1.)],
            vec![0., 0.],
            vec![10., 10.],
            vec![0., 0.],
        )
        .unwrap();
        let res = corso(
            &model,
            &CorsoOptions::default(),
            &mut ClarabelSolver::default(),
        );
        assert_eq!(res, Err(CorsoError::MissingObjective));
    }

    #[test]
    fn bad_costs_before_solving() {
        let options = CorsoOptionsBuilder::default()
            .costs(vec![1., 1.])
            .build()
            .unwrap();
        let res = corso(&toy(10., false), &options, &mut ClarabelSolver::default());
        assert!(matches!(
            res,
            Err(CorsoError::InvalidCostLength { found: 2, .. })
        ));
    }
}
