//! Implements a solver interface for HiGHS
use ::highs::{Col, HighsModelStatus, RowProblem, Sense};
use indexmap::IndexMap;

use crate::configuration::Configuration;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{LinearSolver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

const NAME: &str = "highs";

#[derive(Clone, Debug, Default)]
pub struct HighsSolver {
    /// Print the HiGHS log
    pub verbose: bool,
    /// Overrides the HiGHS primal feasibility tolerance
    pub tolerance: Option<f64>,
}

impl HighsSolver {
    /// Quiet solver using the configured feasibility tolerance
    pub fn from_configuration(config: &Configuration) -> Self {
        HighsSolver {
            verbose: false,
            tolerance: Some(config.tolerance),
        }
    }
}

impl LinearSolver for HighsSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn solve(&mut self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let c = problem.objective_coefficients();
        let mut pb = RowProblem::default();
        let cols: Vec<Col> = problem
            .variables()
            .map(|v| pb.add_column(c[v.index], v.lower_bound..=v.upper_bound))
            .collect();
        for constraint in problem.constraints() {
            let equals = constraint.get_equals();
            let factors = constraint
                .get_terms()
                .iter()
                .map(|t| (cols[t.variable], t.coefficient))
                .collect::<Vec<_>>();
            pb.add_row(equals..=equals, factors);
        }
        let sense = match problem.sense() {
            ObjectiveSense::Maximize => Sense::Maximise,
            ObjectiveSense::Minimize => Sense::Minimise,
        };
        let mut model = pb.optimise(sense);
        if !self.verbose {
            model.make_quiet();
        }
        if let Some(tolerance) = self.tolerance {
            model.set_option("primal_feasibility_tolerance", tolerance);
        }
        let solved = model.try_solve().map_err(|status| SolverError::SetupFailed {
            solver: NAME,
            message: format!("{:?}", status),
        })?;

        let status = match solved.status() {
            HighsModelStatus::Optimal => OptimizationStatus::Optimal,
            HighsModelStatus::Infeasible => OptimizationStatus::Infeasible,
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                OptimizationStatus::Unbounded
            }
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
                OptimizationStatus::SolverHalted
            }
            _ => OptimizationStatus::NumericalError,
        };
        if status != OptimizationStatus::Optimal {
            return Ok(ProblemSolution::from_status(status));
        }

        let solution = solved.get_solution();
        let x = solution.columns();
        let objective_value = c.iter().zip(x.iter()).map(|(c, x)| c * x).sum::<f64>();
        let variable_values = problem
            .variables()
            .map(|v| (v.id.clone(), x[v.index]))
            .collect::<IndexMap<_, _>>();
        let dual_values = problem
            .constraints()
            .zip(solution.dual_rows().iter())
            .map(|(constraint, dual)| (constraint.get_id().to_string(), *dual))
            .collect::<IndexMap<_, _>>();

        Ok(ProblemSolution {
            status,
            objective_value: Some(objective_value),
            variable_values: Some(variable_values),
            dual_values: Some(dual_values),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximize_simple() {
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., 3.).unwrap();
        problem.add_new_variable("y", None, 0., 3.).unwrap();
        problem
            .add_new_equality_constraint_by_id("sum", &["x", "y"], &[1., 1.], 4.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        problem.add_new_linear_objective_term_by_id("y", 2.).unwrap();

        let solution = HighsSolver::default().solve(&problem).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 7.).abs() < 1e-6);
        assert!((solution.variable_values.unwrap()["x"] - 1.).abs() < 1e-6);
    }

    #[test]
    fn configured_tolerance() {
        let config = Configuration {
            tolerance: 1e-6,
            ..Configuration::default()
        };
        let solver = HighsSolver::from_configuration(&config);
        assert_eq!(solver.tolerance, Some(1e-6));
        assert!(!solver.verbose);
    }

    #[test]
    fn infeasible() {
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., 1.).unwrap();
        problem
            .add_new_equality_constraint_by_id("impossible", &["x"], &[1.], 5.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();

        let solution = HighsSolver::default().solve(&problem).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Infeasible);
    }
}
