//! Implements a solver interface for microlp
//!
//! microlp is a pure rust simplex solver. It doesn't expose dual values, so solutions
//! from this solver never carry them.
use ::microlp::{ComparisonOp, Error as MicrolpError, LinearExpr, OptimizationDirection};
use indexmap::IndexMap;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{LinearSolver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

const NAME: &str = "microlp";

#[derive(Clone, Debug, Default)]
pub struct MicrolpSolver {}

impl LinearSolver for MicrolpSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn solve(&mut self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let direction = match problem.sense() {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let c = problem.objective_coefficients();
        let mut lp = ::microlp::Problem::new(direction);
        let vars = problem
            .variables()
            .map(|v| lp.add_var(c[v.index], (v.lower_bound, v.upper_bound)))
            .collect::<Vec<_>>();
        for constraint in problem.constraints() {
            let mut expr = LinearExpr::empty();
            for term in constraint.get_terms() {
                expr.add(vars[term.variable], term.coefficient);
            }
            lp.add_constraint(expr, ComparisonOp::Eq, constraint.get_equals());
        }

        let solution = match lp.solve() {
            Ok(solution) => solution,
            Err(MicrolpError::Infeasible) => {
                return Ok(ProblemSolution::from_status(OptimizationStatus::Infeasible))
            }
            Err(MicrolpError::Unbounded) => {
                return Ok(ProblemSolution::from_status(OptimizationStatus::Unbounded))
            }
            Err(err) => {
                log::warn!("microlp failed: {}", err);
                return Ok(ProblemSolution::from_status(
                    OptimizationStatus::NumericalError,
                ));
            }
        };
        let variable_values = problem
            .variables()
            .zip(vars.iter())
            .map(|(v, var)| (v.id.clone(), solution[*var]))
            .collect::<IndexMap<_, _>>();
        Ok(ProblemSolution {
            status: OptimizationStatus::Optimal,
            objective_value: Some(solution.objective()),
            variable_values: Some(variable_values),
            dual_values: None,
        })
    }
}
