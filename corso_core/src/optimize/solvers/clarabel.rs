//! Implements a solver interface for Clarabel
//!
//! Clarabel solves conic programs of the form
//! `minimize q'x subject to Ax + s = b, s in K`. A linear problem is mapped onto this as
//! follows:
//! - equality constraints and fixed variables become rows of the zero cone
//! - finite variable bounds become rows of the nonnegative cone
//! - maximization negates the objective
use ::clarabel::algebra::CscMatrix as ClarabelCsc;
use ::clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use indexmap::IndexMap;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::configuration::Configuration;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{LinearSolver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

const NAME: &str = "clarabel";

#[derive(Clone, Debug, Default)]
pub struct ClarabelSolver {
    /// Print Clarabel's iteration log
    pub verbose: bool,
    /// Overrides Clarabel's default feasibility tolerance
    pub tolerance: Option<f64>,
}

impl ClarabelSolver {
    pub fn new(verbose: bool, tolerance: Option<f64>) -> Self {
        ClarabelSolver { verbose, tolerance }
    }

    /// Quiet solver using the configured feasibility tolerance
    pub fn from_configuration(config: &Configuration) -> Self {
        ClarabelSolver::new(false, Some(config.tolerance))
    }
}

/// Rows of `Ax + s = b`, collected as triplets
#[derive(Default)]
struct ConicRows {
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<f64>,
    b: Vec<f64>,
}

impl ConicRows {
    /// Append a row, returning its index
    fn push(&mut self, terms: impl IntoIterator<Item = (usize, f64)>, rhs: f64) -> usize {
        let row = self.b.len();
        for (col, val) in terms {
            self.rows.push(row);
            self.cols.push(col);
            self.vals.push(val);
        }
        self.b.push(rhs);
        row
    }

    fn len(&self) -> usize {
        self.b.len()
    }

    fn into_csc(self, ncols: usize) -> Result<(ClarabelCsc<f64>, Vec<f64>), SolverError> {
        let nrows = self.b.len();
        let coo = CooMatrix::try_from_triplets(nrows, ncols, self.rows, self.cols, self.vals)
            .map_err(|e| SolverError::SetupFailed {
                solver: NAME,
                message: e.to_string(),
            })?;
        let csc = CscMatrix::from(&coo);
        let a = ClarabelCsc::new(
            nrows,
            ncols,
            csc.col_offsets().to_vec(),
            csc.row_indices().to_vec(),
            csc.values().to_vec(),
        );
        Ok((a, self.b))
    }
}

impl LinearSolver for ClarabelSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn solve(&mut self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let n = problem.num_variables();
        let sign = match problem.sense() {
            ObjectiveSense::Minimize => 1.,
            ObjectiveSense::Maximize => -1.,
        };
        let c = problem.objective_coefficients();
        let q = c.iter().map(|coef| sign * coef).collect::<Vec<_>>();

        let mut rows = ConicRows::default();
        // Zero cone rows, the mass balances first so their duals line up with the constraints
        for constraint in problem.constraints() {
            rows.push(
                constraint
                    .get_terms()
                    .iter()
                    .map(|t| (t.variable, t.coefficient)),
                constraint.get_equals(),
            );
        }
        for var in problem.variables().filter(|v| v.is_fixed()) {
            rows.push([(var.index, 1.)], var.lower_bound);
        }
        let num_zero = rows.len();
        // Nonnegative cone rows
        for var in problem.variables().filter(|v| !v.is_fixed()) {
            if var.upper_bound.is_finite() {
                rows.push([(var.index, 1.)], var.upper_bound);
            }
            if var.lower_bound.is_finite() {
                rows.push([(var.index, -1.)], -var.lower_bound);
            }
        }
        let num_nonnegative = rows.len() - num_zero;

        let mut cones = Vec::new();
        if num_zero > 0 {
            cones.push(SupportedConeT::ZeroConeT(num_zero));
        }
        if num_nonnegative > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(num_nonnegative));
        }
        let (a, b) = rows.into_csc(n)?;
        // Linear problem, so no quadratic term
        let p = ClarabelCsc::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());

        let mut settings = DefaultSettingsBuilder::default()
            .verbose(self.verbose)
            .build()
            .map_err(|e| SolverError::InvalidSettings {
                solver: NAME,
                message: format!("{:?}", e),
            })?;
        if let Some(tolerance) = self.tolerance {
            settings.tol_feas = tolerance;
        }

        log::debug!(
            "Solving with Clarabel: {} variables, {} equality rows, {} bound rows",
            n,
            num_zero,
            num_nonnegative
        );
        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings).map_err(|e| {
            SolverError::SetupFailed {
                solver: NAME,
                message: format!("{:?}", e),
            }
        })?;
        solver.solve();
        let solution = &solver.solution;

        let status = match solution.status {
            SolverStatus::Solved => OptimizationStatus::Optimal,
            SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                OptimizationStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                OptimizationStatus::Unbounded
            }
            SolverStatus::MaxIterations
            | SolverStatus::MaxTime
            | SolverStatus::InsufficientProgress => OptimizationStatus::SolverHalted,
            _ => OptimizationStatus::NumericalError,
        };
        if !matches!(
            status,
            OptimizationStatus::Optimal | OptimizationStatus::AlmostOptimal
        ) {
            return Ok(ProblemSolution::from_status(status));
        }

        let x = &solution.x;
        let objective_value = c.iter().zip(x.iter()).map(|(c, x)| c * x).sum::<f64>();
        let variable_values = problem
            .variables()
            .map(|v| (v.id.clone(), x[v.index]))
            .collect::<IndexMap<_, _>>();
        // Clarabel's multipliers are for the minimization form, shadow prices of the
        // stated objective are -z for minimization and z for maximization
        let z = &solution.z;
        let dual_values = problem
            .constraints()
            .zip(z.iter())
            .map(|(constraint, z)| (constraint.get_id().to_string(), -sign * z))
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

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn maximize_simple() {
        // max x + 2y st x + y = 4, 0 <= x <= 3, 0 <= y <= 3
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., 3.).unwrap();
        problem.add_new_variable("y", None, 0., 3.).unwrap();
        problem
            .add_new_equality_constraint_by_id("sum", &["x", "y"], &[1., 1.], 4.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        problem.add_new_linear_objective_term_by_id("y", 2.).unwrap();

        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert_close(solution.objective_value.unwrap(), 7.);
        let values = solution.variable_values.unwrap();
        assert_close(values["x"], 1.);
        assert_close(values["y"], 3.);
        // Relaxing the sum by one allows one more unit of x
        assert_close(solution.dual_values.unwrap()["sum"], 1.);
    }

    #[test]
    fn minimize_with_fixed_and_free() {
        // min y st y - x = 0, x fixed at 2, y free
        let mut problem = Problem::new_minimization();
        problem.add_new_variable("x", None, 2., 2.).unwrap();
        problem
            .add_new_variable("y", None, f64::NEG_INFINITY, f64::INFINITY)
            .unwrap();
        problem
            .add_new_equality_constraint_by_id("link", &["y", "x"], &[1., -1.], 0.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("y", 1.).unwrap();

        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert_close(solution.objective_value.unwrap(), 2.);
        assert_close(solution.variable_values.unwrap()["y"], 2.);
    }

    #[test]
    fn configured_tolerance() {
        let config = Configuration {
            tolerance: 1e-6,
            ..Configuration::default()
        };
        let mut solver = ClarabelSolver::from_configuration(&config);
        assert_eq!(solver.tolerance, Some(1e-6));
        assert!(!solver.verbose);

        // max x st x + y = 2, 0 <= x, y <= 1.5
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., 1.5).unwrap();
        problem.add_new_variable("y", None, 0., 1.5).unwrap();
        problem
            .add_new_equality_constraint_by_id("sum", &["x", "y"], &[1., 1.], 2.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        let solution = solver.solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert!((solution.objective_value.unwrap() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn infeasible() {
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., 1.).unwrap();
        problem
            .add_new_equality_constraint_by_id("impossible", &["x"], &[1.], 5.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();

        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Infeasible);
        assert!(solution.variable_values.is_none());
    }

    #[test]
    fn unbounded() {
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., f64::INFINITY).unwrap();
        problem.add_new_variable("y", None, 0., f64::INFINITY).unwrap();
        problem
            .add_new_equality_constraint_by_id("diff", &["x", "y"], &[1., -1.], 0.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();

        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Unbounded);
    }
}
