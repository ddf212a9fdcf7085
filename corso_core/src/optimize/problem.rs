//! Provides struct representing an optimization problem
use crate::metabolic_model::stoichiometric::StoichiometricModel;
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense, ObjectiveTerm};
use crate::optimize::problem::ProblemError::{
    NonExistentVariablesInConstraint, NonExistentVariablesInObjective,
};
use crate::optimize::variable::{Variable, VariableBuilder};
use indexmap::IndexMap;
use thiserror::Error;

/// A linear optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem, keyed by id
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem, keyed by id
    constraints: IndexMap<String, Constraint>,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::default(),
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    /// Create the flux balance problem of a model
    ///
    /// One variable per reaction (bounded by the reaction bounds), one equality
    /// constraint per metabolite (`S v = b`), and the model's objective vector.
    /// Variables and constraints keep the order of the model's reactions and metabolites.
    ///
    /// # Examples
    /// ```rust
    /// use corso_core::metabolic_model::stoichiometric::StoichiometricModel;
    /// use corso_core::optimize::objective::ObjectiveSense;
    /// use corso_core::optimize::problem::Problem;
    /// let model = StoichiometricModel::from_triplets(
    ///     vec!["A".to_string()],
    ///     vec!["EX_A".to_string(), "DM_A".to_string()],
    ///     &[(0, 0, 1.), (0, 1, -1.)],
    ///     vec![0., 0.],
    ///     vec![10., 10.],
    ///     vec![0., 1.],
    /// )
    /// .unwrap();
    /// let problem = Problem::from_stoichiometric(&model, ObjectiveSense::Maximize).unwrap();
    /// assert_eq!(problem.num_variables(), 2);
    /// assert_eq!(problem.num_constraints(), 1);
    /// ```
    pub fn from_stoichiometric(
        model: &StoichiometricModel,
        sense: ObjectiveSense,
    ) -> Result<Self, ProblemError> {
        let mut problem = Problem::new(sense);
        for (idx, id) in model.reactions().iter().enumerate() {
            problem.add_new_variable(
                id,
                None,
                model.lower_bounds()[idx],
                model.upper_bounds()[idx],
            )?;
        }
        // The matrix is stored by column, so gather the rows first
        let mut rows: Vec<(Vec<usize>, Vec<f64>)> =
            vec![(Vec::new(), Vec::new()); model.num_metabolites()];
        for col in 0..model.num_reactions() {
            for (row, coef) in model.column(col) {
                if coef != 0. {
                    rows[row].0.push(col);
                    rows[row].1.push(coef);
                }
            }
        }
        for ((met_id, (vars, coefs)), rhs) in model
            .metabolites()
            .iter()
            .zip(rows)
            .zip(model.rhs().iter())
        {
            problem.add_new_equality_constraint(met_id, &vars, &coefs, *rhs)?;
        }
        for idx in model.objective_reactions() {
            problem.add_new_linear_objective_term(idx, model.objective()[idx])?;
        }
        Ok(problem)
    }
    // endregion Creation Functions

    // region Adding Variables
    /// Add a variable to the optimization problem
    pub fn add_variable(&mut self, mut variable: Variable) -> Result<(), ProblemError> {
        // Validate that the variable can in fact be added to the problem
        self.validate_variable(&variable)?;
        // Update the index of the variable to reflect the current variable count
        variable.index = self.variables.len();
        self.variables.insert(variable.id.clone(), variable);
        Ok(())
    }

    /// Create a new variable and add it to the optimization problem
    pub fn add_new_variable(
        &mut self,
        id: &str,
        name: Option<&str>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let mut builder = VariableBuilder::default();
        builder.id(id).lower_bound(lower_bound).upper_bound(upper_bound);
        if let Some(name) = name {
            builder.name(name);
        }
        let new_var = builder
            .build()
            .map_err(|e| ProblemError::InvalidVariable(e.to_string()))?;
        self.add_variable(new_var)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ProblemError> {
        self.validate_constraint(&constraint)?;
        self.constraints
            .insert(constraint.get_id().to_string(), constraint);
        Ok(())
    }

    /// Create a new equality constraint over variable indices and add it to the model
    pub fn add_new_equality_constraint(
        &mut self,
        id: &str,
        variables: &[usize],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        let new_cons = Constraint::new_equality(id, variables, coefficients, equals);
        self.add_constraint(new_cons)
    }

    /// Create a new equality constraint using variable ids rather than indices, and add it to the model
    pub fn add_new_equality_constraint_by_id(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        let variables = self.indices_of(variables, NonExistentVariablesInConstraint)?;
        self.add_new_equality_constraint(id, &variables, coefficients, equals)
    }
    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new linear term to the objective
    pub fn add_new_linear_objective_term(
        &mut self,
        variable: usize,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        if variable >= self.variables.len() {
            return Err(NonExistentVariablesInObjective);
        }
        self.objective
            .add_term(ObjectiveTerm::new_linear(variable, coefficient));
        Ok(())
    }

    /// Add a new linear term to the objective using the variable id
    pub fn add_new_linear_objective_term_by_id(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        let variable = match self.variables.get(variable_id) {
            Some(variable) => variable.index,
            None => return Err(NonExistentVariablesInObjective),
        };
        self.add_new_linear_objective_term(variable, coefficient)
    }

    // endregion Adding Objective Terms

    // region Accessors
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.objective.sense()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Variables in the order they were added
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Constraints in the order they were added
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    pub fn get_variable(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    /// Dense objective coefficient vector, in variable order
    pub fn objective_coefficients(&self) -> Vec<f64> {
        self.objective.coefficients(self.variables.len())
    }
    // endregion Accessors

    // region Validation Functions
    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        // Check if there is already a variable with this id
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists(variable.id.clone()));
        };
        // Check if the variable bounds are valid
        if variable.lower_bound > variable.upper_bound
            || variable.lower_bound.is_nan()
            || variable.upper_bound.is_nan()
        {
            return Err(ProblemError::InvalidVariableBounds(variable.id.clone()));
        }
        Ok(())
    }

    /// Check that a constraint to be added is valid to add to this Problem
    fn validate_constraint(&self, constraint: &Constraint) -> Result<(), ProblemError> {
        // Check that a constraint with the same id doesn't already exist
        if self.constraints.contains_key(constraint.get_id()) {
            return Err(ProblemError::ConstraintAlreadyExists(
                constraint.get_id().to_string(),
            ));
        }
        if constraint.equals.is_nan() {
            return Err(ProblemError::InvalidConstraintBounds);
        }
        // Check that the variables in this constraint are in the model
        if constraint
            .get_terms()
            .iter()
            .any(|t| t.variable >= self.variables.len())
        {
            return Err(NonExistentVariablesInConstraint);
        }
        // All checks have passed
        Ok(())
    }

    fn indices_of(&self, ids: &[&str], missing: ProblemError) -> Result<Vec<usize>, ProblemError> {
        ids.iter()
            .map(|id| {
                self.variables
                    .get(*id)
                    .map(|v| v.index)
                    .ok_or_else(|| missing.clone())
            })
            .collect()
    }
    // endregion Validation Functions
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add variable {0}, but a variable with that id already exists")]
    VariableIdAlreadyExists(String),
    /// Error when trying to add variable with invalid bounds
    #[error("Tried to give variable {0} a lower_bound > upper_bound")]
    InvalidVariableBounds(String),
    /// Error when a variable couldn't be built
    #[error("Unable to build variable: {0}")]
    InvalidVariable(String),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add constraint {0}, but a constraint with that id already exists")]
    ConstraintAlreadyExists(String),
    /// Error when trying to add a constraint with a right hand side that isn't a number
    #[error("Tried to add a constraint with a NaN right hand side")]
    InvalidConstraintBounds,
    /// Error when trying to add a constraint that contains variables not in the model
    #[error("Tried to add a constraint with variables not in the model")]
    NonExistentVariablesInConstraint,
    /// Error when trying to add an objective term which includes variables not in the model
    #[error("Tried adding an objective term with variables not in the model")]
    NonExistentVariablesInObjective,
}
