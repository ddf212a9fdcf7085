//! Provides struct for representing a constraint in an optimization problem
use std::fmt::{Display, Formatter};

/// Represents a linear equality constraint in an optimization problem, where the sum of
/// `terms` = `equals`
///
/// Flux balance problems only carry mass balances, so bounds live on the variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Used to identify the constraint
    pub(crate) id: String,
    /// Linear terms which are added together, see [`ConstraintTerm`] for more
    pub(crate) terms: Vec<ConstraintTerm>,
    /// The right hand side of the equality constraint
    pub(crate) equals: f64,
}

impl Constraint {
    /// Create a new equality constraint
    ///
    /// # Parameters
    /// - `id`: Identifier of the constraint
    /// - `variables`: Indices of the variables in the problem
    /// - `coefficients`: A slice of coefficients for the variables
    /// - `equals`: The right hand side of the equality
    ///
    /// # Examples
    /// ```rust
    /// use corso_core::optimize::constraint::Constraint;
    /// // Create a constraint representing 3*x0 + 2*x1 = 6
    /// let new_constraint = Constraint::new_equality("balance", &[0, 1], &[3.0, 2.0], 6.);
    /// assert_eq!(new_constraint.get_terms().len(), 2);
    /// ```
    pub fn new_equality(id: &str, variables: &[usize], coefficients: &[f64], equals: f64) -> Self {
        Constraint {
            id: id.to_string(),
            terms: variables
                .iter()
                .zip(coefficients)
                .map(|(var, coef)| ConstraintTerm {
                    variable: *var,
                    coefficient: *coef,
                })
                .collect(),
            equals,
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_terms(&self) -> &[ConstraintTerm] {
        &self.terms
    }

    /// Right hand side of the equality
    pub fn get_equals(&self) -> f64 {
        self.equals
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let lhs = if self.terms.is_empty() {
            "0".to_string()
        } else {
            self.terms
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" + ")
        };
        write!(f, "{} = {}", lhs, self.equals)
    }
}

/// Represents a single term in a constraint, specifically
/// represents the multiplication of the `variable` by the `coefficient`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintTerm {
    /// Index of the variable in the problem
    pub(crate) variable: usize,
    /// The coefficient for the variable
    pub(crate) coefficient: f64,
}

impl ConstraintTerm {
    pub fn variable(&self) -> usize {
        self.variable
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }
}

impl Display for ConstraintTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*x{}", self.coefficient, self.variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let eq = Constraint::new_equality("c1", &[0, 2], &[1., -1.], 0.);
        assert_eq!(format!("{}", eq), "1*x0 + -1*x2 = 0");
        let empty = Constraint::new_equality("c3", &[], &[], 0.);
        assert_eq!(format!("{}", empty), "0 = 0");
    }

    #[test]
    fn accessors() {
        let eq = Constraint::new_equality("c1", &[0, 3], &[1., 2.], 4.);
        assert_eq!(eq.get_equals(), 4.);
        assert_eq!(eq.get_id(), "c1");
        assert_eq!(eq.get_terms()[1].variable(), 3);
        assert_eq!(eq.get_terms()[1].coefficient(), 2.);
    }
}
