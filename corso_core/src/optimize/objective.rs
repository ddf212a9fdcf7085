//! Provides struct for representing an optimization problem's objective
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents the linear objective of an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    pub(crate) terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    pub(crate) sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Add a new term to the objective
    pub fn add_term(&mut self, term: ObjectiveTerm) {
        self.terms.push(term);
    }

    /// Dense coefficient vector over `num_variables` variables, summing repeated terms
    pub fn coefficients(&self, num_variables: usize) -> Vec<f64> {
        let mut coefficients = vec![0.; num_variables];
        for term in &self.terms {
            coefficients[term.variable] += term.coefficient;
        }
        coefficients
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveSense {
    /// The objective should be minimized
    #[serde(alias = "min")]
    Minimize,
    /// The objective should be maximized
    #[serde(alias = "max")]
    Maximize,
}

impl Display for ObjectiveSense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveSense::Minimize => write!(f, "min"),
            ObjectiveSense::Maximize => write!(f, "max"),
        }
    }
}

impl FromStr for ObjectiveSense {
    type Err = ObjectiveSenseError;

    /// Accepts `max`/`maximize` and `min`/`minimize`, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "max" | "maximize" => Ok(ObjectiveSense::Maximize),
            "min" | "minimize" => Ok(ObjectiveSense::Minimize),
            _ => Err(ObjectiveSenseError(s.to_string())),
        }
    }
}

/// Error when parsing an objective sense from a string
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown objective sense {0:?}, expected \"max\" or \"min\"")]
pub struct ObjectiveSenseError(pub String);

/// A linear term in the objective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveTerm {
    /// Index of the variable in the problem
    pub(crate) variable: usize,
    /// Coefficient for the term
    pub(crate) coefficient: f64,
}

impl ObjectiveTerm {
    /// Create a new linear objective term
    pub fn new_linear(variable: usize, coefficient: f64) -> Self {
        ObjectiveTerm {
            variable,
            coefficient,
        }
    }
}
