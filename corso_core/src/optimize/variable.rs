//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A continuous variable of a linear program
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Variable {
    /// Used to identify the variable (must be unique within a problem)
    #[builder(setter(into))]
    pub(crate) id: String,
    /// Human-readable name
    #[builder(default = "None", setter(into, strip_option))]
    pub(crate) name: Option<String>,
    /// Lowest value the variable can take, may be `f64::NEG_INFINITY`
    #[builder(default = "f64::NEG_INFINITY")]
    pub(crate) lower_bound: f64,
    /// Highest value the variable can take, may be `f64::INFINITY`
    #[builder(default = "f64::INFINITY")]
    pub(crate) upper_bound: f64,
    /// Position of the variable in the problem, set when it is added
    #[builder(default = "0", setter(skip))]
    pub(crate) index: usize,
}

impl Variable {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the bounds pin the variable to a single value
    pub fn is_fixed(&self) -> bool {
        self.lower_bound == self.upper_bound
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <= {} <= {}", self.lower_bound, name, self.upper_bound),
            None => write!(f, "{} <= {} <= {}", self.lower_bound, self.id, self.upper_bound),
        }
    }
}
