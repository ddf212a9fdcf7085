//! This module provides a struct for representing reactions
use crate::configuration::CONFIGURATION;
use derive_builder::Builder;
use indexmap::IndexMap;

/// Suffix appended to a reaction id to name its split off reverse direction
pub const REVERSE_SUFFIX: &str = "added";

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Reaction {
    /// Used to identify the reaction
    #[builder(setter(into))]
    pub id: String,
    /// Metabolite stoichiometry of the reaction, keyed by metabolite id
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Lower flux bound
    #[builder(default = "default_lower_bound()")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "default_upper_bound()")]
    pub upper_bound: f64,
}

impl ReactionBuilder {
    fn validate(&self) -> Result<(), String> {
        if let (Some(lb), Some(ub)) = (self.lower_bound, self.upper_bound) {
            if lb > ub {
                return Err(format!("lower bound {} exceeds upper bound {}", lb, ub));
            }
        }
        Ok(())
    }
}

fn default_lower_bound() -> f64 {
    match CONFIGURATION.read() {
        Ok(config) => config.lower_bound,
        Err(poisoned) => poisoned.into_inner().lower_bound,
    }
}

fn default_upper_bound() -> f64 {
    match CONFIGURATION.read() {
        Ok(config) => config.upper_bound,
        Err(poisoned) => poisoned.into_inner().upper_bound,
    }
}

impl Reaction {
    /// Whether the reaction can currently carry flux in both directions
    pub fn is_reversible(&self) -> bool {
        is_actively_reversible(self.lower_bound, self.upper_bound)
    }

    /// Id given to the column representing the reverse direction once the reaction is split
    ///
    /// # Note:
    /// The reverse id is "{reaction_id}added"
    pub fn get_reverse_id(&self) -> String {
        reverse_id(&self.id)
    }
}

/// A reaction is split into a forward and a reverse column when `lb < 0 <= ub`
pub fn is_actively_reversible(lower_bound: f64, upper_bound: f64) -> bool {
    lower_bound < 0. && upper_bound >= 0.
}

/// Id of the reverse column for the reaction `id`
pub fn reverse_id(id: &str) -> String {
    format!("{}{}", id, REVERSE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_uses_configured_bounds() {
        let rxn = ReactionBuilder::default().id("PGI").build().unwrap();
        assert!((rxn.lower_bound + 1000.).abs() < 1e-25);
        assert!((rxn.upper_bound - 1000.).abs() < 1e-25);
        assert!(rxn.is_reversible());
    }

    #[test]
    fn builder_rejects_inverted_bounds() {
        let res = ReactionBuilder::default()
            .id("bad")
            .lower_bound(10.)
            .upper_bound(0.)
            .build();
        if let Err(ReactionBuilderError::ValidationError(_)) = res {
            // Intentionally blank
        } else {
            panic!("Inverted bounds not caught")
        }
    }

    #[test]
    fn reversibility() {
        assert!(is_actively_reversible(-10., 10.));
        assert!(is_actively_reversible(-10., 0.));
        assert!(!is_actively_reversible(0., 10.));
        assert!(!is_actively_reversible(-10., -1.));
        assert!(!is_actively_reversible(5., 10.));
    }

    #[test]
    fn reverse_id_suffix() {
        let rxn = ReactionBuilder::default()
            .id("ENO")
            .lower_bound(-1000.)
            .upper_bound(1000.)
            .build()
            .unwrap();
        assert_eq!(rxn.get_reverse_id(), "ENOadded");
    }
}
