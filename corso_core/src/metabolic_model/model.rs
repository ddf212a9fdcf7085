//! This module provides the Model struct for representing an entire metabolic model
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use thiserror::Error;

use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;
use crate::metabolic_model::stoichiometric::StoichiometricModel;

use indexmap::IndexMap;

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug)]
pub struct Model {
    /// Map of reaction ids to Reaction Objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of metabolite ids to Metabolite Objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to objective function coefficients
    pub objective: IndexMap<String, f64>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            metabolites: IndexMap::new(),
            objective: IndexMap::new(),
        }
    }

    /// Add a reaction to the model
    ///
    /// # Parameters
    /// - reaction: Reaction to add
    ///
    /// # Examples
    /// ```rust
    /// use corso_core::metabolic_model::model::Model;
    /// use corso_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction").build().unwrap();
    /// model.add_reaction(new_reaction);
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Set the objective coefficient of a reaction
    ///
    /// A coefficient of 0 removes the reaction from the objective.
    pub fn set_objective(&mut self, reaction_id: &str, coefficient: f64) -> Result<(), ModelError> {
        if !self.reactions.contains_key(reaction_id) {
            return Err(ModelError::ReactionNotFound(reaction_id.to_string()));
        }
        if coefficient == 0. {
            self.objective.shift_remove(reaction_id);
        } else {
            self.objective.insert(reaction_id.to_string(), coefficient);
        }
        Ok(())
    }

    /// Convert the model into its matrix form
    ///
    /// Metabolites only referenced by reactions must still be registered with
    /// [`Model::add_metabolite`]; unknown metabolites are an error.
    pub fn to_stoichiometric(&self) -> Result<StoichiometricModel, ModelError> {
        let num_metabolites = self.metabolites.len();
        let num_reactions = self.reactions.len();
        let mut coo = CooMatrix::new(num_metabolites, num_reactions);
        let mut lb = Vec::with_capacity(num_reactions);
        let mut ub = Vec::with_capacity(num_reactions);
        let mut c = Vec::with_capacity(num_reactions);
        for (col, (rxn_id, rxn)) in self.reactions.iter().enumerate() {
            for (met_id, coef) in &rxn.metabolites {
                let row = self.metabolites.get_index_of(met_id).ok_or_else(|| {
                    ModelError::MetaboliteNotFound {
                        reaction: rxn_id.clone(),
                        metabolite: met_id.clone(),
                    }
                })?;
                coo.push(row, col, *coef);
            }
            lb.push(rxn.lower_bound);
            ub.push(rxn.upper_bound);
            c.push(self.objective.get(rxn_id).copied().unwrap_or(0.));
        }
        for rxn_id in self.objective.keys() {
            if !self.reactions.contains_key(rxn_id) {
                return Err(ModelError::ReactionNotFound(rxn_id.clone()));
            }
        }
        StoichiometricModel::new(
            self.metabolites.keys().cloned().collect(),
            self.reactions.keys().cloned().collect(),
            CscMatrix::from(&coo),
            DVector::from_vec(lb),
            DVector::from_vec(ub),
            DVector::from_vec(c),
        )
    }
}

/// Errors associated with building or modifying a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Tried to access a reaction which isn't in the model
    #[error("Reaction {0} is not in the model")]
    ReactionNotFound(String),
    /// A reaction references a metabolite which isn't in the model
    #[error("Reaction {reaction} references metabolite {metabolite}, which is not in the model")]
    MetaboliteNotFound { reaction: String, metabolite: String },
    /// Two reactions share an id
    #[error("Reaction id {0} is used more than once")]
    DuplicateReaction(String),
    /// Two metabolites share an id
    #[error("Metabolite id {0} is used more than once")]
    DuplicateMetabolite(String),
    /// Bounds where lower_bound > upper_bound
    #[error("Reaction {reaction} has lower bound {lower_bound} > upper bound {upper_bound}")]
    InvalidBounds {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    /// Model components don't have matching sizes
    #[error("Expected {what} to have length {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// The stoichiometric matrix couldn't be assembled
    #[error("Invalid stoichiometric matrix: {0}")]
    SparseFormat(String),
}
