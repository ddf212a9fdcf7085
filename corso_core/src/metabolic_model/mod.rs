//! Module providing the Model struct for representing a metabolic model, and its matrix form.

pub mod metabolite;
pub mod model;
pub mod reaction;
pub mod stoichiometric;
