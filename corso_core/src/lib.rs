//! Core rust implementation of CORSO, a constraint based metabolic modeling method which
//! finds the flux distribution of minimal weighted cost reaching a (possibly sub-optimal)
//! objective value.
pub mod configuration;
pub mod flux_analysis;
pub mod metabolic_model;
pub mod optimize;
