//! Matrix form of a metabolic model, the representation the flux analyses operate on
use std::collections::HashSet;

use nalgebra::DVector;
use nalgebra_sparse::CscMatrix;

use crate::metabolic_model::model::ModelError;
use crate::metabolic_model::reaction::is_actively_reversible;

/// A metabolic model as a stoichiometric matrix with bounds and an objective
///
/// Rows of `s` are metabolites and columns are reactions, in the order of
/// `metabolites` and `reactions`.
#[derive(Clone, Debug, PartialEq)]
pub struct StoichiometricModel {
    /// Metabolite ids, one per row of `s`
    pub(crate) metabolites: Vec<String>,
    /// Reaction ids, one per column of `s`
    pub(crate) reactions: Vec<String>,
    /// Stoichiometric matrix
    pub(crate) s: CscMatrix<f64>,
    /// Right hand side of the mass balance, `S v = b`
    pub(crate) b: DVector<f64>,
    /// Lower flux bounds
    pub(crate) lb: DVector<f64>,
    /// Upper flux bounds
    pub(crate) ub: DVector<f64>,
    /// Objective coefficients
    pub(crate) c: DVector<f64>,
}

/// How [`StoichiometricModel::set_reaction_bounds`] applies a value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundMode {
    /// Set both bounds to the value
    Fixed,
    /// Set only the lower bound
    Lower,
    /// Set only the upper bound
    Upper,
}

impl StoichiometricModel {
    /// Create a new model, checking dimensions, id uniqueness, and bounds
    ///
    /// The mass balance right hand side defaults to zero.
    pub fn new(
        metabolites: Vec<String>,
        reactions: Vec<String>,
        s: CscMatrix<f64>,
        lb: DVector<f64>,
        ub: DVector<f64>,
        c: DVector<f64>,
    ) -> Result<Self, ModelError> {
        let b = DVector::zeros(metabolites.len());
        let model = Self::from_parts(metabolites, reactions, s, b, lb, ub, c);
        model.validate()?;
        Ok(model)
    }

    /// Create a new model from (metabolite index, reaction index, coefficient) triplets
    ///
    /// # Examples
    /// ```rust
    /// use corso_core::metabolic_model::stoichiometric::StoichiometricModel;
    /// // -> A -> B ->
    /// let model = StoichiometricModel::from_triplets(
    ///     vec!["A".to_string(), "B".to_string()],
    ///     vec!["EX_A".to_string(), "R1".to_string(), "EX_B".to_string()],
    ///     &[(0, 0, 1.), (0, 1, -1.), (1, 1, 1.), (1, 2, -1.)],
    ///     vec![0., -10., 0.],
    ///     vec![10., 10., 10.],
    ///     vec![0., 0., 1.],
    /// )
    /// .unwrap();
    /// assert_eq!(model.num_reactions(), 3);
    /// ```
    pub fn from_triplets(
        metabolites: Vec<String>,
        reactions: Vec<String>,
        triplets: &[(usize, usize, f64)],
        lb: Vec<f64>,
        ub: Vec<f64>,
        c: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let rows = triplets.iter().map(|(i, _, _)| *i).collect::<Vec<_>>();
        let cols = triplets.iter().map(|(_, j, _)| *j).collect::<Vec<_>>();
        let vals = triplets.iter().map(|(_, _, v)| *v).collect::<Vec<_>>();
        let coo = nalgebra_sparse::CooMatrix::try_from_triplets(
            metabolites.len(),
            reactions.len(),
            rows,
            cols,
            vals,
        )
        .map_err(|e| ModelError::SparseFormat(format!("{}", e)))?;
        Self::new(
            metabolites,
            reactions,
            CscMatrix::from(&coo),
            DVector::from_vec(lb),
            DVector::from_vec(ub),
            DVector::from_vec(c),
        )
    }

    /// Assemble a model without validation, used for derived models whose bounds are
    /// intentionally left as computed
    pub(crate) fn from_parts(
        metabolites: Vec<String>,
        reactions: Vec<String>,
        s: CscMatrix<f64>,
        b: DVector<f64>,
        lb: DVector<f64>,
        ub: DVector<f64>,
        c: DVector<f64>,
    ) -> Self {
        Self {
            metabolites,
            reactions,
            s,
            b,
            lb,
            ub,
            c,
        }
    }

    /// Replace the mass balance right hand side
    pub fn with_rhs(mut self, b: Vec<f64>) -> Result<Self, ModelError> {
        if b.len() != self.metabolites.len() {
            return Err(ModelError::DimensionMismatch {
                what: "b",
                expected: self.metabolites.len(),
                found: b.len(),
            });
        }
        self.b = DVector::from_vec(b);
        Ok(self)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let n = self.reactions.len();
        let m = self.metabolites.len();
        if self.s.nrows() != m {
            return Err(ModelError::DimensionMismatch {
                what: "S rows",
                expected: m,
                found: self.s.nrows(),
            });
        }
        for (what, found) in [
            ("S columns", self.s.ncols()),
            ("lb", self.lb.len()),
            ("ub", self.ub.len()),
            ("c", self.c.len()),
        ] {
            if found != n {
                return Err(ModelError::DimensionMismatch {
                    what,
                    expected: n,
                    found,
                });
            }
        }
        if self.b.len() != m {
            return Err(ModelError::DimensionMismatch {
                what: "b",
                expected: m,
                found: self.b.len(),
            });
        }
        let mut seen = HashSet::new();
        for id in &self.reactions {
            if !seen.insert(id.as_str()) {
                return Err(ModelError::DuplicateReaction(id.clone()));
            }
        }
        let mut seen = HashSet::new();
        for id in &self.metabolites {
            if !seen.insert(id.as_str()) {
                return Err(ModelError::DuplicateMetabolite(id.clone()));
            }
        }
        for (idx, (lb, ub)) in self.lb.iter().zip(self.ub.iter()).enumerate() {
            if lb > ub || lb.is_nan() || ub.is_nan() {
                return Err(ModelError::InvalidBounds {
                    reaction: self.reactions[idx].clone(),
                    lower_bound: *lb,
                    upper_bound: *ub,
                });
            }
        }
        Ok(())
    }

    // region Accessors
    pub fn num_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn num_metabolites(&self) -> usize {
        self.metabolites.len()
    }

    pub fn reactions(&self) -> &[String] {
        &self.reactions
    }

    pub fn metabolites(&self) -> &[String] {
        &self.metabolites
    }

    pub fn stoichiometry(&self) -> &CscMatrix<f64> {
        &self.s
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.b
    }

    pub fn lower_bounds(&self) -> &DVector<f64> {
        &self.lb
    }

    pub fn upper_bounds(&self) -> &DVector<f64> {
        &self.ub
    }

    pub fn objective(&self) -> &DVector<f64> {
        &self.c
    }

    /// Index of the reaction with the given id
    pub fn find_reaction_index(&self, id: &str) -> Option<usize> {
        self.reactions.iter().position(|r| r == id)
    }

    /// Index of the metabolite with the given id
    pub fn find_metabolite_index(&self, id: &str) -> Option<usize> {
        self.metabolites.iter().position(|m| m == id)
    }

    /// Nonzero entries of a reaction's column as (metabolite index, coefficient)
    pub fn column(&self, reaction: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let offsets = self.s.col_offsets();
        let (start, end) = (offsets[reaction], offsets[reaction + 1]);
        self.s.row_indices()[start..end]
            .iter()
            .copied()
            .zip(self.s.values()[start..end].iter().copied())
    }

    /// Indices of the reactions with a nonzero objective coefficient
    pub fn objective_reactions(&self) -> Vec<usize> {
        self.c
            .iter()
            .enumerate()
            .filter(|(_, coef)| **coef != 0.)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Indices of the reactions able to carry flux in both directions, in index order
    pub fn reversible_reactions(&self) -> Vec<usize> {
        self.lb
            .iter()
            .zip(self.ub.iter())
            .enumerate()
            .filter(|(_, (lb, ub))| is_actively_reversible(**lb, **ub))
            .map(|(idx, _)| idx)
            .collect()
    }
    // endregion Accessors

    // region Bounds
    /// Tighten or fix the bounds of a reaction, looked up by id
    ///
    /// # Examples
    /// ```rust
    /// use corso_core::metabolic_model::stoichiometric::{BoundMode, StoichiometricModel};
    /// let mut model = StoichiometricModel::from_triplets(
    ///     vec!["A".to_string()],
    ///     vec!["EX_A".to_string(), "DM_A".to_string()],
    ///     &[(0, 0, 1.), (0, 1, -1.)],
    ///     vec![0., 0.],
    ///     vec![10., 10.],
    ///     vec![0., 1.],
    /// )
    /// .unwrap();
    /// model.set_reaction_bounds("EX_A", 5., BoundMode::Fixed).unwrap();
    /// assert_eq!(model.lower_bounds()[0], 5.);
    /// assert_eq!(model.upper_bounds()[0], 5.);
    /// ```
    pub fn set_reaction_bounds(
        &mut self,
        id: &str,
        value: f64,
        mode: BoundMode,
    ) -> Result<(), ModelError> {
        let idx = self
            .find_reaction_index(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))?;
        let (lb, ub) = match mode {
            BoundMode::Fixed => (value, value),
            BoundMode::Lower => (value, self.ub[idx]),
            BoundMode::Upper => (self.lb[idx], value),
        };
        if lb > ub {
            return Err(ModelError::InvalidBounds {
                reaction: id.to_string(),
                lower_bound: lb,
                upper_bound: ub,
            });
        }
        self.set_bounds_at(idx, lb, ub);
        Ok(())
    }

    pub(crate) fn set_bounds_at(&mut self, idx: usize, lower_bound: f64, upper_bound: f64) {
        self.lb[idx] = lower_bound;
        self.ub[idx] = upper_bound;
    }
    // endregion Bounds
}
