//! Splitting of reversible reactions and the cost accounting row used by CORSO
use std::collections::HashSet;

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::flux_analysis::cost::NormalizedCosts;
use crate::flux_analysis::CorsoError;
use crate::metabolic_model::model::ModelError;
use crate::metabolic_model::reaction::reverse_id;
use crate::metabolic_model::stoichiometric::StoichiometricModel;

/// Id of the metabolite collecting the weighted flux of every reaction
pub const PSEUDO_METABOLITE: &str = "pseudomet";
/// Id of the reaction draining [`PSEUDO_METABOLITE`], its flux is the total cost
pub const COST_SINK: &str = "EX_pseudomet";

/// A model whose reversible reactions were split into forward and backward halves
///
/// Columns are laid out as `[original reactions, added reverse columns, cost sink]`, and
/// rows as `[original metabolites, pseudo metabolite]`.
#[derive(Clone, Debug, PartialEq)]
pub struct AugmentedModel {
    model: StoichiometricModel,
    reverse_index: Vec<Option<usize>>,
    num_original: usize,
    cost_sink: usize,
}

impl AugmentedModel {
    pub fn model(&self) -> &StoichiometricModel {
        &self.model
    }

    /// Column of the backward half of each original reaction, if it was split
    pub fn reverse_index(&self) -> &[Option<usize>] {
        &self.reverse_index
    }

    /// Number of reactions in the model that was split
    pub fn num_original(&self) -> usize {
        self.num_original
    }

    /// Number of reactions that received a backward column
    pub fn num_split(&self) -> usize {
        self.cost_sink - self.num_original
    }

    /// Column of the cost sink reaction
    pub fn cost_sink(&self) -> usize {
        self.cost_sink
    }

    /// Fix the flux of an original reaction, blocking its backward half
    pub(crate) fn fix_objective_reaction(&mut self, idx: usize, target: f64) {
        self.model.set_bounds_at(idx, target, target);
        if let Some(reverse) = self.reverse_index[idx] {
            self.model.set_bounds_at(reverse, 0., 0.);
        }
    }
}

/// Check that the ids [`augment_model`] adds are free in `model`
///
/// Those are [`PSEUDO_METABOLITE`], [`COST_SINK`] and the reverse id of every reaction that
/// gets split.
pub fn check_reserved_ids(model: &StoichiometricModel) -> Result<(), CorsoError> {
    if model.find_metabolite_index(PSEUDO_METABOLITE).is_some() {
        return Err(CorsoError::ReservedId(PSEUDO_METABOLITE.to_string()));
    }
    let reactions = model.reactions().iter().map(String::as_str).collect::<HashSet<_>>();
    if reactions.contains(COST_SINK) {
        return Err(CorsoError::ReservedId(COST_SINK.to_string()));
    }
    for idx in model.reversible_reactions() {
        let reverse = reverse_id(&model.reactions()[idx]);
        if reactions.contains(reverse.as_str()) {
            return Err(CorsoError::ReservedId(reverse));
        }
    }
    Ok(())
}

/// Build the cost minimization model from a model and its normalized costs
///
/// Every reaction with `lb < 0 <= ub` gets an added column with the negated stoichiometry,
/// bounded by `[0, -lb]`. All lower bounds become 0. The weighted flux of every column is
/// produced into [`PSEUDO_METABOLITE`], which only [`COST_SINK`] consumes, and the sink is
/// the sole objective reaction. The input model is left untouched.
///
/// Fails with [`CorsoError::ReservedId`] if `model` already uses one of the added ids.
pub fn augment_model(
    model: &StoichiometricModel,
    costs: &NormalizedCosts,
) -> Result<AugmentedModel, CorsoError> {
    let n = model.num_reactions();
    let m = model.num_metabolites();
    if costs.num_reactions() != n {
        return Err(ModelError::DimensionMismatch {
            what: "costs",
            expected: n,
            found: costs.num_reactions(),
        }
        .into());
    }
    check_reserved_ids(model)?;
    let reversible = model.reversible_reactions();
    let k = reversible.len();
    let num_cols = n + k + 1;
    let pseudo_row = m;
    let cost_sink = n + k;

    let mut reverse_index = vec![None; n];
    let mut s = CooMatrix::new(m + 1, num_cols);
    for col in 0..n {
        for (row, coef) in model.column(col) {
            s.push(row, col, coef);
        }
        s.push(pseudo_row, col, costs.forward(col));
    }
    for (j, &col) in reversible.iter().enumerate() {
        let added = n + j;
        for (row, coef) in model.column(col) {
            s.push(row, added, -coef);
        }
        s.push(pseudo_row, added, costs.backward(col));
        reverse_index[col] = Some(added);
    }
    s.push(pseudo_row, cost_sink, -1.);

    let mut reactions = model.reactions().to_vec();
    reactions.extend(reversible.iter().map(|&col| reverse_id(&model.reactions()[col])));
    reactions.push(COST_SINK.to_string());
    let mut metabolites = model.metabolites().to_vec();
    metabolites.push(PSEUDO_METABOLITE.to_string());

    let mut b = model.rhs().iter().copied().collect::<Vec<_>>();
    b.push(0.);
    let mut ub = model.upper_bounds().iter().copied().collect::<Vec<_>>();
    ub.extend(reversible.iter().map(|&col| -model.lower_bounds()[col]));
    ub.push(f64::INFINITY);
    let mut c = DVector::zeros(num_cols);
    c[cost_sink] = 1.;

    log::debug!(
        "Split {} of {} reactions, augmented model has {} reactions and {} metabolites",
        k,
        n,
        num_cols,
        m + 1
    );
    Ok(AugmentedModel {
        model: StoichiometricModel::from_parts(
            metabolites,
            reactions,
            CscMatrix::from(&s),
            DVector::from_vec(b),
            DVector::zeros(num_cols),
            DVector::from_vec(ub),
            c,
        ),
        reverse_index,
        num_original: n,
        cost_sink,
    })
}
