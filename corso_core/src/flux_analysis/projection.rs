//! Mapping of split model solutions back onto the original reactions
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::flux_analysis::split::AugmentedModel;

/// Outcome of a CORSO run
///
/// When the objective can't carry flux (an infeasible model, or an optimum of zero) the
/// result is degenerate: `f` and `fm` are `None` and every flux is zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluxResult {
    /// Net flux of each original reaction
    pub x: Vec<f64>,
    /// Duals of the mass balances from the objective optimization, if the solver reports them
    pub y: Option<Vec<f64>>,
    /// Objective value the fluxes were fixed to
    pub f: Option<f64>,
    /// Minimal total weighted flux at that objective value
    pub fm: Option<f64>,
    /// Reaction ids, in the order of `x`
    pub reaction_ids: Vec<String>,
}

impl FluxResult {
    /// All-zero result for a model whose objective can't carry flux
    pub fn degenerate(reaction_ids: Vec<String>, y: Option<Vec<f64>>) -> Self {
        FluxResult {
            x: vec![0.; reaction_ids.len()],
            y,
            f: None,
            fm: None,
            reaction_ids,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.f.is_none()
    }

    /// Fluxes keyed by reaction id
    pub fn fluxes(&self) -> IndexMap<String, f64> {
        self.reaction_ids
            .iter()
            .cloned()
            .zip(self.x.iter().copied())
            .collect()
    }

    /// Flux of a single reaction
    pub fn flux(&self, reaction_id: &str) -> Option<f64> {
        self.reaction_ids
            .iter()
            .position(|id| id == reaction_id)
            .map(|idx| self.x[idx])
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Recombine forward and backward fluxes of a split model solution
///
/// Net fluxes with a magnitude below `zero_threshold` are reported as exactly zero.
pub fn project_solution(augmented: &AugmentedModel, x: &[f64], zero_threshold: f64) -> Vec<f64> {
    augmented
        .reverse_index()
        .iter()
        .enumerate()
        .map(|(idx, reverse)| {
            let net = match reverse {
                Some(reverse) => x[idx] - x[*reverse],
                None => x[idx],
            };
            if net.abs() < zero_threshold {
                0.
            } else {
                net
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flux_analysis::cost::{normalize_costs, CostSpec};
    use crate::flux_analysis::split::augment_model;
    use crate::metabolic_model::stoichiometric::StoichiometricModel;

    fn augmented() -> AugmentedModel {
        let model = StoichiometricModel::from_triplets(
            vec!["A".to_string(), "B".to_string()],
            vec!["EX_A".to_string(), "R2".to_string(), "EX_B".to_string()],
            &[(0, 0, 1.), (0, 1, -1.), (1, 1, 1.), (1, 2, -1.)],
            vec![-10., -1000., 0.],
            vec![10., 1000., 1000.],
            vec![0., 0., 1.],
        )
        .unwrap();
        let costs = normalize_costs(&CostSpec::default(), 3, true).unwrap();
        augment_model(&model, &costs).unwrap()
    }

    #[test]
    fn recombine() {
        let augmented = augmented();
        assert_eq!(augmented.reverse_index(), &[Some(3), Some(4), None]);
        // EX_A, R2, EX_B, EX_Aadded, R2added, EX_pseudomet
        let x = [0., 2., 5., 3., 7., 20.];
        assert_eq!(project_solution(&augmented, &x, 1e-8), vec![-3., -5., 5.]);
    }

    #[test]
    fn snap_to_zero() {
        let augmented = augmented();
        let x = [5. + 1e-10, 1e-9, 5., 5., 0., 10.];
        assert_eq!(project_solution(&augmented, &x, 1e-8), vec![0., 0., 5.]);
        let x = [5. + 1e-6, 0., 5., 5., 0., 10.];
        assert!(project_solution(&augmented, &x, 1e-8)[0] > 0.);
    }

    #[test]
    fn degenerate() {
        let ids = vec!["R1".to_string(), "R2".to_string(), "R3".to_string()];
        let result = FluxResult::degenerate(ids, None);
        assert!(result.is_degenerate());
        assert_eq!(result.x, vec![0.; 3]);
        assert_eq!(result.fm, None);
        assert_eq!(result.flux("R2"), Some(0.));
        assert_eq!(result.flux("R9"), None);
    }

    #[test]
    fn serialize() {
        let result = FluxResult {
            x: vec![1., -2.],
            y: None,
            f: Some(1.),
            fm: Some(3.),
            reaction_ids: vec!["R1".to_string(), "R2".to_string()],
        };
        let json = result.to_json().unwrap();
        assert!(json.contains("\"fm\":3.0"));
        let back: FluxResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        let fluxes = result.fluxes();
        assert_eq!(fluxes.get_index(1), Some((&"R2".to_string(), &-2.)));
    }
}
