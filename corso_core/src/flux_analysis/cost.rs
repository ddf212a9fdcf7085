//! Per-reaction flux costs, as given by the caller and normalized for the split model
use serde::{Deserialize, Serialize};

use crate::flux_analysis::CorsoError;

/// Costs of carrying flux through each reaction
///
/// Deserializes from either a JSON number or a JSON array of numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostSpec {
    /// A single value
    Scalar(f64),
    /// One value per reaction (`n`), or one per reaction and direction (`2n`, forward
    /// costs first)
    Vector(Vec<f64>),
}

impl Default for CostSpec {
    fn default() -> Self {
        CostSpec::Scalar(1.)
    }
}

impl From<f64> for CostSpec {
    fn from(value: f64) -> Self {
        CostSpec::Scalar(value)
    }
}

impl From<Vec<f64>> for CostSpec {
    fn from(values: Vec<f64>) -> Self {
        CostSpec::Vector(values)
    }
}

impl From<&[f64]> for CostSpec {
    fn from(values: &[f64]) -> Self {
        CostSpec::Vector(values.to_vec())
    }
}

impl CostSpec {
    /// Number of cost values given
    pub fn len(&self) -> usize {
        match self {
            CostSpec::Scalar(_) => 1,
            CostSpec::Vector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn values(&self) -> &[f64] {
        match self {
            CostSpec::Scalar(value) => std::slice::from_ref(value),
            CostSpec::Vector(values) => values,
        }
    }
}

/// Costs for every reaction in both directions
///
/// Holds `2n` values: the forward cost of each reaction, followed by the backward cost of
/// each reaction, in reaction order.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedCosts {
    values: Vec<f64>,
    num_reactions: usize,
}

impl NormalizedCosts {
    pub fn num_reactions(&self) -> usize {
        self.num_reactions
    }

    /// Cost of forward flux through reaction `idx`
    pub fn forward(&self, idx: usize) -> f64 {
        self.values[idx]
    }

    /// Cost of backward flux through reaction `idx`
    pub fn backward(&self, idx: usize) -> f64 {
        self.values[self.num_reactions + idx]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Expand a cost specification to forward and backward costs for `num_reactions` reactions
///
/// - A single value becomes a unit cost for every reaction when `legacy_unit_cost_on_singleton`
///   is set, and is broadcast otherwise
/// - `n` values are used for both directions
/// - `2n` values are used as they are
///
/// # Examples
/// ```rust
/// use corso_core::flux_analysis::cost::{normalize_costs, CostSpec};
/// let costs = normalize_costs(&CostSpec::Vector(vec![1., 2.]), 2, true).unwrap();
/// assert_eq!(costs.as_slice(), &[1., 2., 1., 2.]);
/// let costs = normalize_costs(&CostSpec::Scalar(5.), 2, true).unwrap();
/// assert_eq!(costs.as_slice(), &[1., 1., 1., 1.]);
/// ```
pub fn normalize_costs(
    spec: &CostSpec,
    num_reactions: usize,
    legacy_unit_cost_on_singleton: bool,
) -> Result<NormalizedCosts, CorsoError> {
    let given = spec.values();
    for (index, value) in given.iter().enumerate() {
        if !value.is_finite() || *value < 0. {
            return Err(CorsoError::InvalidCost {
                index,
                value: *value,
            });
        }
    }
    let values = match given.len() {
        1 if legacy_unit_cost_on_singleton => vec![1.; 2 * num_reactions],
        1 => vec![given[0]; 2 * num_reactions],
        len if len == num_reactions => given.iter().chain(given.iter()).copied().collect(),
        len if len == 2 * num_reactions => given.to_vec(),
        found => {
            return Err(CorsoError::InvalidCostLength {
                num_reactions,
                found,
            })
        }
    };
    Ok(NormalizedCosts {
        values,
        num_reactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_legacy() {
        let costs = normalize_costs(&CostSpec::Scalar(5.), 3, true).unwrap();
        assert_eq!(costs.as_slice(), &[1.; 6]);
        let costs = normalize_costs(&CostSpec::Vector(vec![7.]), 3, true).unwrap();
        assert_eq!(costs.as_slice(), &[1.; 6]);
    }

    #[test]
    fn singleton_broadcast() {
        let costs = normalize_costs(&CostSpec::Scalar(5.), 3, false).unwrap();
        assert_eq!(costs.as_slice(), &[5.; 6]);
        assert_eq!(costs.num_reactions(), 3);
    }

    #[test]
    fn per_reaction() {
        let costs = normalize_costs(&vec![1., 2., 3.].into(), 3, true).unwrap();
        assert_eq!(costs.as_slice(), &[1., 2., 3., 1., 2., 3.]);
        assert_eq!(costs.forward(1), 2.);
        assert_eq!(costs.backward(1), 2.);
    }

    #[test]
    fn per_direction() {
        let spec = CostSpec::Vector(vec![1., 2., 3., 4., 5., 6.]);
        let costs = normalize_costs(&spec, 3, true).unwrap();
        assert_eq!(costs.forward(0), 1.);
        assert_eq!(costs.backward(0), 4.);
        assert_eq!(costs.backward(2), 6.);
    }

    #[test]
    fn single_reaction_model() {
        // With one reaction a one-element vector is both the singleton and the n case
        let costs = normalize_costs(&CostSpec::Vector(vec![3.]), 1, false).unwrap();
        assert_eq!(costs.as_slice(), &[3., 3.]);
    }

    #[test]
    fn bad_length() {
        let res = normalize_costs(&CostSpec::Vector(vec![1., 2., 3., 4.]), 3, true);
        assert_eq!(
            res,
            Err(CorsoError::InvalidCostLength {
                num_reactions: 3,
                found: 4
            })
        );
        let res = normalize_costs(&CostSpec::Vector(vec![]), 3, true);
        assert!(matches!(
            res,
            Err(CorsoError::InvalidCostLength { found: 0, .. })
        ));
    }

    #[test]
    fn bad_values() {
        let res = normalize_costs(&CostSpec::Vector(vec![1., -2., 3.]), 3, true);
        assert!(matches!(
            res,
            Err(CorsoError::InvalidCost { index: 1, .. })
        ));
        let res = normalize_costs(&CostSpec::Scalar(f64::NAN), 3, true);
        assert!(matches!(
            res,
            Err(CorsoError::InvalidCost { index: 0, .. })
        ));
        let res = normalize_costs(&CostSpec::Vector(vec![1., f64::INFINITY, 3.]), 3, true);
        assert!(matches!(
            res,
            Err(CorsoError::InvalidCost { index: 1, .. })
        ));
    }

    #[test]
    fn from_json() {
        let spec: CostSpec = serde_json::from_str("2.5").unwrap();
        assert_eq!(spec, CostSpec::Scalar(2.5));
        let spec: CostSpec = serde_json::from_str("[1, 2.0, 3]").unwrap();
        assert_eq!(spec, CostSpec::Vector(vec![1., 2., 3.]));
        assert_eq!(spec.len(), 3);
        assert!(serde_json::from_str::<CostSpec>("\"cheap\"").is_err());
        assert_eq!(CostSpec::default(), CostSpec::Scalar(1.));
    }
}
