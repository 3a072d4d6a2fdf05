use serde::{Deserialize, Serialize};

use crate::model::{validate_inputs, FeatureMap, Inputs, PerCustomer};

/// Default usage emphasis when a scenario does not set one.
pub const DEFAULT_ALPHA: f64 = 1.0;
/// Default overall CSAT goal shown next to predictions.
pub const DEFAULT_TARGET: f64 = 0.75;

/// A survey scenario: baseline scores, overall CSAT and usage telemetry.
///
/// Example YAML:
/// ```yaml
/// alpha: 1.0
/// target: 0.75
/// overall:
///   AWS: 0.602
///   Lab: 0.816
/// feature_scores:
///   AWS: { Search: 0.674, Export: 0.562, Change management: 0.644 }
///   Lab: { Search: 0.74, Export: 0.724, Change management: 0.803 }
/// usage:
///   AWS: { Search: 4722, Export: 253, Change management: 2662 }
///   Lab: { Search: 1289, Export: 181, Change management: 2069 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Usage emphasis exponent (default: 1.0)
    #[serde(default)]
    pub alpha: Option<f64>,

    /// Overall CSAT goal in [0, 1] (default: 0.75)
    #[serde(default)]
    pub target: Option<f64>,

    pub overall: PerCustomer<f64>,
    pub feature_scores: PerCustomer<FeatureMap<f64>>,
    pub usage: PerCustomer<FeatureMap<u64>>,
}

impl Default for Scenario {
    fn default() -> Self {
        let seed = Inputs::seed();
        Self {
            alpha: Some(seed.alpha),
            target: Some(DEFAULT_TARGET),
            overall: seed.overall,
            feature_scores: seed.feature_scores,
            usage: seed.usage,
        }
    }
}

impl Scenario {
    pub fn target(&self) -> f64 {
        self.target.unwrap_or(DEFAULT_TARGET)
    }

    /// Build engine inputs. `alpha_override` takes precedence over the file.
    pub fn to_inputs(&self, alpha_override: Option<f64>) -> Inputs {
        Inputs {
            feature_scores: self.feature_scores,
            overall: self.overall,
            usage: self.usage,
            alpha: alpha_override.or(self.alpha).unwrap_or(DEFAULT_ALPHA),
        }
    }

    /// Validate the scenario as it will be evaluated, target included.
    /// Returns all validation errors at once (not just the first).
    pub fn validate(&self, alpha_override: Option<f64>) -> Result<(), Vec<String>> {
        let mut errors = validate_inputs(&self.to_inputs(alpha_override))
            .err()
            .unwrap_or_default();

        if let Some(target) = self.target {
            if !target.is_finite() || !(0.0..=1.0).contains(&target) {
                errors.push(format!("target: must be between 0 and 1, got {}", target));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
