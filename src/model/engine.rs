use super::types::{
    Customer, DeltaMap, FeatureMap, FeatureScoreMap, Inputs, Outcome, PerCustomer, Prediction,
    UsageMap, Weights,
};

/// Keeps proximity finite when a feature score equals the overall score.
pub const PROXIMITY_EPSILON: f64 = 1e-6;

/// Fraction of each customer's tracked usage spent in each feature.
///
/// A customer with no usage at all gets all-zero shares rather than NaN.
pub fn usage_shares(usage: &PerCustomer<UsageMap>) -> PerCustomer<FeatureMap<f64>> {
    usage.map(|_, row| {
        // summed in f64 so very large counts cannot overflow
        let total: f64 = row.iter().map(|(_, n)| *n as f64).sum();
        let total = if total == 0.0 { 1.0 } else { total };
        row.map(|_, n| *n as f64 / total)
    })
}

/// Derive per-feature weights and a calibrating intercept for every customer.
///
/// Importance is inverse distance between a feature's score and the overall
/// score, modulated by `share^alpha`, then normalized to sum to 1. The
/// intercept absorbs the remainder so that `intercept + Σ w·score == overall`.
///
/// When every `share^alpha` is zero the weights fall back to all zero and the
/// intercept equals the overall score. That happens for a customer with no
/// usage and `alpha > 0`, and also when alpha is so large that every non-zero
/// share underflows to zero.
pub fn compute_weights(inputs: &Inputs) -> Weights {
    let shares = usage_shares(&inputs.usage);
    let mut weights = PerCustomer::<FeatureMap<f64>>::default();
    let mut intercept = PerCustomer::<f64>::default();

    for customer in Customer::ALL {
        let scores = &inputs.feature_scores[customer];
        let overall = inputs.overall[customer];

        let raw = scores.map(|feature, score| {
            let proximity = 1.0 / ((score - overall).abs() + PROXIMITY_EPSILON);
            // powf(0, 0) is 1, so zero-usage features still count when alpha is 0
            proximity * shares[customer][feature].powf(inputs.alpha)
        });
        let sum = raw.sum();
        let sum = if sum == 0.0 { 1.0 } else { sum };
        let w = raw.map(|_, r| r / sum);

        intercept[customer] = overall - weighted_sum(&w, scores);
        weights[customer] = w;

        tracing::trace!(
            customer = %customer,
            intercept = intercept[customer],
            "Computed weights"
        );
    }

    Weights { weights, intercept }
}

/// Predict each customer's overall score after applying `deltas`.
///
/// Weights and intercept always come from the unperturbed baseline. Each
/// supplied delta moves its feature score, clamped to [0, 1]; the prediction
/// itself is left unclamped.
pub fn predict_overall(inputs: &Inputs, deltas: Option<&DeltaMap>) -> Prediction {
    let Weights { weights, intercept } = compute_weights(inputs);

    let result = PerCustomer::from_fn(|customer| {
        let base = &inputs.feature_scores[customer];
        let scores = match deltas {
            Some(d) => apply_deltas(base, &d[customer]),
            None => *base,
        };
        let now = inputs.overall[customer];
        let pred = intercept[customer] + weighted_sum(&weights[customer], &scores);
        Outcome {
            now,
            pred,
            delta: pred - now,
        }
    });

    Prediction {
        weights,
        intercept,
        result,
    }
}

/// Shift scores by the supplied deltas, clamping each shifted score into [0, 1].
pub fn apply_deltas(base: &FeatureScoreMap, deltas: &FeatureMap<Option<f64>>) -> FeatureScoreMap {
    base.map(|feature, score| match deltas[feature] {
        Some(d) => (score + d).clamp(0.0, 1.0),
        None => *score,
    })
}

fn weighted_sum(weights: &FeatureMap<f64>, scores: &FeatureScoreMap) -> f64 {
    weights.iter().map(|(f, w)| w * scores[f]).sum()
}
