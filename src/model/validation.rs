use super::types::{Customer, DeltaMap, Inputs};

/// Validate engine inputs before evaluation.
/// Returns all validation errors at once (not just the first).
pub fn validate_inputs(inputs: &Inputs) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !inputs.alpha.is_finite() || inputs.alpha < 0.0 {
        errors.push(format!(
            "alpha: must be a non-negative number, got {}",
            inputs.alpha
        ));
    }

    for customer in Customer::ALL {
        check_unit(
            &mut errors,
            &format!("overall.{}", customer),
            inputs.overall[customer],
        );
        for (feature, score) in inputs.feature_scores[customer].iter() {
            check_unit(
                &mut errors,
                &format!("feature_scores.{}.{}", customer, feature),
                *score,
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Deltas may be any finite value; out-of-range scores are clamped later.
pub fn validate_deltas(deltas: &DeltaMap) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (customer, row) in deltas.iter() {
        for (feature, delta) in row.iter() {
            if let Some(d) = delta {
                if !d.is_finite() {
                    errors.push(format!(
                        "deltas.{}.{}: must be a finite number, got {}",
                        customer, feature, d
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_unit(errors: &mut Vec<String>, path: &str, value: f64) {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        errors.push(format!("{}: must be between 0 and 1, got {}", path, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_valid() {
        assert!(validate_inputs(&Inputs::seed()).is_ok());
    }

    #[test]
    fn test_negative_alpha() {
        let inputs = Inputs::seed().with_alpha(-0.5);
        let errors = validate_inputs(&inputs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("alpha"));
    }

    #[test]
    fn test_nan_alpha() {
        let inputs = Inputs::seed().with_alpha(f64::NAN);
        assert!(validate_inputs(&inputs).is_err());
    }

    #[test]
    fn test_score_out_of_range() {
        let mut inputs = Inputs::seed();
        inputs.feature_scores.lab.export = 1.2;
        let errors = validate_inputs(&inputs).unwrap_err();
        assert!(errors[0].contains("feature_scores.Lab.Export"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut inputs = Inputs::seed().with_alpha(-1.0); // Error 1
        inputs.overall.aws = -0.1; // Error 2
        inputs.feature_scores.aws.change_management = f64::INFINITY; // Error 3
        let errors = validate_inputs(&inputs).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("overall.AWS")));
        assert!(errors
            .iter()
            .any(|e| e.contains("feature_scores.AWS.Change management")));
    }

    #[test]
    fn test_boundaries_are_valid() {
        let mut inputs = Inputs::seed().with_alpha(0.0);
        inputs.overall.lab = 1.0;
        inputs.feature_scores.aws.search = 0.0;
        assert!(validate_inputs(&inputs).is_ok());
    }

    #[test]
    fn test_large_finite_delta_is_valid() {
        let mut deltas = DeltaMap::default();
        deltas.aws.search = Some(3.0);
        deltas.lab.export = Some(-7.5);
        assert!(validate_deltas(&deltas).is_ok());
    }

    #[test]
    fn test_non_finite_delta() {
        let mut deltas = DeltaMap::default();
        deltas.lab.search = Some(f64::NAN);
        let errors = validate_deltas(&deltas).unwrap_err();
        assert!(errors[0].contains("deltas.Lab.Search"));
    }
}
