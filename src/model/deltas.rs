use anyhow::{bail, Context, Result};

use super::types::{Customer, DeltaMap, Feature};

/// Parse a delta assignment of the form `<customer>.<feature>=<value>`.
///
/// The value is a signed decimal on the 0..1 scale, or percentage points
/// with a `pp` suffix: `aws.search=+0.1`, `lab.change-management=-5pp`.
pub fn parse_delta(s: &str) -> Result<(Customer, Feature, f64)> {
    let s = s.trim();
    let (key, value) = s
        .split_once('=')
        .with_context(|| format!("Delta must look like <customer>.<feature>=<value>: {}", s))?;
    let (customer, feature) = key
        .split_once('.')
        .with_context(|| format!("Delta key must be <customer>.<feature>: {}", key.trim()))?;

    let customer: Customer = customer.parse()?;
    let feature: Feature = feature.parse()?;
    let value = parse_value(value.trim())
        .with_context(|| format!("Invalid delta value in '{}'", s))?;

    Ok((customer, feature, value))
}

fn parse_value(s: &str) -> Result<f64> {
    let value = if let Some(pp) = s.strip_suffix("pp") {
        pp.trim().parse::<f64>()? / 100.0
    } else {
        s.parse::<f64>()?
    };
    if !value.is_finite() {
        bail!("must be a finite number: {}", s);
    }
    Ok(value)
}

/// Fold several assignments into a delta map. Setting the same key twice is an error.
pub fn parse_deltas<S: AsRef<str>>(assignments: &[S]) -> Result<DeltaMap> {
    let mut deltas = DeltaMap::default();
    for raw in assignments {
        let (customer, feature, value) = parse_delta(raw.as_ref())?;
        let slot = &mut deltas[customer][feature];
        if slot.is_some() {
            bail!("Delta for {} {} given more than once", customer, feature);
        }
        *slot = Some(value);
    }
    Ok(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_delta() {
        let (c, f, v) = parse_delta("aws.search=+0.1").unwrap();
        assert_eq!(c, Customer::Aws);
        assert_eq!(f, Feature::Search);
        assert_eq!(v, 0.1);
    }

    #[test]
    fn test_parse_negative_delta() {
        let (_, _, v) = parse_delta("lab.export=-0.25").unwrap();
        assert_eq!(v, -0.25);
    }

    #[test]
    fn test_parse_percentage_points() {
        let (c, f, v) = parse_delta("Lab.change-management=-5pp").unwrap();
        assert_eq!(c, Customer::Lab);
        assert_eq!(f, Feature::ChangeManagement);
        assert!((v + 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_parse_with_spaces() {
        let (_, f, v) = parse_delta(" aws.Change management = 0.02 ").unwrap();
        assert_eq!(f, Feature::ChangeManagement);
        assert_eq!(v, 0.02);
    }

    #[test]
    fn test_parse_missing_equals() {
        assert!(parse_delta("aws.search").is_err());
    }

    #[test]
    fn test_parse_missing_feature() {
        assert!(parse_delta("aws=0.1").is_err());
    }

    #[test]
    fn test_parse_unknown_customer() {
        let err = parse_delta("gcp.search=0.1").unwrap_err();
        assert!(err.to_string().contains("Unknown customer"));
    }

    #[test]
    fn test_parse_rejects_nan() {
        assert!(parse_delta("aws.search=NaN").is_err());
        assert!(parse_delta("aws.search=abc").is_err());
    }

    #[test]
    fn test_parse_deltas_builds_map() {
        let deltas = parse_deltas(&["aws.search=0.1", "lab.export=-2pp"]).unwrap();
        assert_eq!(deltas.aws.search, Some(0.1));
        assert_eq!(deltas.aws.export, None);
        assert!((deltas.lab.export.unwrap() + 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_parse_deltas_rejects_duplicates() {
        let err = parse_deltas(&["aws.search=0.1", "AWS.Search=0.2"]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_parse_deltas_empty() {
        let none: [&str; 0] = [];
        assert_eq!(parse_deltas(&none).unwrap(), DeltaMap::default());
    }
}
