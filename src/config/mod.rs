mod init;
mod schema;

pub use init::write_seed_scenario;
pub use schema::{Scenario, DEFAULT_ALPHA, DEFAULT_TARGET};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/csat-driver/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("csat-driver"))
}

/// Get the default scenario file path (~/.config/csat-driver/scenario.yaml)
pub fn get_scenario_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("scenario.yaml"))
}

/// Load a scenario from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to a scenario file. If None, uses the default path
///   (~/.config/csat-driver/scenario.yaml) and falls back to the built-in seed
///   scenario when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given file does not exist
/// - The file cannot be read
/// - The YAML cannot be parsed
pub fn load_scenario(path: Option<PathBuf>) -> Result<Scenario> {
    match path {
        Some(p) => load_scenario_from(&p, true),
        None => load_scenario_from(&get_scenario_path()?, false),
    }
}

fn load_scenario_from(path: &Path, required: bool) -> Result<Scenario> {
    if !path.exists() {
        if required {
            anyhow::bail!("Scenario file not found at {}", path.display());
        }
        tracing::debug!(
            path = %path.display(),
            "No scenario file, using built-in seed scenario"
        );
        return Ok(Scenario::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file at {}", path.display()))?;

    let scenario: Scenario = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse scenario: invalid YAML in {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Loaded scenario");
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_scenario(Some(dir.path().join("nope.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_missing_default_file_uses_seed() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = load_scenario_from(&dir.path().join("scenario.yaml"), false).unwrap();
        assert_eq!(scenario, Scenario::default());
    }

    #[test]
    fn test_load_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        fs::write(
            &path,
            r#"
alpha: 0.5
overall: { AWS: 0.5, Lab: 0.6 }
feature_scores:
  AWS: { Search: 0.4, Export: 0.5, Change management: 0.6 }
  Lab: { Search: 0.7, Export: 0.6, Change management: 0.5 }
usage:
  AWS: { Search: 1, Export: 2, Change management: 3 }
  Lab: { Search: 4, Export: 5, Change management: 6 }
"#,
        )
        .unwrap();

        let scenario = load_scenario(Some(path)).unwrap();
        assert_eq!(scenario.alpha, Some(0.5));
        assert_eq!(scenario.usage.lab.change_management, 6);
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "overall: [not, a, map]\n").unwrap();

        let err = load_scenario(Some(path)).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.yaml"));
    }
}
