use anyhow::{bail, Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::schema::Scenario;

const HEADER: &str = "\
# csat-driver scenario
# Feature scores and overall CSAT are on a 0..1 scale; usage is raw counts.
# alpha: 0 = ignore usage, 1 = linear usage share, >1 = emphasize heavy usage.
";

/// Write the built-in seed scenario to `path`, or the default scenario path.
///
/// Refuses to replace an existing file unless `force` is set. The write is
/// atomic, so a failed write never leaves a truncated scenario behind.
pub fn write_seed_scenario(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p,
        None => super::get_scenario_path()?,
    };
    write_scenario(&path, &Scenario::default(), force)?;
    Ok(path)
}

fn write_scenario(path: &Path, scenario: &Scenario, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Scenario already exists at {}. Use --force to overwrite",
            path.display()
        );
    }

    let yaml = serde_saphyr::to_string(scenario)
        .map_err(|e| anyhow::anyhow!("Failed to serialize scenario: {}", e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(HEADER.as_bytes())
        .context("Failed to write scenario header")?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write scenario to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save scenario to {}", path.display()))?;

    tracing::info!(path = %path.display(), "Wrote seed scenario");
    Ok(())
}
