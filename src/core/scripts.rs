// src/core/scripts.rs

use crate::constants::PACKAGE_MANIFEST_FILENAME;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

#[derive(Deserialize, Debug, Default)]
struct PackageManifest {
    #[serde(default)]
    scripts: BTreeMap<String, String>,
}

/// Reads the `scripts` table of a project's `package.json`.
///
/// A project without a manifest simply has no scripts; a manifest that cannot be parsed
/// is an error.
pub fn project_scripts(project_dir: &Path) -> Result<BTreeMap<String, String>> {
    let manifest_path = project_dir.join(PACKAGE_MANIFEST_FILENAME);
    if !manifest_path.is_file() {
        log::debug!("No manifest at '{}'", manifest_path.display());
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read '{}'", manifest_path.display()))?;
    let manifest: PackageManifest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse '{}'", manifest_path.display()))?;
    Ok(manifest.scripts)
}
