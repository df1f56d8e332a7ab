//! Report discovery
//!
//! Expands the configured glob pattern into an ordered list of report paths,
//! skipping dependency caches.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Directories whose contents are never treated as project reports.
const DEPENDENCY_CACHES: [&str; 2] = ["node_modules", "vendor"];

/// Expand `pattern` into matching report paths, in glob order.
pub fn find_reports(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern)
        .with_context(|| format!("Invalid report pattern: {}", pattern))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?;
        if in_dependency_cache(&path) {
            continue;
        }
        paths.push(path);
    }

    Ok(paths)
}

fn in_dependency_cache(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => DEPENDENCY_CACHES.iter().any(|cache| *cache == name),
        _ => false,
    })
}
