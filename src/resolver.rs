//! Package attribution
//!
//! Clover reports list plain file paths; the owning package is inferred by
//! walking up the directory tree looking for a dependency manifest
//! (`composer.json`, then `package.json`) and reading its `name` field.
//! Resolutions are cached by directory prefix for the lifetime of one run, so
//! sibling files resolve without touching the filesystem again.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Fallback package name when no manifest resolves.
pub const UNKNOWN_PACKAGE: &str = "unknown";

/// Manifest file names checked in each ancestor directory, in order.
const MANIFEST_NAMES: [&str; 2] = ["composer.json", "package.json"];

/// Reads a dependency manifest in a directory and reports its package name.
///
/// A separate trait so tests can count lookups and pre-can answers.
pub trait ManifestReader {
    fn package_name(&self, dir: &Path) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct Manifest {
    name: String,
}

/// Filesystem-backed manifest lookup.
#[derive(Debug, Default)]
pub struct FsManifestReader;

impl ManifestReader for FsManifestReader {
    fn package_name(&self, dir: &Path) -> Option<String> {
        for manifest_name in MANIFEST_NAMES {
            let path = dir.join(manifest_name);
            if !path.exists() {
                continue;
            }
            match read_manifest(&path) {
                Ok(manifest) => return Some(manifest.name),
                Err(e) => {
                    // Unparsable manifest counts as absent; keep walking.
                    eprintln!("Warning: Failed to read manifest {:?}: {}", path, e);
                }
            }
        }
        None
    }
}

fn read_manifest(path: &Path) -> anyhow::Result<Manifest> {
    let content = fs::read_to_string(path)?;
    let manifest: Manifest = serde_json::from_str(&content)?;
    Ok(manifest)
}

/// Resolves file paths to package names with a run-lifetime prefix cache.
#[derive(Debug)]
pub struct PackageResolver<R: ManifestReader = FsManifestReader> {
    cache: HashMap<String, String>,
    manifests: R,
}

impl PackageResolver<FsManifestReader> {
    pub fn new() -> Self {
        Self::with_reader(FsManifestReader)
    }
}

impl Default for PackageResolver<FsManifestReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ManifestReader> PackageResolver<R> {
    pub fn with_reader(manifests: R) -> Self {
        Self {
            cache: HashMap::new(),
            manifests,
        }
    }

    /// Pre-seed a directory-prefix resolution.
    pub fn seed(&mut self, prefix: &str, package: &str) {
        self.cache.insert(prefix.to_string(), package.to_string());
    }

    /// Resolve the package that owns `file_path`. Never fails; unresolvable
    /// paths land in [`UNKNOWN_PACKAGE`].
    pub fn resolve(&mut self, file_path: &str) -> String {
        let parts: Vec<&str> = file_path.split('/').collect();

        // Walk cached prefixes root-most first; a longer match overrides a
        // shorter one, so the most specific cached ancestor wins.
        let mut package = UNKNOWN_PACKAGE.to_string();
        for i in 0..parts.len() {
            if let Some(name) = self.cache.get(&parts[..i].join("/")) {
                package = name.clone();
            }
        }
        if package != UNKNOWN_PACKAGE {
            return package;
        }

        // No cached ancestor: search upward for a manifest, dropping the
        // file name first.
        let mut parts = parts;
        loop {
            parts.pop();
            let dir = parts.join("/");
            if let Some(name) = self.manifests.package_name(Path::new(&dir)) {
                package = name;
                break;
            }
            if parts.is_empty() {
                break;
            }
        }

        // Remember the directory where the walk stopped so siblings resolve
        // without another filesystem search.
        self.cache.insert(parts.join("/"), package.clone());

        package
    }
}
