//! Manifest and lockfile reading
//!
//! Deserializes only the subset of `package.json` and `package-lock.json`
//! this tool consumes: the declared dependency maps and the resolved
//! versions. The manifest must parse; the lockfile is best-effort enrichment
//! and every lockfile problem is swallowed with a debug log.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;

/// The project's declared-dependency document.
pub const MANIFEST_FILE: &str = "package.json";
/// The only lockfile parsed for enrichment (npm-style).
pub const NPM_LOCKFILE: &str = "package-lock.json";

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Dependency {
    /// Renders the install token, `name@version`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Subset of `package.json` consumed by this tool.
///
/// `serde_json` is built with `preserve_order`, so both maps iterate in
/// declaration order, which is part of the output contract.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    #[serde(default)]
    dependencies: Map<String, Value>,
    #[serde(default)]
    dev_dependencies: Map<String, Value>,
}

/// Subset of `package-lock.json` consumed for enrichment. Covers both the
/// v2/v3 `packages` shape and the v1 `dependencies` shape.
#[derive(Debug, Default, Deserialize)]
struct Lockfile {
    #[serde(default)]
    packages: Map<String, Value>,
    #[serde(default)]
    dependencies: Map<String, Value>,
}

/// Declared dependencies merged with best-effort lockfile resolution.
///
/// Manifest entries come first in declaration order (`dependencies`, then
/// `devDependencies`, first occurrence keeps its position, later version
/// wins). Lockfile-resolved versions overwrite manifest versions; names only
/// the lockfile knows are appended after the manifest entries.
///
/// A missing manifest yields an empty list; the caller treats that as a
/// fatal precondition.
pub fn read_dependencies(dir: &Path) -> Result<Vec<Dependency>> {
    let Some(manifest) = load_manifest(dir)? else {
        debug!("No {} in {}", MANIFEST_FILE, dir.display());
        return Ok(Vec::new());
    };
    let mut deps = merged_dependencies(&manifest);

    if let Some(resolved) = lockfile_entries(dir) {
        for (name, version) in resolved {
            match deps.iter_mut().find(|dep| dep.name == name) {
                Some(dep) => dep.version = version,
                None => deps.push(Dependency::new(name, version)),
            }
        }
    }

    Ok(deps)
}

/// Names declared in the manifest right now, in merge order.
///
/// The removal step calls this instead of trusting an earlier snapshot, and
/// it deliberately ignores the lockfile.
pub fn declared_names(dir: &Path) -> Result<Vec<String>> {
    let Some(manifest) = load_manifest(dir)? else {
        return Ok(Vec::new());
    };
    Ok(merged_dependencies(&manifest)
        .into_iter()
        .map(|dep| dep.name)
        .collect())
}

fn load_manifest(dir: &Path) -> Result<Option<Manifest>> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

fn merged_dependencies(manifest: &Manifest) -> Vec<Dependency> {
    let mut deps: Vec<Dependency> = Vec::new();
    let declared = manifest
        .dependencies
        .iter()
        .chain(manifest.dev_dependencies.iter());
    for (name, version) in declared {
        // Versions are strings in any well-formed manifest; anything else is
        // a schema mismatch and is ignored.
        let Some(version) = version.as_str() else {
            debug!("Ignoring non-string version for {}", name);
            continue;
        };
        match deps.iter_mut().find(|dep| dep.name == *name) {
            Some(dep) => dep.version = version.to_string(),
            None => deps.push(Dependency::new(name, version)),
        }
    }
    deps
}

/// Resolved `name -> version` pairs from the npm lockfile, in file order.
/// Returns `None` on any read, parse, or schema problem.
fn lockfile_entries(dir: &Path) -> Option<Vec<(String, String)>> {
    let path = dir.join(NPM_LOCKFILE);
    let raw = fs::read_to_string(&path).ok()?;
    let lockfile: Lockfile = match serde_json::from_str(&raw) {
        Ok(lockfile) => lockfile,
        Err(e) => {
            debug!("Ignoring unparseable {}: {}", NPM_LOCKFILE, e);
            return None;
        }
    };

    // Lockfile v2/v3: keys under "packages" look like "node_modules/<name>";
    // the root entry ("") and nested installs are skipped.
    let mut resolved: Vec<(String, String)> = Vec::new();
    for (key, entry) in &lockfile.packages {
        let Some(name) = key.strip_prefix("node_modules/") else {
            continue;
        };
        if name.contains("node_modules/") {
            continue;
        }
        if let Some(version) = entry.get("version").and_then(Value::as_str) {
            resolved.push((name.to_string(), version.to_string()));
        }
    }
    if !resolved.is_empty() {
        return Some(resolved);
    }

    // Lockfile v1: top-level "dependencies" maps name -> { version }.
    for (name, entry) in &lockfile.dependencies {
        if let Some(version) = entry.get("version").and_then(Value::as_str) {
            resolved.push((name.clone(), version.to_string()));
        }
    }
    if resolved.is_empty() {
        None
    } else {
        Some(resolved)
    }
}
