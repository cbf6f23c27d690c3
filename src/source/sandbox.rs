//! Path sandbox for file sources and output files

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Restricts file access to a set of root directories.
///
/// Roots are canonicalized once, when the sandbox is built. A sandbox built
/// from an empty root list allows every path.
#[derive(Debug, Clone, Default)]
pub struct PathSandbox {
    roots: Vec<PathBuf>,
    restricted: bool,
}

fn denied(path: &Path) -> Error {
    Error::PathAccessDenied {
        path: path.display().to_string(),
    }
}

impl PathSandbox {
    /// Build a sandbox over `roots`.
    ///
    /// Roots that cannot be canonicalized are skipped. The sandbox stays
    /// restricted even if none of them survive.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut restricted = false;
        let roots = roots
            .into_iter()
            .filter_map(|root| {
                restricted = true;
                let root = root.as_ref();
                match std::fs::canonicalize(root) {
                    Ok(canonical) => Some(canonical),
                    Err(e) => {
                        tracing::warn!(root = %root.display(), error = %e, "Skipping resource directory");
                        None
                    }
                }
            })
            .collect();

        Self { roots, restricted }
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    /// Check a path that must already exist
    pub fn check_existing(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if !self.restricted {
            return Ok(path.to_path_buf());
        }

        let canonical = std::fs::canonicalize(path).map_err(|_| denied(path))?;
        self.admit(path, canonical)
    }

    /// Check a path that is about to be written.
    ///
    /// Only the parent directory has to exist.
    pub fn check_output(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if !self.restricted {
            return Ok(path.to_path_buf());
        }

        let file_name = path.file_name().ok_or_else(|| denied(path))?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let canonical_parent = std::fs::canonicalize(parent).map_err(|_| denied(path))?;
        self.admit(path, canonical_parent.join(file_name))
    }

    fn admit(&self, requested: &Path, canonical: PathBuf) -> Result<PathBuf> {
        if self.roots.iter().any(|root| canonical.starts_with(root)) {
            Ok(canonical)
        } else {
            tracing::debug!(path = %requested.display(), "Path outside resource directories");
            Err(denied(requested))
        }
    }
}
