//! Sandbox containment for skill directories and reference files.
//!
//! A [`Sandbox`] wraps a canonicalized base directory. Every path handed out
//! by it is a [`ContainedPath`]: resolved (symbolic links followed, `.` and
//! `..` collapsed) and verified to be a strict descendant of the base. The
//! comparison is component-wise, so `/skills-evil` is never mistaken for a
//! child of `/skills`.
//!
//! Paths that do not exist yet are resolved through their deepest existing
//! ancestor, so a missing target still fails closed if it would land outside
//! the base once created.

use crate::error::{PathError, PathResult};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// A path verified to lie strictly inside its sandbox.
///
/// Can only be constructed through [`Sandbox::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainedPath {
    inner: PathBuf,
}

impl ContainedPath {
    pub fn as_path(&self) -> &Path {
        &self.inner
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.inner
    }

    pub fn display(&self) -> std::path::Display<'_> {
        self.inner.display()
    }

    pub fn exists(&self) -> bool {
        self.inner.exists()
    }
}

impl AsRef<Path> for ContainedPath {
    fn as_ref(&self) -> &Path {
        &self.inner
    }
}

/// Canonical base directory that resolved paths must stay under.
#[derive(Debug, Clone)]
pub struct Sandbox {
    base: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `base`, which must exist.
    pub fn new(base: impl AsRef<Path>) -> PathResult<Self> {
        let base = base.as_ref();
        let canonical = base.canonicalize().map_err(|source| PathError::Io {
            path: base.to_path_buf(),
            source,
        })?;
        Ok(Self { base: canonical })
    }

    /// The canonical base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve `candidate` and require it to be a strict descendant of the base.
    ///
    /// Relative candidates are joined onto the base first.
    pub fn resolve(&self, candidate: impl AsRef<Path>) -> PathResult<ContainedPath> {
        let candidate = candidate.as_ref();
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base.join(candidate)
        };

        let resolved = resolve_path(&joined).map_err(|source| PathError::Io {
            path: joined.clone(),
            source,
        })?;

        if is_strict_descendant(&resolved, &self.base) {
            Ok(ContainedPath { inner: resolved })
        } else {
            tracing::warn!(
                path = %joined.display(),
                resolved = %resolved.display(),
                base = %self.base.display(),
                "Rejected path outside sandbox"
            );
            Err(PathError::Traversal {
                path: joined,
                base: self.base.clone(),
            })
        }
    }
}

/// Whether `path` is below `base` and not equal to it, compared by components.
pub fn is_strict_descendant(path: &Path, base: &Path) -> bool {
    path != base && path.starts_with(base)
}

/// Canonicalize `path`, resolving a non-existent tail lexically on top of its
/// deepest existing ancestor.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut pending: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                for component in pending.iter().rev() {
                    if component == ".." {
                        resolved.pop();
                    } else if component != "." {
                        resolved.push(component);
                    }
                }
                return Ok(resolved);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let Some(last) = existing.components().next_back() else {
                    return Err(err);
                };
                pending.push(last.as_os_str().to_os_string());
                if !existing.pop() {
                    return Err(err);
                }
            }
            Err(err) => return Err(err),
        }
    }
}
