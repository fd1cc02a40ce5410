//! Containment check for paths built from sanitized segments.
//!
//! Sanitization should already make traversal impossible; this is the second
//! line. Both sides are resolved to canonical absolute form and compared
//! component by component, so `locales-evil` is never mistaken for a child of
//! `locales`.

use crate::error::{LocaleError, LocaleResult};
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Returns `true` if `candidate`, joined onto `base_dir`, resolves inside `base_dir`.
///
/// The candidate does not have to exist yet. A base directory that cannot be
/// resolved makes every candidate unsafe.
pub fn is_path_safe(base_dir: &Path, candidate: &Path) -> bool {
    resolve_inside(base_dir, candidate).is_some()
}

/// Resolve `relative` under `base_dir`, failing with an authorization error if
/// the result would escape.
///
/// The returned path is the canonical one that was checked, so callers open
/// exactly what the guard approved.
pub fn guard(base_dir: &Path, relative: &Path) -> LocaleResult<PathBuf> {
    resolve_inside(base_dir, relative).ok_or_else(|| {
        warn!(
            "Rejected path outside base {}: {}",
            base_dir.display(),
            relative.display()
        );
        LocaleError::PathOutsideBase
    })
}

fn resolve_inside(base_dir: &Path, candidate: &Path) -> Option<PathBuf> {
    let base = base_dir.canonicalize().ok()?;
    let resolved = resolve(&base.join(relative_segments(candidate)?))?;
    resolved.starts_with(&base).then_some(resolved)
}

/// Keep only plain segments. `..` and absolute components are refused outright:
/// `..` after a symlink means something different to the OS than to a lexical
/// normalizer.
fn relative_segments(candidate: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(segment) => out.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the rest.
///
/// A dangling symlink along the way is refused, since writing through it would
/// land wherever it points.
fn resolve(path: &Path) -> Option<PathBuf> {
    let mut existing = path;
    let mut tail: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(real) => {
                return Some(tail.iter().rev().fold(real, |acc, segment| acc.join(segment)));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if existing.symlink_metadata().is_ok() {
                    return None;
                }
                tail.push(existing.file_name()?.to_owned());
                existing = existing.parent()?;
            }
            Err(_) => return None,
        }
    }
}
