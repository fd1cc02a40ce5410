//! Sanitizers for the untrusted identifiers used to build locale paths.
//!
//! Folder names and language codes are validated by rejection: anything
//! unexpected is an error. Filenames have no fixed universe, so disallowed
//! characters are stripped instead.

use crate::error::{LocaleError, LocaleResult};
use anyhow::{bail, Result};
use regex::Regex;
use std::sync::OnceLock;

static LANGUAGE_CODE_REGEX: OnceLock<Regex> = OnceLock::new();
static FILENAME_STRIP_REGEX: OnceLock<Regex> = OnceLock::new();

fn language_code_regex() -> &'static Regex {
    LANGUAGE_CODE_REGEX.get_or_init(|| Regex::new(r"^[a-z]{2}$").expect("valid regex"))
}

fn filename_strip_regex() -> &'static Regex {
    FILENAME_STRIP_REGEX.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("valid regex"))
}

/// The closed allow-list of project folders.
///
/// Built once at startup and shared by every operation. Iteration order is
/// the order the folders were configured in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSet {
    names: Vec<String>,
}

impl FolderSet {
    /// Build an allow-list, rejecting names that could not safely be a single
    /// path segment.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            bail!("folder allow-list must not be empty");
        }

        for (i, name) in names.iter().enumerate() {
            if name.is_empty() || sanitize_filename(name) != *name {
                bail!("folder name '{}' may only contain [A-Za-z0-9_-]", name);
            }
            if names[..i].contains(name) {
                bail!("folder name '{}' is listed more than once", name);
            }
        }

        Ok(Self { names })
    }

    /// Accept `input` only if it exactly matches an allow-listed folder.
    ///
    /// Case-sensitive, no normalization.
    pub fn sanitize(&self, input: &str) -> LocaleResult<&str> {
        self.names
            .iter()
            .find(|name| name.as_str() == input)
            .map(String::as_str)
            .ok_or_else(|| LocaleError::InvalidFolder(input.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for FolderSet {
    fn default() -> Self {
        Self {
            names: vec!["pecan".to_string(), "admin".to_string(), "web".to_string()],
        }
    }
}

/// Trim and lowercase `input`, then require exactly two letters `a-z`.
///
/// This is a shape check only; any two-letter combination passes.
pub fn sanitize_language_code(input: &str) -> LocaleResult<String> {
    let code = input.trim().to_lowercase();

    if language_code_regex().is_match(&code) {
        Ok(code)
    } else {
        Err(LocaleError::InvalidLanguageCode(input.to_string()))
    }
}

/// Remove every character outside `[a-zA-Z0-9_-]`. Never fails.
pub fn sanitize_filename(input: &str) -> String {
    filename_strip_regex().replace_all(input, "").into_owned()
}

/// Strip `input` and reject the result if nothing is left.
///
/// An empty name would otherwise turn into the path segment `.json`.
pub fn require_filename(input: &str) -> LocaleResult<String> {
    let name = sanitize_filename(input);
    if name.is_empty() {
        return Err(LocaleError::InvalidFilename(input.to_string()));
    }
    Ok(name)
}
