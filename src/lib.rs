//! Locale editor: an HTTP service for reading and writing per-project JSON
//! translation files, plus bootstrapping new languages from a template.

pub mod config;
pub mod error;
pub mod path_guard;
pub mod sanitize;
pub mod server;
pub mod store;

pub use error::{ErrorKind, LocaleError, LocaleResult};
pub use store::LocaleStore;
