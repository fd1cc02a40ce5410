//! Locale store: reads and writes translation files under the base directory.
//!
//! Layout on disk is `<base>/<folder>/<lang>/<file>.json`. Every operation
//! sanitizes its inputs and passes the resulting path through the path guard
//! before touching storage. Nothing is cached; every call re-reads the disk.

use crate::error::{LocaleError, LocaleResult};
use crate::path_guard;
use crate::sanitize::{require_filename, sanitize_language_code, FolderSet};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const LOCALE_EXTENSION: &str = ".json";

/// Folder name to the base filenames (without `.json`) of its template language.
pub type Structure = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone)]
pub struct LocaleStore {
    base_dir: PathBuf,
    folders: FolderSet,
    template_language: String,
}

impl LocaleStore {
    /// Create a store rooted at `base_dir`.
    ///
    /// `template_language` is the language whose file set is listed by
    /// [`read_structure`](Self::read_structure) and cloned by
    /// [`create_language`](Self::create_language).
    pub fn new(
        base_dir: impl Into<PathBuf>,
        folders: FolderSet,
        template_language: impl Into<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            folders,
            template_language: template_language.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// List the template language's files for every folder.
    ///
    /// Fails as a whole if any folder's template directory is unreadable.
    pub async fn read_structure(&self) -> LocaleResult<Structure> {
        let mut structure = Structure::new();

        for folder in self.folders.iter() {
            let dir = self.guarded(&Path::new(folder).join(&self.template_language))?;
            let names = list_json_files(&dir)
                .await?
                .into_iter()
                .map(|name| name.strip_suffix(LOCALE_EXTENSION).unwrap_or(&name).to_string())
                .collect();
            structure.insert(folder.to_string(), names);
        }

        debug!("Read structure for {} folders", structure.len());
        Ok(structure)
    }

    /// List the language directories present under `folder`.
    ///
    /// Regular files directly under the folder are ignored.
    pub async fn list_languages(&self, folder: &str) -> LocaleResult<Vec<String>> {
        let folder = self.folders.sanitize(folder)?;
        let dir = self.guarded(Path::new(folder))?;

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| LocaleError::storage("read directory", &dir, e))?;

        let mut languages = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LocaleError::storage("read directory", &dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| LocaleError::storage("inspect", entry.path(), e))?;
            if file_type.is_dir() {
                languages.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        languages.sort();
        debug!("Found {} languages in {}", languages.len(), folder);
        Ok(languages)
    }

    pub async fn read_locale_file(
        &self,
        folder: &str,
        lang: &str,
        filename: &str,
    ) -> LocaleResult<Value> {
        let path = self.locale_path(folder, lang, filename)?;

        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LocaleError::FileNotFound(path));
            }
            Err(e) => return Err(LocaleError::storage("read", &path, e)),
        };

        // Bytes that are not UTF-8 surface as a parse error, same as bad JSON
        let document = serde_json::from_slice(&content).map_err(|source| LocaleError::Parse {
            path: path.clone(),
            source,
        })?;

        debug!("Read {}", path.display());
        Ok(document)
    }

    /// Replace the file's content with `document`, pretty-printed with two-space
    /// indentation. Missing directories are created.
    pub async fn write_locale_file(
        &self,
        folder: &str,
        lang: &str,
        filename: &str,
        document: &Value,
    ) -> LocaleResult<()> {
        let path = self.locale_path(folder, lang, filename)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LocaleError::storage("create directory", parent, e))?;
        }

        let content = serde_json::to_string_pretty(document).map_err(|e| {
            LocaleError::storage("serialize", &path, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        fs::write(&path, content)
            .await
            .map_err(|e| LocaleError::storage("write", &path, e))?;

        info!("Wrote {}", path.display());
        Ok(())
    }

    /// Bootstrap a language by copying the template language's `.json` files
    /// into every folder.
    ///
    /// Folders are processed in configured order and the call is not atomic:
    /// if the language already exists in a later folder the call fails with
    /// [`LocaleError::LanguageAlreadyExists`] and folders copied earlier in
    /// the same call are left in place.
    pub async fn create_language(&self, lang_code: &str) -> LocaleResult<String> {
        let lang = sanitize_language_code(lang_code)?;

        for folder in self.folders.iter() {
            let target = self.guarded(&Path::new(folder).join(&lang))?;

            let exists = fs::try_exists(&target)
                .await
                .map_err(|e| LocaleError::storage("inspect", &target, e))?;
            if exists {
                return Err(LocaleError::LanguageAlreadyExists(lang));
            }

            let source = self.guarded(&Path::new(folder).join(&self.template_language))?;
            let files = list_json_files(&source).await?;

            fs::create_dir_all(&target)
                .await
                .map_err(|e| LocaleError::storage("create directory", &target, e))?;

            for name in &files {
                let from = source.join(name);
                let to = target.join(name);
                fs::copy(&from, &to)
                    .await
                    .map_err(|e| LocaleError::storage("copy", &from, e))?;
            }

            info!("Created {}/{} with {} files", folder, lang, files.len());
        }

        info!("✓ Language '{}' created", lang);
        Ok(lang)
    }

    fn locale_path(&self, folder: &str, lang: &str, filename: &str) -> LocaleResult<PathBuf> {
        let folder = self.folders.sanitize(folder)?;
        let lang = sanitize_language_code(lang)?;
        let filename = require_filename(filename)?;

        let relative = Path::new(folder)
            .join(lang)
            .join(format!("{}{}", filename, LOCALE_EXTENSION));
        self.guarded(&relative)
    }

    fn guarded(&self, relative: &Path) -> LocaleResult<PathBuf> {
        path_guard::guard(&self.base_dir, relative)
    }
}

/// Names of the regular `.json` files in `dir`, sorted.
async fn list_json_files(dir: &Path) -> LocaleResult<Vec<String>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| LocaleError::storage("read directory", dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LocaleError::storage("read directory", dir, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(LOCALE_EXTENSION) {
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| LocaleError::storage("inspect", entry.path(), e))?;
        if file_type.is_file() {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    /// Create a locales tree with an `en` template in every default folder
    fn create_test_store() -> (LocaleStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path().join("locales");

        for folder in ["pecan", "admin", "web"] {
            let en = base.join(folder).join("en");
            std::fs::create_dir_all(&en).unwrap();
            std::fs::write(en.join("common.json"), r#"{"hello": "Hello"}"#).unwrap();
            std::fs::write(
                en.join("errors.json"),
                format!(r#"{{"folder": "{}"}}"#, folder),
            )
            .unwrap();
        }

        let store = LocaleStore::new(&base, FolderSet::default(), "en");
        (store, temp_dir)
    }

    // ==================== ReadStructure Tests ====================

    #[tokio::test]
    async fn test_read_structure_lists_template_files() {
        let (store, _temp_dir) = create_test_store();

        let structure = store.read_structure().await.expect("Should read structure");

        assert_eq!(structure.len(), 3);
        assert_eq!(structure["pecan"], vec!["common", "errors"]);
        assert_eq!(structure["web"], vec!["common", "errors"]);
    }

    #[tokio::test]
    async fn test_read_structure_skips_non_json_entries() {
        let (store, _temp_dir) = create_test_store();
        let en = store.base_dir().join("admin/en");
        std::fs::write(en.join("README.md"), "notes").unwrap();
        std::fs::create_dir_all(en.join("drafts.json")).unwrap();

        let structure = store.read_structure().await.unwrap();
        assert_eq!(structure["admin"], vec!["common", "errors"]);
    }

    #[tokio::test]
    async fn test_read_structure_strips_only_one_extension() {
        let (store, _temp_dir) = create_test_store();
        std::fs::write(store.base_dir().join("pecan/en/a.json.json"), "{}").unwrap();

        let structure = store.read_structure().await.unwrap();
        assert_eq!(structure["pecan"], vec!["a.json", "common", "errors"]);
    }

    #[tokio::test]
    async fn test_read_structure_fails_when_template_missing() {
        let (store, _temp_dir) = create_test_store();
        std::fs::remove_dir_all(store.base_dir().join("web/en")).unwrap();

        let err = store.read_structure().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageError);
    }

    // ==================== ListLanguages Tests ====================

    #[tokio::test]
    async fn test_list_languages_only_directories() {
        let (store, _temp_dir) = create_test_store();
        let pecan = store.base_dir().join("pecan");
        std::fs::create_dir_all(pecan.join("de")).unwrap();
        std::fs::write(pecan.join("stray.json"), "{}").unwrap();

        let languages = store.list_languages("pecan").await.unwrap();
        assert_eq!(languages, vec!["de", "en"]);
    }

    #[tokio::test]
    async fn test_list_languages_rejects_unknown_folder() {
        let (store, _temp_dir) = create_test_store();
        let err = store.list_languages("../etc").await.unwrap_err();
        assert!(matches!(err, LocaleError::InvalidFolder(_)));
    }

    #[tokio::test]
    async fn test_list_languages_missing_folder_is_storage_error() {
        let (store, _temp_dir) = create_test_store();
        std::fs::remove_dir_all(store.base_dir().join("admin")).unwrap();

        let err = store.list_languages("admin").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageError);
    }

    // ==================== ReadLocaleFile Tests ====================

    #[tokio::test]
    async fn test_read_locale_file() {
        let (store, _temp_dir) = create_test_store();
        let doc = store.read_locale_file("pecan", "en", "common").await.unwrap();
        assert_eq!(doc, json!({"hello": "Hello"}));
    }

    #[tokio::test]
    async fn test_read_normalizes_language_code() {
        let (store, _temp_dir) = create_test_store();
        let doc = store.read_locale_file("pecan", "EN ", "common").await.unwrap();
        assert_eq!(doc, json!({"hello": "Hello"}));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let (store, _temp_dir) = create_test_store();
        let err = store
            .read_locale_file("pecan", "en", "doesnotexist")
            .await
            .unwrap_err();
        assert!(matches!(err, LocaleError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_read_traversal_is_stripped_inside_base() {
        let (store, temp_dir) = create_test_store();
        std::fs::write(temp_dir.path().join("secret.json"), r#"{"leak": true}"#).unwrap();

        // "../../secret" becomes "secret", looked up under pecan/en
        let err = store
            .read_locale_file("pecan", "en", "../../secret")
            .await
            .unwrap_err();
        assert!(matches!(err, LocaleError::FileNotFound(ref p) if p.ends_with("pecan/en/secret.json")));
    }

    #[tokio::test]
    async fn test_read_invalid_json_is_parse_error() {
        let (store, _temp_dir) = create_test_store();
        std::fs::write(store.base_dir().join("pecan/en/broken.json"), "{not json").unwrap();

        let err = store.read_locale_file("pecan", "en", "broken").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[tokio::test]
    async fn test_read_non_utf8_is_parse_error() {
        let (store, _temp_dir) = create_test_store();
        std::fs::write(store.base_dir().join("pecan/en/binary.json"), [0xff, 0xfe, b'{']).unwrap();

        let err = store.read_locale_file("pecan", "en", "binary").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[tokio::test]
    async fn test_read_rejects_bad_inputs_before_io() {
        let (store, _temp_dir) = create_test_store();

        let err = store.read_locale_file("nope", "en", "common").await.unwrap_err();
        assert!(matches!(err, LocaleError::InvalidFolder(_)));

        let err = store.read_locale_file("pecan", "eng", "common").await.unwrap_err();
        assert!(matches!(err, LocaleError::InvalidLanguageCode(_)));

        let err = store.read_locale_file("pecan", "en", "***").await.unwrap_err();
        assert!(matches!(err, LocaleError::InvalidFilename(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_through_escaping_symlink_is_unauthorized() {
        let (store, temp_dir) = create_test_store();
        let outside = temp_dir.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        std::fs::write(outside.join("secret.json"), r#"{"leak": true}"#).unwrap();
        std::os::unix::fs::symlink(&outside, store.base_dir().join("pecan/xx")).unwrap();

        let err = store.read_locale_file("pecan", "xx", "secret").await.unwrap_err();
        assert!(matches!(err, LocaleError::PathOutsideBase));
        assert_eq!(err.kind(), ErrorKind::AuthorizationError);
    }

    // ==================== WriteLocaleFile Tests ====================

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let (store, _temp_dir) = create_test_store();
        let doc = json!({"title": "Welcome", "nested": {"a": "b", "list": [1, 2]}});

        store
            .write_locale_file("pecan", "en", "common", &doc)
            .await
            .expect("Should write");
        let read = store.read_locale_file("pecan", "en", "common").await.unwrap();

        assert_eq!(read, doc);
    }

    #[tokio::test]
    async fn test_write_uses_two_space_indentation() {
        let (store, _temp_dir) = create_test_store();
        store
            .write_locale_file("web", "en", "common", &json!({"a": {"b": "c"}}))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.base_dir().join("web/en/common.json")).unwrap();
        assert_eq!(raw, "{\n  \"a\": {\n    \"b\": \"c\"\n  }\n}");
    }

    #[tokio::test]
    async fn test_write_creates_missing_directories() {
        let (store, _temp_dir) = create_test_store();
        store
            .write_locale_file("admin", "fr", "new_file", &json!({"k": "v"}))
            .await
            .unwrap();

        assert!(store.base_dir().join("admin/fr/new_file.json").is_file());
    }

    #[tokio::test]
    async fn test_write_overwrites_in_full() {
        let (store, _temp_dir) = create_test_store();
        store
            .write_locale_file("pecan", "en", "common", &json!({"only": "this"}))
            .await
            .unwrap();

        let doc = store.read_locale_file("pecan", "en", "common").await.unwrap();
        assert_eq!(doc, json!({"only": "this"}));
    }

    #[tokio::test]
    async fn test_write_invalid_folder_touches_nothing() {
        let (store, temp_dir) = create_test_store();
        let err = store
            .write_locale_file("../evil", "en", "common", &json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(!temp_dir.path().join("evil").exists());
    }

    // ==================== CreateLanguage Tests ====================

    #[tokio::test]
    async fn test_create_language_copies_template() {
        let (store, _temp_dir) = create_test_store();

        let code = store.create_language("ES").await.expect("Should create");
        assert_eq!(code, "es");

        for folder in ["pecan", "admin", "web"] {
            let en = store.base_dir().join(folder).join("en");
            let es = store.base_dir().join(folder).join("es");
            for name in ["common.json", "errors.json"] {
                let original = std::fs::read(en.join(name)).unwrap();
                let copy = std::fs::read(es.join(name)).unwrap();
                assert_eq!(original, copy, "{}/{} should be copied verbatim", folder, name);
            }
        }
    }

    #[tokio::test]
    async fn test_create_language_skips_non_json() {
        let (store, _temp_dir) = create_test_store();
        std::fs::write(store.base_dir().join("pecan/en/notes.txt"), "x").unwrap();

        store.create_language("de").await.unwrap();
        assert!(!store.base_dir().join("pecan/de/notes.txt").exists());
        assert!(store.base_dir().join("pecan/de/common.json").exists());
    }

    #[tokio::test]
    async fn test_create_language_twice_conflicts_and_keeps_content() {
        let (store, _temp_dir) = create_test_store();
        store.create_language("es").await.unwrap();

        let edited = store.base_dir().join("pecan/es/common.json");
        std::fs::write(&edited, r#"{"hello": "Hola"}"#).unwrap();

        let err = store.create_language("es").await.unwrap_err();
        assert!(matches!(err, LocaleError::LanguageAlreadyExists(ref code) if code == "es"));
        assert_eq!(std::fs::read_to_string(&edited).unwrap(), r#"{"hello": "Hola"}"#);
    }

    #[tokio::test]
    async fn test_create_language_is_not_atomic() {
        let (store, _temp_dir) = create_test_store();
        std::fs::create_dir_all(store.base_dir().join("admin/it")).unwrap();

        let err = store.create_language("it").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // pecan is processed before admin and keeps its copy
        assert!(store.base_dir().join("pecan/it/common.json").exists());
        assert!(!store.base_dir().join("web/it").exists());
    }

    #[tokio::test]
    async fn test_create_language_rejects_bad_code() {
        let (store, _temp_dir) = create_test_store();
        let err = store.create_language("eng").await.unwrap_err();
        assert!(matches!(err, LocaleError::InvalidLanguageCode(_)));
    }
}
