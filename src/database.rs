//! BibTeX database loading.
//!
//! Resolves database identifiers against a list of search directories and
//! parses every file that can be found. Missing or broken files are logged
//! and skipped so a single bad source never aborts a site build.

use std::fs;
use std::path::{Path, PathBuf};

use biblatex::{Bibliography, Entry};
use thiserror::Error;

/// Errors that can occur when loading a single database file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid BibTeX: {0}")]
    ParseError(String),
}

/// A parsed BibTeX file.
#[derive(Debug, Clone)]
pub struct Database {
    /// Where the database was loaded from
    pub path: PathBuf,
    bibliography: Bibliography,
}

impl Database {
    /// Parses a database from BibTeX source text.
    pub fn parse(path: impl Into<PathBuf>, src: &str) -> Result<Self, LoadError> {
        let bibliography =
            Bibliography::parse(src).map_err(|e| LoadError::ParseError(e.to_string()))?;
        Ok(Self {
            path: path.into(),
            bibliography,
        })
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.bibliography.iter()
    }

    pub fn len(&self) -> usize {
        self.bibliography.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counts reported by the summary log line of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub sources: usize,
    pub entries: usize,
}

impl LoadSummary {
    pub fn of(databases: &[Database]) -> Self {
        Self {
            sources: databases.len(),
            entries: databases.iter().map(Database::len).sum(),
        }
    }

    /// The human-readable summary line.
    pub fn message(&self) -> String {
        if self.sources == 0 {
            "bibtex plugin detected no entries.".to_string()
        } else {
            format!(
                "bibtex plugin detected {} entries spread across {} source file(s).",
                self.entries, self.sources
            )
        }
    }
}

/// Finds `name` in `paths`, returning the first existing match.
///
/// Absolute names are returned unchanged. When no search directory contains
/// the file, `name` itself is returned so the caller can report it.
pub fn resolve(name: &Path, paths: &[PathBuf]) -> PathBuf {
    if name.is_absolute() {
        return name.to_path_buf();
    }

    paths
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| name.to_path_buf())
}

/// Loads a single database file.
pub fn load_database(path: &Path) -> Result<Database, LoadError> {
    let content = fs::read_to_string(path)?;
    Database::parse(path, &content)
}

/// Loads every database in `names`, skipping the ones that fail.
///
/// Logs one error per skipped file and exactly one INFO summary line.
pub fn load_databases(names: &[String], paths: &[PathBuf]) -> (Vec<Database>, LoadSummary) {
    let mut databases = Vec::new();

    for name in names {
        let path = resolve(Path::new(name), paths);

        if !path.exists() {
            let search = paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(":");
            tracing::error!(
                "bibtex file `{}` cannot be found on path `{}`",
                path.display(),
                search
            );
            continue;
        }

        match load_database(&path) {
            Ok(database) => {
                tracing::debug!(entries = database.len(), "Loaded bibtex file `{}`", path.display());
                databases.push(database);
            }
            Err(e) => {
                tracing::error!("bibtex plugin failed to parse file `{}`: {}", name, e);
            }
        }
    }

    let summary = LoadSummary::of(&databases);
    tracing::info!("{}", summary.message());
    (databases, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const TWO_ENTRIES: &str = r#"
@article{first,
    author = {Jane Doe},
    title = {First Article},
    journal = {Journal of Tests},
    year = {2020},
}

@book{second,
    author = {John Smith},
    title = {Second Book},
    publisher = {Test Press},
    year = {2021},
}
"#;

    // Helper to create a temporary file with content
    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".bib").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    // --- Tests for resolve ---

    #[test]
    fn test_resolve_absolute_path_is_returned_as_is() {
        // Given: an absolute path that does not exist anywhere
        let name = Path::new("/definitely/not/here.bib");

        // When: we resolve it against some search path
        let resolved = resolve(name, &[PathBuf::from("/tmp")]);

        // Then: the path is untouched
        assert_eq!(resolved, PathBuf::from("/definitely/not/here.bib"));
    }

    #[test]
    fn test_resolve_uses_first_matching_directory() {
        // Given: two search directories, both containing the file
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("refs.bib"), "").unwrap();
        fs::write(second.path().join("refs.bib"), "").unwrap();
        let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        // When: we resolve a relative name
        let resolved = resolve(Path::new("refs.bib"), &paths);

        // Then: the first directory wins
        assert_eq!(resolved, first.path().join("refs.bib"));
    }

    #[test]
    fn test_resolve_skips_directories_without_match() {
        let empty = TempDir::new().unwrap();
        let full = TempDir::new().unwrap();
        fs::write(full.path().join("refs.bib"), "").unwrap();
        let paths = vec![empty.path().to_path_buf(), full.path().to_path_buf()];

        let resolved = resolve(Path::new("refs.bib"), &paths);

        assert_eq!(resolved, full.path().join("refs.bib"));
    }

    #[test]
    fn test_resolve_unmatched_falls_back_to_name() {
        // Given: a search directory without the file
        let dir = TempDir::new().unwrap();

        // When: we resolve the name
        let resolved = resolve(Path::new("missing.bib"), &[dir.path().to_path_buf()]);

        // Then: the bare name comes back
        assert_eq!(resolved, PathBuf::from("missing.bib"));
    }

    // --- Tests for load_database ---

    #[test]
    fn test_load_database_keeps_declaration_order() {
        // Given: a file with two entries
        let file = create_temp_file(TWO_ENTRIES);

        // When: we load it
        let database = load_database(file.path()).unwrap();

        // Then: both entries are present in file order
        let keys: Vec<&str> = database.entries().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["first", "second"]);
        assert_eq!(database.path, file.path());
    }

    #[test]
    fn test_load_database_file_not_found() {
        let result = load_database(Path::new("/nonexistent/path/refs.bib"));

        assert!(matches!(result.unwrap_err(), LoadError::IoError(_)));
    }

    #[test]
    fn test_load_database_invalid_bibtex() {
        // Given: a file with an unterminated entry
        let file = create_temp_file("@article{broken, title = {Unclosed");

        // When: we load it
        let result = load_database(file.path());

        // Then: we get a parse error
        assert!(matches!(result.unwrap_err(), LoadError::ParseError(_)));
    }

    #[test]
    fn test_load_database_empty_file() {
        let file = create_temp_file("");

        let database = load_database(file.path()).unwrap();

        assert!(database.is_empty());
    }

    // --- Tests for load_databases ---

    #[test]
    fn test_load_databases_skips_missing_files() {
        // Given: one existing and one missing source
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.bib"), TWO_ENTRIES).unwrap();
        let names = vec!["good.bib".to_string(), "missing.bib".to_string()];

        // When: we load both
        let (databases, summary) = load_databases(&names, &[dir.path().to_path_buf()]);

        // Then: only the existing file is loaded
        assert_eq!(databases.len(), 1);
        assert_eq!(summary, LoadSummary { sources: 1, entries: 2 });
    }

    #[test]
    fn test_load_databases_skips_unparsable_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.bib"), TWO_ENTRIES).unwrap();
        fs::write(dir.path().join("bad.bib"), "@book{oops, title = {").unwrap();
        let names = vec!["bad.bib".to_string(), "good.bib".to_string()];

        let (databases, summary) = load_databases(&names, &[dir.path().to_path_buf()]);

        assert_eq!(databases.len(), 1);
        assert_eq!(databases[0].path, dir.path().join("good.bib"));
        assert_eq!(summary.entries, 2);
    }

    #[test]
    fn test_load_databases_nothing_configured() {
        let (databases, summary) = load_databases(&[], &[]);

        assert!(databases.is_empty());
        assert_eq!(summary, LoadSummary::default());
    }

    // --- Tests for LoadSummary ---

    #[test]
    fn test_summary_message_no_entries() {
        assert_eq!(
            LoadSummary::default().message(),
            "bibtex plugin detected no entries."
        );
    }

    #[test]
    fn test_summary_message_counts() {
        let summary = LoadSummary {
            sources: 1,
            entries: 13,
        };

        assert_eq!(
            summary.message(),
            "bibtex plugin detected 13 entries spread across 1 source file(s)."
        );
    }
}
