//! Site configuration.
//!
//! Settings are read from a `bibsite.toml` file. Every key is optional:
//!
//! ```toml
//! content_path = "content"     # first search directory, relative to this file
//! search_paths = []            # further search directories
//! sources = ["publications.bib"]
//! style = "plain"              # plain | alpha | unsrt | unsrtalpha
//! extra_fields = ["url", "pdf", "slides", "poster"]
//!
//! [output]
//! save_as = "publications.html"
//! url = "publications.html"
//! title = "Publications"
//! intro = ""                   # raw HTML shown before the list
//!
//! [highlight]
//! cssclass = "highlight"
//! nowrap = false
//! linenos = false
//! prestyles = ""
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highlight::HighlightOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory searched first for relative sources.
    pub content_path: PathBuf,
    /// Further directories searched for relative sources.
    pub search_paths: Vec<PathBuf>,
    /// BibTeX files to load, in order.
    pub sources: Vec<String>,
    /// Citation style name.
    pub style: String,
    /// Entry fields copied verbatim into each publication.
    pub extra_fields: Vec<String>,
    pub output: OutputSettings,
    pub highlight: HighlightOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            content_path: PathBuf::from("content"),
            search_paths: Vec::new(),
            sources: Vec::new(),
            style: "plain".to_string(),
            extra_fields: Vec::new(),
            output: OutputSettings::default(),
            highlight: HighlightOptions::default(),
        }
    }
}

/// Where and how the publications page is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Path of the page relative to the output directory.
    pub save_as: String,
    /// URL the page is published at; inline citations link here.
    pub url: String,
    pub title: String,
    pub intro: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            save_as: "publications.html".to_string(),
            url: "publications.html".to_string(),
            title: "Publications".to_string(),
            intro: String::new(),
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Search directories for relative sources, in probing order.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        std::iter::once(self.content_path.clone())
            .chain(self.search_paths.iter().cloned())
            .collect()
    }

    /// Makes relative directories relative to `base`.
    fn anchor_paths(&mut self, base: &Path) {
        if self.content_path.is_relative() {
            self.content_path = base.join(&self.content_path);
        }
        for path in &mut self.search_paths {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Loads settings from `path`; directories are resolved against its parent.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut settings = Settings::from_toml(&content)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    settings.anchor_paths(base);
    Ok(settings)
}
