//! Publications generator.
//!
//! Ties loading, formatting and page output together for one site build:
//! databases are loaded once when the generator is created, then the
//! context and the page are produced from them.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::Settings;
use crate::database::{load_databases, Database, LoadSummary};
use crate::output::{
    cited_publications, render_bibliography, render_citations, render_publications_page,
    PageOptions,
};
use crate::processor::{generate_context, Publication};

/// Context key holding the publication list.
pub const PUBLICATIONS_KEY: &str = "publications";

/// The template context: a JSON object.
pub type Context = Map<String, Value>;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize context: {0}")]
    Json(#[from] serde_json::Error),
}

/// A page with its inline citations rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct CitedPage {
    pub content: String,
    /// Reference list of the cited entries, empty when nothing resolved
    pub bibliography: String,
}

pub struct PublicationGenerator {
    settings: Settings,
    databases: Vec<Database>,
    summary: LoadSummary,
}

impl PublicationGenerator {
    /// Loads every configured source.
    pub fn new(settings: Settings) -> Self {
        let (databases, summary) = load_databases(&settings.sources, &settings.search_dirs());
        Self {
            settings,
            databases,
            summary,
        }
    }

    pub fn summary(&self) -> LoadSummary {
        self.summary
    }

    pub fn databases(&self) -> &[Database] {
        &self.databases
    }

    /// Formats all loaded entries.
    pub fn publications(&self) -> Vec<Publication> {
        generate_context(
            &self.databases,
            &self.settings.style,
            &self.settings.extra_fields,
            &self.settings.highlight,
        )
    }

    /// Builds the template context with the publication list under
    /// [`PUBLICATIONS_KEY`].
    pub fn generate_context(&self) -> Result<Context, OutputError> {
        let mut context = Context::new();
        context.insert(
            PUBLICATIONS_KEY.to_string(),
            serde_json::to_value(self.publications())?,
        );
        Ok(context)
    }

    /// Writes the publications page below `output_dir`.
    ///
    /// Returns the written path, or `None` when there was nothing to publish.
    pub fn generate_output(&self, output_dir: &Path) -> Result<Option<PathBuf>, OutputError> {
        let save_as = &self.settings.output.save_as;
        if self.databases.is_empty() {
            tracing::info!("Not generating `{}` (no entries)", save_as);
            return Ok(None);
        }

        let page = render_publications_page(
            &self.publications(),
            PageOptions {
                title: &self.settings.output.title,
                intro: &self.settings.output.intro,
            },
        );

        let path = output_dir.join(save_as);
        let write = |path: &Path| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &page)
        };
        write(&path).map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Wrote `{}`", path.display());
        Ok(Some(path))
    }

    /// Renders the inline citations of a page against the loaded entries.
    pub fn cite(&self, text: &str) -> CitedPage {
        let publications = self.publications();
        let url = &self.settings.output.url;
        let cited = cited_publications(text, &publications);
        CitedPage {
            content: render_citations(text, &publications, url),
            bibliography: if cited.is_empty() {
                String::new()
            } else {
                render_bibliography(&cited).into_string()
            },
        }
    }
}
