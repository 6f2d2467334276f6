//! bibsite: publication lists and inline citations for static sites.
//!
//! This library provides functionality to:
//! - Load BibTeX databases from a list of search directories
//! - Label and format entries in the `plain`, `alpha`, `unsrt` and
//!   `unsrtalpha` styles
//! - Render each entry as HTML text and as highlighted BibTeX source
//! - Replace `[@key]` citations in page text with links to the entries
//! - Write a publications page for a site build

pub mod config;
pub mod database;
mod format;
pub mod generator;
pub mod highlight;
pub mod markdown;
pub mod output;
pub mod processor;
pub mod style;

pub use config::{load_settings, Settings};
pub use database::{load_databases, resolve, Database, LoadSummary};
pub use generator::{CitedPage, Context, PublicationGenerator, PUBLICATIONS_KEY};
pub use highlight::{format_bibtex, format_bibtex_html, highlight_bibtex, HighlightOptions};
pub use markdown::{
    extract_citation_clusters, extract_citations, Citation, CitationCluster, CitationItem,
};
pub use output::{cited_publications, render_citations, render_publications_page};
pub use processor::{generate_context, Publication};
pub use style::{style_names, Style};
