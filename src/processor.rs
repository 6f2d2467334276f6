//! Publication list construction.
//!
//! Flattens every loaded database into one sequence, labels it as a whole,
//! and produces one [`Publication`] per entry in declaration order.

use biblatex::Entry;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::database::Database;
use crate::format::{field, year};
use crate::highlight::{format_bibtex_html, HighlightOptions};
use crate::style::{Rendered, Style};

/// One formatted entry, ready for a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    /// The BibTeX key
    pub key: String,
    /// The label assigned by the style (e.g. "1" or "Knu84")
    pub label: String,
    /// The year of the entry, if any
    pub year: Option<String>,
    /// HTML rendering of the entry text
    pub html: String,
    /// Highlighted BibTeX source of the entry
    pub bibtex: String,
    /// Requested extra fields present on the entry, in requested order
    pub extra: Vec<(String, String)>,
}

impl Publication {
    /// Looks up an extra field by name.
    pub fn extra_field(&self, name: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Keys always present in a serialized publication.
const FIXED_KEYS: [&str; 5] = ["key", "label", "year", "html", "bibtex"];

// Extra fields are flattened next to the fixed keys, so templates can use
// `publication.url` directly. An extra field never shadows a fixed key.
impl Serialize for Publication {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra: Vec<&(String, String)> = self
            .extra
            .iter()
            .filter(|(name, _)| !FIXED_KEYS.contains(&name.as_str()))
            .collect();
        let mut map = serializer.serialize_map(Some(FIXED_KEYS.len() + extra.len()))?;
        for (name, value) in extra {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("key", &self.key)?;
        map.serialize_entry("label", &self.label)?;
        map.serialize_entry("year", &self.year)?;
        map.serialize_entry("html", &self.html)?;
        map.serialize_entry("bibtex", &self.bibtex)?;
        map.end()
    }
}

/// Formats every entry of `databases`.
///
/// # Arguments
///
/// * `databases` - Loaded databases, in configured order
/// * `style_name` - One of the supported style names; unknown names fall back
///   to `plain` with an error log
/// * `extra_fields` - Entry fields to copy verbatim into each record
/// * `options` - Options of the highlighted BibTeX block
///
/// # Returns
///
/// One publication per entry, in declaration order across all databases.
pub fn generate_context(
    databases: &[Database],
    style_name: &str,
    extra_fields: &[String],
    options: &HighlightOptions,
) -> Vec<Publication> {
    let style = Style::resolve(style_name);

    // Labels are assigned over all files at once so numbering is global.
    let entries: Vec<&Entry> = databases.iter().flat_map(Database::entries).collect();
    let rendered = style.render(&entries);

    entries
        .iter()
        .zip(rendered)
        .map(|(entry, Rendered { label, html })| Publication {
            key: entry.key.clone(),
            label,
            year: year(entry),
            html,
            bibtex: format_bibtex_html(entry, options),
            extra: extra_fields
                .iter()
                .filter_map(|name| field(entry, name).map(|value| (name.clone(), value)))
                .collect(),
        })
        .collect()
}
