//! Citation styles.
//!
//! A style decides two things: the label printed in front of each entry and
//! the text of the entry itself. Both are produced by `hayagriva` from its
//! archived CSL styles: the numeric styles render with `ieee`, the
//! alphabetic ones with `alphanumeric`. Entries are never re-sorted, so the
//! `unsrt` variants only exist to accept the names users already know.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use biblatex::{Bibliography, Entry};
use hayagriva::archive::{locales, ArchivedStyle};
use hayagriva::citationberg::{IndependentStyle, Locale, Style as CslStyle};
use hayagriva::{
    BibliographyDriver, BibliographyRequest, BufWriteFormat, CitationItem, CitationRequest,
    ElemChildren,
};
use thiserror::Error;

use crate::format::{escape, field};

static LOCALES: LazyLock<Vec<Locale>> = LazyLock::new(locales);

#[derive(Error, Debug, PartialEq)]
#[error("Unsupported formatting style `{0}`")]
pub struct UnknownStyle(pub String);

/// A supported citation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Plain,
    Alpha,
    Unsrt,
    UnsrtAlpha,
}

/// Single source of truth for style names.
const STYLE_NAMES: &[(&str, Style)] = &[
    ("plain", Style::Plain),
    ("alpha", Style::Alpha),
    ("unsrt", Style::Unsrt),
    ("unsrtalpha", Style::UnsrtAlpha),
];

/// Returns the list of supported style names.
pub fn style_names() -> Vec<&'static str> {
    STYLE_NAMES.iter().map(|(n, _)| *n).collect()
}

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        STYLE_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, style)| *style)
            .ok_or_else(|| UnknownStyle(name.to_string()))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = STYLE_NAMES
            .iter()
            .find(|(_, s)| s == self)
            .map(|(n, _)| *n)
            .unwrap_or("plain");
        f.write_str(name)
    }
}

impl Style {
    /// Parses `name`, substituting the default style for unknown names.
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_else(|e: UnknownStyle| {
            let fallback = Style::default();
            tracing::error!("{}, defaulting to `{}`", e, fallback);
            fallback
        })
    }

    fn alphabetic(self) -> bool {
        matches!(self, Style::Alpha | Style::UnsrtAlpha)
    }

    /// Name of the archived CSL style doing the rendering.
    fn csl_name(self) -> &'static str {
        if self.alphabetic() {
            "alphanumeric"
        } else {
            "ieee"
        }
    }

    fn csl(self) -> Option<IndependentStyle> {
        match ArchivedStyle::by_name(self.csl_name())?.get() {
            CslStyle::Independent(style) => Some(style),
            CslStyle::Dependent(_) => None,
        }
    }

    /// Labels and renders every entry, in order.
    ///
    /// Labels depend on the whole sequence: numeric labels count through it,
    /// and colliding alphabetic labels get `a`, `b`, ... suffixes.
    pub fn render(self, entries: &[&Entry]) -> Vec<Rendered> {
        let converted: Vec<Option<hayagriva::Entry>> =
            entries.iter().map(|entry| to_hayagriva(entry)).collect();

        let mut citations: HashMap<String, String> = HashMap::new();
        let mut texts: HashMap<String, String> = HashMap::new();
        match self.csl() {
            Some(csl) => {
                let mut driver = BibliographyDriver::new();
                let cited: Vec<&hayagriva::Entry> = converted.iter().flatten().collect();
                for entry in &cited {
                    driver.citation(CitationRequest::from_items(
                        vec![CitationItem::with_entry(*entry)],
                        &csl,
                        LOCALES.as_slice(),
                    ));
                }
                let rendered = driver.finish(BibliographyRequest {
                    style: &csl,
                    locale: None,
                    locale_files: LOCALES.as_slice(),
                });

                for (entry, citation) in cited.iter().zip(&rendered.citations) {
                    citations.insert(
                        entry.key().to_string(),
                        write(&citation.citation, BufWriteFormat::Plain),
                    );
                }
                for item in rendered.bibliography.into_iter().flat_map(|b| b.items) {
                    texts.insert(item.key.clone(), write(&item.content, BufWriteFormat::Html));
                }
            }
            None => tracing::error!("citation style `{}` is not available", self.csl_name()),
        }

        let labels: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                if !self.alphabetic() {
                    return (i + 1).to_string();
                }
                citations
                    .get(entry.key.as_str())
                    .map(|c| c.trim().trim_start_matches('[').trim_end_matches(']').to_string())
                    .filter(|label| !label.is_empty())
                    .unwrap_or_else(|| entry.key.chars().take(3).collect())
            })
            .collect();

        entries
            .iter()
            .zip(disambiguate(labels))
            .map(|(entry, label)| Rendered {
                label,
                html: texts
                    .remove(entry.key.as_str())
                    .filter(|html| !html.trim().is_empty())
                    .unwrap_or_else(|| plain_text(entry)),
            })
            .collect()
    }
}

/// Label and entry text of one rendered entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub label: String,
    pub html: String,
}

fn write(children: &ElemChildren, format: BufWriteFormat) -> String {
    let mut buf = String::new();
    if let Err(e) = children.write_buf(&mut buf, format) {
        tracing::warn!("cannot write rendered citation: {}", e);
    }
    buf
}

/// Converts one entry through a single-entry bibliography.
fn to_hayagriva(entry: &Entry) -> Option<hayagriva::Entry> {
    let mut single = Bibliography::new();
    single.insert(entry.clone());
    match hayagriva::io::from_biblatex(&single) {
        Ok(library) => library.iter().next().cloned(),
        Err(errors) => {
            for e in errors {
                tracing::warn!("entry `{}` cannot be formatted: {}", entry.key, e);
            }
            None
        }
    }
}

/// Entry text used when the style engine gives nothing back.
fn plain_text(entry: &Entry) -> String {
    let title = field(entry, "title").unwrap_or_else(|| entry.key.clone());
    format!("{}.", escape(title.trim_end_matches('.')))
}

/// Letters for the `n`th collision: `a` ... `z`, `aa`, `ab`, ...
fn suffix(mut n: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'a' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Makes labels unique by suffixing every label that occurs more than once.
fn disambiguate(labels: Vec<String>) -> Vec<String> {
    let mut totals: HashMap<String, usize> = HashMap::new();
    for label in &labels {
        *totals.entry(label.clone()).or_default() += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    labels
        .into_iter()
        .map(|label| {
            if totals[&label] == 1 {
                return label;
            }
            let n = seen.entry(label.clone()).or_default();
            let suffixed = format!("{label}{}", suffix(*n));
            *n += 1;
            suffixed
        })
        .collect()
}
