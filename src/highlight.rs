//! BibTeX source rendering.
//!
//! Serializes an entry back to BibTeX and highlights it as HTML with
//! `syntect`. Spans carry the scope names of the BibTeX syntax as classes
//! (`meta`, `keyword`, `string`, ...), inside a Pygments-style
//! `div.highlight > pre` wrapper.

use std::sync::LazyLock;

use biblatex::Entry;
use serde::{Deserialize, Serialize};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::format::escape;

/// Options of the highlighted `<pre>` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightOptions {
    /// Class of the wrapping `div`.
    pub cssclass: String,
    /// Emit bare token spans without the `div`/`pre` wrapper.
    pub nowrap: bool,
    /// Prefix every line with its number.
    pub linenos: bool,
    /// Inline CSS for the `pre` element.
    pub prestyles: String,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            cssclass: "highlight".to_string(),
            nowrap: false,
            linenos: false,
            prestyles: String::new(),
        }
    }
}

/// Serializes `entry` as a one-entry BibTeX database.
pub fn format_bibtex(entry: &Entry) -> String {
    let mut source = match entry.to_bibtex_string() {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(
                "entry `{}` cannot be written as BibTeX ({}), using BibLaTeX",
                entry.key,
                e
            );
            entry.to_biblatex_string()
        }
    };
    if !source.ends_with('\n') {
        source.push('\n');
    }
    source
}

/// Serializes and highlights `entry`.
pub fn format_bibtex_html(entry: &Entry, options: &HighlightOptions) -> String {
    highlight_bibtex(&format_bibtex(entry), options)
}

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Classed spans for `source`; plain escaped text when parsing fails.
fn classed_html(source: &str) -> String {
    let syntax = SYNTAXES
        .find_syntax_by_extension("bib")
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
    for line in LinesWithEndings::from(source) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::warn!("cannot highlight BibTeX source ({}), emitting plain text", e);
            return escape(source);
        }
    }
    generator.finalize()
}

fn number_lines(body: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    let count = match lines.last() {
        Some(last) if last.is_empty() => lines.len() - 1,
        _ => lines.len(),
    };
    let width = count.to_string().len();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i < count {
                format!("<span class=\"linenos\">{:>width$}</span>{line}", i + 1)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Highlights BibTeX source as HTML.
pub fn highlight_bibtex(source: &str, options: &HighlightOptions) -> String {
    let mut body = classed_html(source);
    if options.linenos {
        body = number_lines(&body);
    }
    if options.nowrap {
        return body;
    }

    let pre = if options.prestyles.is_empty() {
        "<pre>".to_string()
    } else {
        format!("<pre style=\"{}\">", escape(&options.prestyles))
    };
    format!(
        "<div class=\"{}\">{pre}<span></span>{body}</pre></div>\n",
        escape(&options.cssclass)
    )
}
