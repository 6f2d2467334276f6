//! Field access helpers shared by the renderers.

use biblatex::{ChunksExt, Entry};
use maud::html;

/// Returns the verbatim value of `name`, or `None` when absent or blank.
pub(crate) fn field(entry: &Entry, name: &str) -> Option<String> {
    let value = entry.get(name)?.format_verbatim();
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// The year of an entry: the `year` field, or the leading year of `date`.
pub(crate) fn year(entry: &Entry) -> Option<String> {
    field(entry, "year").or_else(|| {
        let date = field(entry, "date")?;
        let year: String = date.chars().take_while(|c| c.is_ascii_digit()).collect();
        if year.is_empty() {
            None
        } else {
            Some(year)
        }
    })
}

/// HTML-escapes plain text.
pub(crate) fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}
