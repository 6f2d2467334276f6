//! Output generation.
//!
//! Replaces inline citations with links into the publications page and
//! renders that page itself.

use std::collections::HashSet;

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::format::escape;
use crate::markdown::{extract_citation_clusters, CitationCluster, CitationItem};
use crate::processor::Publication;

/// Anchor id of a publication on the publications page.
pub fn anchor(key: &str) -> String {
    format!("bib-{key}")
}

fn render_item(item: &CitationItem, publications: &[Publication], page_url: &str) -> String {
    let Some(publication) = publications.iter().find(|p| p.key == item.key) else {
        tracing::error!("cannot resolve citation `{}`", item.key);
        return format!(
            "<span class=\"bib-missing\">[?{}]</span>",
            escape(&item.key)
        );
    };

    let href = item
        .url
        .clone()
        .unwrap_or_else(|| format!("{page_url}#{}", anchor(&publication.key)));
    let mut text = escape(&publication.label);
    if let Some(locator) = &item.locator {
        let prefix = match item.label.as_deref() {
            Some("page") if locator.contains('-') => "pp. ",
            Some("page") => "p. ",
            Some("chapter") => "ch. ",
            Some("section") => "sec. ",
            _ => "",
        };
        text.push_str(&format!(", {prefix}{}", escape(locator)));
    }
    format!("<a href=\"{}\">{text}</a>", escape(&href))
}

fn render_cluster(cluster: &CitationCluster, publications: &[Publication], page_url: &str) -> String {
    let (resolved, missing): (Vec<&CitationItem>, Vec<&CitationItem>) = cluster
        .items
        .iter()
        .partition(|item| publications.iter().any(|p| p.key == item.key));

    let mut parts: Vec<String> = Vec::new();
    if !resolved.is_empty() {
        let links: Vec<String> = resolved
            .iter()
            .map(|item| render_item(item, publications, page_url))
            .collect();
        parts.push(format!("[{}]", links.join(", ")));
    }
    parts.extend(
        missing
            .iter()
            .map(|item| render_item(item, publications, page_url)),
    );
    parts.join(" ")
}

/// Replaces every citation cluster in `text` with links to `page_url`.
///
/// Resolved keys render as `[label]` links to the entry anchor. Unresolved
/// keys are logged and rendered as a `[?key]` placeholder.
///
/// # Implementation Note
///
/// Replacements run from the end of the text towards the beginning so that
/// earlier spans stay valid.
pub fn render_citations(text: &str, publications: &[Publication], page_url: &str) -> String {
    let mut clusters = extract_citation_clusters(text);
    clusters.sort_by(|a, b| b.span.0.cmp(&a.span.0));

    let mut result = text.to_string();
    for cluster in &clusters {
        let (start, end) = cluster.span;
        result.replace_range(start..end, &render_cluster(cluster, publications, page_url));
    }
    result
}

/// Publications cited in `text`, in order of first citation.
pub fn cited_publications<'a>(text: &str, publications: &'a [Publication]) -> Vec<&'a Publication> {
    let mut seen = HashSet::new();
    extract_citation_clusters(text)
        .into_iter()
        .flat_map(|cluster| cluster.items)
        .filter(|item| seen.insert(item.key.clone()))
        .filter_map(|item| publications.iter().find(|p| p.key == item.key))
        .collect()
}

/// Options of the publications page.
#[derive(Debug, Clone, Copy)]
pub struct PageOptions<'a> {
    pub title: &'a str,
    /// Raw HTML placed before the list
    pub intro: &'a str,
}

fn publication_details(publication: &Publication) -> Markup {
    html! {
        details id=(anchor(&publication.key)) {
            summary {
                span.label { "[" (publication.label) "]" }
                " "
                span.entry { (PreEscaped(&publication.html)) }
            }
            ul.extra {
                @for (name, value) in &publication.extra {
                    li { (name) ": " (value) }
                }
            }
            (PreEscaped(&publication.bibtex))
        }
    }
}

/// Renders a reference list, as used at the bottom of a page.
pub fn render_bibliography(publications: &[&Publication]) -> Markup {
    html! {
        div #bibliography {
            @for publication in publications {
                (publication_details(publication))
            }
        }
    }
}

/// Renders the full publications page.
pub fn render_publications_page(publications: &[Publication], options: PageOptions<'_>) -> String {
    let all: Vec<&Publication> = publications.iter().collect();
    let page = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (options.title) }
            }
            body {
                h1 { (options.title) }
                @if !options.intro.is_empty() {
                    (PreEscaped(options.intro))
                }
                (render_bibliography(&all))
            }
        }
    };
    page.into_string()
}
