//! Inline citation parser.
//!
//! Finds citations written as `[@key]`, `[@key, p. 42]` or `[@key](url)` in
//! page text, plus grouped citations `[@a; @b, ch. 2]`. Citations separated
//! only by blanks are merged into a single cluster so they render as one
//! bracket.

use regex::Regex;

/// A single cited key inside a cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationItem {
    /// The BibTeX key
    pub key: String,
    /// Locator value (e.g. "42")
    pub locator: Option<String>,
    /// Locator kind (e.g. "page", "chapter")
    pub label: Option<String>,
    /// Explicit link target given as `[@key](url)`
    pub url: Option<String>,
}

/// One or more citation items rendered together.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationCluster {
    pub items: Vec<CitationItem>,
    /// Byte range of the whole cluster in the source text
    pub span: (usize, usize),
}

/// A citation as written in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Citation {
    pub item: CitationItem,
    /// Byte range of the citation in the source text
    pub span: (usize, usize),
}

/// Extracts every single-key citation from `text`, in order.
///
/// # Examples
///
/// ```
/// use bibsite::extract_citations;
///
/// let citations = extract_citations("See [@knuth84, p. 3] for details.");
/// assert_eq!(citations.len(), 1);
/// assert_eq!(citations[0].item.key, "knuth84");
/// assert_eq!(citations[0].item.locator.as_deref(), Some("3"));
/// ```
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let re = Regex::new(r"\[@([^\]\[,;\s]+)(?:,\s*([^\]]+))?\](?:\(([^)\s]+)\))?").unwrap();

    re.captures_iter(text)
        .map(|cap| {
            let whole = cap.get(0).unwrap();
            let (locator, label) = cap
                .get(2)
                .map(|m| parse_locator(m.as_str()))
                .unwrap_or((None, None));
            Citation {
                item: CitationItem {
                    key: cap[1].to_string(),
                    locator,
                    label,
                    url: cap.get(3).map(|m| m.as_str().to_string()),
                },
                span: (whole.start(), whole.end()),
            }
        })
        .collect()
}

/// Extracts `[@a; @b]` groups.
fn extract_grouped(text: &str) -> Vec<CitationCluster> {
    let re = Regex::new(r"\[(@[^\]]*;[^\]]*)\]").unwrap();

    re.captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0).unwrap();
            let items: Vec<CitationItem> = cap[1]
                .split(';')
                .filter_map(|part| {
                    let part = part.trim().strip_prefix('@')?;
                    let (key, locator_text) = match part.split_once(',') {
                        Some((key, rest)) => (key.trim(), Some(rest)),
                        None => (part.trim(), None),
                    };
                    if key.is_empty() {
                        return None;
                    }
                    let (locator, label) = locator_text.map(parse_locator).unwrap_or((None, None));
                    Some(CitationItem {
                        key: key.to_string(),
                        locator,
                        label,
                        url: None,
                    })
                })
                .collect();

            (!items.is_empty()).then(|| CitationCluster {
                items,
                span: (whole.start(), whole.end()),
            })
        })
        .collect()
}

/// Extracts citation clusters from `text`, ordered by position.
///
/// # Examples
///
/// ```
/// use bibsite::extract_citation_clusters;
///
/// let clusters = extract_citation_clusters("Studies [@a] [@b] and later [@c; @d].");
/// assert_eq!(clusters.len(), 2);
/// assert_eq!(clusters[0].items.len(), 2);
/// assert_eq!(clusters[1].items.len(), 2);
/// ```
pub fn extract_citation_clusters(text: &str) -> Vec<CitationCluster> {
    let mut clusters = extract_grouped(text);
    let grouped: Vec<(usize, usize)> = clusters.iter().map(|c| c.span).collect();
    let inside_group = |pos: usize| grouped.iter().any(|(s, e)| pos >= *s && pos < *e);

    let mut current: Option<CitationCluster> = None;
    for citation in extract_citations(text) {
        if inside_group(citation.span.0) {
            continue;
        }
        match current.as_mut() {
            Some(cluster)
                if text[cluster.span.1..citation.span.0]
                    .chars()
                    .all(|c| c == ' ' || c == '\t') =>
            {
                cluster.span.1 = citation.span.1;
                cluster.items.push(citation.item);
            }
            _ => {
                clusters.extend(current.take());
                current = Some(CitationCluster {
                    items: vec![citation.item],
                    span: citation.span,
                });
            }
        }
    }
    clusters.extend(current);

    clusters.sort_by_key(|c| c.span.0);
    clusters
}

/// Parses `p. 42`, `pp. 10-20`, `ch. 3`, `sec. 4.2` or the spelled-out
/// forms into a (value, label) pair.
fn parse_locator(text: &str) -> (Option<String>, Option<String>) {
    const PREFIXES: &[(&str, &str)] = &[
        ("pp.", "page"),
        ("p.", "page"),
        ("ch.", "chapter"),
        ("sec.", "section"),
        ("pages", "page"),
        ("page", "page"),
        ("chapter", "chapter"),
        ("section", "section"),
    ];

    let text = text.trim();
    for (prefix, label) in PREFIXES {
        if let Some(value) = text.strip_prefix(prefix).map(str::trim) {
            if !value.is_empty() {
                return (Some(value.to_string()), Some(label.to_string()));
            }
        }
    }

    if text.is_empty() {
        (None, None)
    } else {
        (Some(text.to_string()), None)
    }
}
