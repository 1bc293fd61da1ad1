//! RFC 8288 `Link` response-header parsing.
//!
//! Some resources advertise transitions in headers rather than in the body,
//! e.g. `Link: <https://api.example.com/persons?start=20>; rel="next"`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::Link;

#[allow(clippy::expect_used)]
static LINK_VALUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([^>]*)>\s*((?:;[^,<]*)*)").expect("Link header regex is valid") // Static pattern, safe to panic
});

/// Parses one or more `Link` header values into links.
///
/// A value with several space-separated relation types yields one [`Link`]
/// per relation. Entries without a `rel` parameter are skipped.
///
/// # Examples
///
/// ```
/// use gedcomx_client::link::parse_link_header;
///
/// let links = parse_link_header(r#"<https://api.example.com/p?start=20>; rel="next", </p?start=0>; rel="first""#);
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].rel, "next");
/// assert_eq!(links[1].href.as_deref(), Some("/p?start=0"));
/// ```
#[must_use]
pub fn parse_link_header(value: &str) -> Vec<Link> {
    let mut links = Vec::new();

    for captures in LINK_VALUE_PATTERN.captures_iter(value) {
        let Some(target) = captures.get(1).map(|m| m.as_str().trim()) else {
            continue;
        };
        let params = captures.get(2).map_or("", |m| m.as_str());

        let mut rels: Vec<&str> = Vec::new();
        let mut media_type = None;
        let mut title = None;
        for param in params.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, raw_value)) = param.split_once('=') else {
                continue;
            };
            let param_value = raw_value.trim().trim_matches('"');
            match key.trim().to_ascii_lowercase().as_str() {
                "rel" => rels.extend(param_value.split_whitespace()),
                "type" => media_type = Some(param_value.to_string()),
                "title" => title = Some(param_value.to_string()),
                _ => {}
            }
        }

        if rels.is_empty() {
            trace!(target, "Link header entry without rel; skipping");
            continue;
        }

        for rel in rels {
            let mut link = Link::with_href(rel, target);
            link.media_type.clone_from(&media_type);
            link.title.clone_from(&title);
            links.push(link);
        }
    }

    links
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_single_link() {
        let links = parse_link_header(r#"<https://api.example.com/next>; rel="next""#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].rel, "next");
        assert_eq!(links[0].href.as_deref(), Some("https://api.example.com/next"));
        assert!(links[0].template.is_none());
    }

    #[test]
    fn test_multiple_rels_in_one_entry() {
        let links = parse_link_header(r#"</persons/1>; rel="self person""#);
        let rels: Vec<&str> = links.iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(rels, vec!["self", "person"]);
    }

    #[test]
    fn test_type_and_title_params() {
        let links = parse_link_header(
            r#"</c>; rel=collection; type="application/x-gedcomx-v1+json"; title="Tree""#,
        );
        assert_eq!(links[0].rel, "collection");
        assert_eq!(
            links[0].media_type.as_deref(),
            Some("application/x-gedcomx-v1+json")
        );
        assert_eq!(links[0].title.as_deref(), Some("Tree"));
    }

    #[test]
    fn test_entry_without_rel_skipped() {
        let links = parse_link_header(r#"</a>; title="x", </b>; rel="next""#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href.as_deref(), Some("/b"));
    }

    #[test]
    fn test_garbage_yields_nothing() {
        assert!(parse_link_header("not a link header").is_empty());
    }
}
