// HTML helpers — visible text and outbound links.
//
// Text extraction walks every text node in the document and drops anything
// under script, style and page-chrome elements. Link extraction resolves
// hrefs against the page URL, unwraps search-engine redirect links and
// discards fragments, non-HTTP schemes and obvious binary resources.

use std::collections::HashSet;

use anyhow::Result;
use scraper::{Html, Selector};
use url::Url;

/// Elements whose text never counts as page content.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "head", "nav", "footer", "iframe",
];

/// Paths search engines use for ad click-throughs.
const AD_PATHS: &[&str] = &["/y.js", "/aclick"];

/// File extensions the crawler won't bother fetching.
const BINARY_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "gif", "webp", "svg", "ico", "zip", "gz", "tar", "mp3", "mp4",
    "avi", "mov", "exe", "dmg", "epub", "mobi", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
];

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("Invalid selector {css:?}: {e}"))
}

/// The page title plus all visible body text, whitespace-collapsed.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<String> = Vec::new();

    if let Ok(title) = selector("title") {
        if let Some(el) = document.select(&title).next() {
            parts.push(el.text().collect::<Vec<_>>().join(" "));
        }
    }

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .map(|e| SKIPPED_ELEMENTS.contains(&e.name()))
                .unwrap_or(false)
        });
        if !hidden {
            parts.push(String::from(&**text));
        }
    }

    collapse_whitespace(&parts.join(" "))
}

/// Up to `limit` distinct absolute http(s) links found on the page.
pub fn extract_links(html: &str, base: &Url, limit: usize) -> Vec<Url> {
    if limit == 0 {
        return Vec::new();
    }
    let Ok(anchors) = selector("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in document.select(&anchors) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Some(url) = normalize_link(base, href) else {
            continue;
        };
        if seen.insert(url.as_str().to_string()) {
            links.push(url);
            if links.len() >= limit {
                break;
            }
        }
    }

    links
}

/// Resolve `href` against `base` into a crawlable URL, or None.
pub fn normalize_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = unwrap_redirect(base.join(href).ok()?);
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);

    if AD_PATHS.contains(&url.path()) || looks_binary(&url) {
        return None;
    }
    Some(url)
}

/// Follow search-engine redirect wrappers such as `/l/?uddg=<target>`.
pub fn unwrap_redirect(url: Url) -> Url {
    if url.path().starts_with("/l/") {
        let target = url
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .and_then(|(_, v)| Url::parse(&v).ok());
        if let Some(target) = target {
            return target;
        }
    }
    url
}

fn looks_binary(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| last.rsplit_once('.'))
        .map(|(_, ext)| BINARY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
