//! Link extraction from page bodies (HTML or plain text)

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid regex"));

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Substrings that mark a link as not worth checking: non-content schemes,
/// the platform's own domains, social networks, analytics and CDNs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionList {
    entries: Vec<String>,
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self::new([
            "google.com",
            "googleapis.com",
            "gstatic.com",
            "googleusercontent.com",
            "shopify.com",
            "shopifycdn.com",
            "myshopify.com",
            "facebook.com",
            "fb.com",
            "facebook.net",
            "instagram.com",
            "twitter.com",
            "x.com",
            "youtube.com",
            "youtu.be",
            "pinterest.com",
            "linkedin.com",
            "tiktok.com",
            "snapchat.com",
            "whatsapp.com",
            "mailto:",
            "tel:",
            "javascript:",
            "#",
        ])
    }
}

impl ExclusionList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|e| e.into().to_lowercase()).collect(),
        }
    }

    /// Substring match on the lower-cased URL
    pub fn is_excluded(&self, link: &str) -> bool {
        let lower = link.to_lowercase();
        self.entries.iter().any(|entry| lower.contains(entry.as_str()))
    }
}

/// Pulls candidate links out of page content and filters them
#[derive(Debug, Clone, Default)]
pub struct LinkExtractor {
    exclusions: ExclusionList,
}

impl LinkExtractor {
    pub fn new(exclusions: ExclusionList) -> Self {
        Self { exclusions }
    }

    /// Unique absolute http(s) links found in `content`.
    ///
    /// Anchor `href`s and bare URL literals are both collected. Path-absolute
    /// hrefs resolve against `base`; anything that does not end up as an
    /// absolute URL literal is dropped, as is anything on the exclusion list.
    pub fn extract(&self, content: &str, base: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        let candidates = anchor_hrefs(content).into_iter().chain(extract_urls(content));

        for candidate in candidates {
            let Some(link) = normalize(&candidate, base) else {
                continue;
            };
            if self.exclusions.is_excluded(&link) {
                continue;
            }
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }

        links
    }
}

/// `href` values of every anchor. html5ever recovers from broken markup.
fn anchor_hrefs(content: &str) -> Vec<String> {
    let doc = Html::parse_fragment(content);
    doc.select(&ANCHOR_SELECTOR)
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// URL literals in raw text, in document order
pub fn extract_urls(content: &str) -> Vec<String> {
    URL_RE
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn normalize(candidate: &str, base: &Url) -> Option<String> {
    let link = candidate.trim();
    if link.is_empty() {
        return None;
    }

    let link = if link.starts_with('/') {
        base.join(link).ok()?.to_string()
    } else {
        link.to_string()
    };

    // Must survive re-extraction from plain text unchanged
    let m = URL_RE.find(&link)?;
    if m.start() != 0 || m.end() != link.len() {
        return None;
    }

    Some(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://shop.example").unwrap()
    }

    fn extract(content: &str) -> Vec<String> {
        LinkExtractor::default().extract(content, &base())
    }

    #[test]
    fn test_extract_urls() {
        let content = r#"<p>Gift cards at https://shop.example/pages/gift-cards?ref=footer&amp;tag=x
            <a href="https://press.example/kiln?a=1&amp;b=2">press</a>
            or email us.</p>"#;

        let urls = extract_urls(content);
        assert_eq!(
            urls,
            vec![
                "https://shop.example/pages/gift-cards?ref=footer&amp;tag=x".to_string(),
                "https://press.example/kiln?a=1&amp;b=2".to_string(),
            ]
        );
    }

    #[test]
    fn test_parenthesised_href_kept_whole() {
        let html = r#"<a href="https://en.wikipedia.org/wiki/Rust_(programming_language)">Rust</a>"#;
        assert_eq!(
            extract(html),
            vec!["https://en.wikipedia.org/wiki/Rust_(programming_language)".to_string()]
        );
    }

    #[test]
    fn test_literal_keeps_trailing_punctuation() {
        let links = extract("Our kilns: https://kilns.example/list. Thanks!");
        assert_eq!(links, vec!["https://kilns.example/list.".to_string()]);
    }

    #[test]
    fn test_anchor_and_literal_links() {
        let html = r#"
            <p>Read <a href="https://blog.example.org/post">our post</a></p>
            <p>Plain mention: https://partner.example.net/deal</p>
        "#;
        let links = extract(html);
        assert_eq!(links.len(), 2);
        assert!(links.contains(&"https://blog.example.org/post".to_string()));
        assert!(links.contains(&"https://partner.example.net/deal".to_string()));
    }

    #[test]
    fn test_relative_links_resolved() {
        let links = extract(r#"<a href="/pages/contact">Contact</a>"#);
        assert_eq!(links, vec!["https://shop.example/pages/contact".to_string()]);
    }

    #[test]
    fn test_non_absolute_hrefs_dropped() {
        let links = extract(r#"<a href="contact.html">x</a><a href="ftp://files.example">y</a>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_exclusions() {
        let html = r##"
            <a href="mailto:hi@shop.example">Mail</a>
            <a href="tel:+15551234">Call</a>
            <a href="javascript:void(0)">Menu</a>
            <a href="#top">Top</a>
            <a href="https://www.facebook.com/shop">FB</a>
            <a href="https://INSTAGRAM.com/shop">IG</a>
            https://cdn.shopify.com/s/files/logo.png
            <a href="https://keep.example/page">Keep</a>
        "##;
        let links = extract(html);
        assert_eq!(links, vec!["https://keep.example/page".to_string()]);
    }

    #[test]
    fn test_no_excluded_link_escapes() {
        let exclusions = ExclusionList::default();
        let html = r#"
            <a href="https://facebook.com/a">a</a>
            https://m.facebook.com/b
            <a href="https://youtu.be/xyz">c</a>
            <a href="https://ok.example/">d</a>
        "#;
        for link in extract(html) {
            assert!(!exclusions.is_excluded(&link), "{} should be excluded", link);
        }
    }

    #[test]
    fn test_custom_exclusion_list() {
        let extractor = LinkExtractor::new(ExclusionList::new(["partner.example"]));
        let html = r#"<a href="https://partner.example/x">x</a><a href="https://www.facebook.com/y">y</a>"#;
        let links = extractor.extract(html, &base());
        assert_eq!(links, vec!["https://www.facebook.com/y".to_string()]);
    }

    #[test]
    fn test_dedup() {
        let html = r#"
            <a href="https://dup.example/a">one</a>
            <a href=" https://dup.example/a ">two</a>
            https://dup.example/a
        "#;
        assert_eq!(extract(html).len(), 1);
    }

    #[test]
    fn test_malformed_markup_tolerated() {
        let html = r#"<div><a href="https://ok.example/1">one<p><a href='https://ok.example/2'>two</div></span><a href"#;
        let links = extract(html);
        assert!(links.contains(&"https://ok.example/1".to_string()));
        assert!(links.contains(&"https://ok.example/2".to_string()));
    }

    #[test]
    fn test_reextraction_is_stable() {
        let html = r#"
            <a href="/pages/about">About</a>
            <a href="https://ext.example/path?q=1&amp;r=2">Ext</a>
            See https://other.example/doc.pdf, or (https://paren.example/x).
            <a href="https://spaces.example/a b">bad</a>
        "#;
        let first = extract(html);
        let rendered = first.join("\n");
        let mut second = extract(&rendered);
        let mut third = extract(&second.join("\n"));

        let mut expected = first.clone();
        expected.sort();
        second.sort();
        third.sort();
        assert_eq!(second, expected);
        assert_eq!(third, expected);
    }
}
