//! Content classifier: does a 200 response actually carry a page worth linking to?
//!
//! Storefronts answer 200 for empty carts, soft 404s and theme shells, so the
//! status code alone says little. The classifier strips structural chrome and
//! known boilerplate phrases, then looks at what text is left and where it sits.

use regex::Regex;
use std::sync::LazyLock;

/// Residual text needed when content containers are present
const CONTAINER_TEXT_MIN: usize = 200;
/// Heading + paragraph text needed when both exist
const HEADING_PARAGRAPH_TEXT_MIN: usize = 150;
/// Residual text that is enough on its own
const SUBSTANTIAL_TEXT_MIN: usize = 500;
/// Residual text a blog page must reach
const BLOG_TEXT_MIN: usize = 200;

static CHROME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "nav", "footer", "header"]
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).expect("valid regex"))
        .collect()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h[1-6][^>]*>(.*?)</h[1-6]\s*>").expect("valid regex"));

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p\s*>").expect("valid regex"));

/// Navigation, social, policy and cart phrases, applied in order
pub const DEFAULT_BOILERPLATE_PATTERNS: &[&str] = &[
    r"\byour cart is empty\b",
    r"\blog in to check out faster\b",
    r"\bhome\b",
    r"\bshop\b",
    r"\bcart\b",
    r"\blogin\b",
    r"\bsearch\b",
    r"\bmenu\b",
    r"\bfooter\b",
    r"\bheader\b",
    r"\bfacebook\b",
    r"\binstagram\b",
    r"\btwitter\b",
    r"\byoutube\b",
    r"\btiktok\b",
    r"\babout\b",
    r"\bcontact\b",
    r"\bvisit our stores\b",
    r"\bstore hours\b",
    r"\bphone number\b",
    r"\bcustomer service\b",
    r"\bjoin our\b",
    r"\bpowered by shopify\b",
    r"\brefund policy\b",
    r"\bprivacy policy\b",
    r"\bterms of service\b",
    r"\bshipping policy\b",
    r"©\s*\d{4}",
    r"\bhave an account\b",
    r"\blog in\b",
    r"\bcontinue shopping\b",
    r"\bcheck out\b",
    r"\bestimated total\b",
    r"\btaxes.*calculated\b",
];

/// Markup that usually wraps authored content
pub const DEFAULT_CONTENT_INDICATORS: &[&str] = &[
    "<article",
    "<main",
    "<section",
    r#"class="content""#,
    r#"class="post""#,
    r#"class="article""#,
    r#"class="blog-post""#,
    r#"class="page-content""#,
    r#"id="content""#,
    r#"id="main-content""#,
    r#"class="blog-content""#,
    r#"class="post-content""#,
];

static DEFAULT_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DEFAULT_BOILERPLATE_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid regex"))
        .collect()
});

/// Ordered removal rules for boilerplate text
#[derive(Debug, Clone)]
pub struct BoilerplateRules {
    rules: Vec<Regex>,
}

impl Default for BoilerplateRules {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }
}

impl BoilerplateRules {
    /// Compile custom patterns (matched case-insensitively)
    pub fn new<'a, I>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let rules = patterns
            .into_iter()
            .map(|p| Regex::new(&format!("(?i){}", p)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Remove every rule's matches, then collapse whitespace
    pub fn strip(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            if rule.is_match(&out) {
                out = rule.replace_all(&out, "").into_owned();
            }
        }
        collapse_whitespace(&out)
    }
}

/// Why a page was (or was not) judged meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No HTML at all
    Empty,
    /// Two or more content containers and enough residual text
    ContentContainers,
    /// Headings and paragraphs with enough text between them
    HeadingsAndParagraphs,
    /// Plenty of residual text regardless of markup
    SubstantialText,
    /// Mentions "blog" and has enough prose under a heading or paragraph
    BlogContent,
    /// Mentions "blog" but lacks the prose a blog page should have
    ThinBlogPage,
    /// Nothing left after stripping chrome and boilerplate
    Boilerplate,
}

impl Verdict {
    pub fn is_meaningful(self) -> bool {
        matches!(
            self,
            Verdict::ContentContainers
                | Verdict::HeadingsAndParagraphs
                | Verdict::SubstantialText
                | Verdict::BlogContent
        )
    }
}

#[derive(Debug, Clone)]
pub struct ContentClassifier {
    rules: BoilerplateRules,
    indicators: Vec<String>,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(
            BoilerplateRules::default(),
            DEFAULT_CONTENT_INDICATORS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl ContentClassifier {
    pub fn new(rules: BoilerplateRules, indicators: Vec<String>) -> Self {
        Self {
            rules,
            indicators: indicators.into_iter().map(|i| i.to_lowercase()).collect(),
        }
    }

    pub fn is_meaningful(&self, html: &str) -> bool {
        self.classify(html).is_meaningful()
    }

    pub fn classify(&self, html: &str) -> Verdict {
        if html.trim().is_empty() {
            return Verdict::Empty;
        }

        let html_lower = html.to_lowercase();

        let mut body = html.to_string();
        for re in CHROME_RES.iter() {
            body = re.replace_all(&body, "").into_owned();
        }
        let text = collapse_whitespace(&TAG_RE.replace_all(&body, " "));
        let meaningful_len = self.rules.strip(&text).chars().count();

        let container_count = self
            .indicators
            .iter()
            .filter(|indicator| html_lower.contains(indicator.as_str()))
            .count();

        if container_count >= 2 && meaningful_len > CONTAINER_TEXT_MIN {
            return Verdict::ContentContainers;
        }

        let headings = inner_text(&HEADING_RE, html);
        let paragraphs = inner_text(&PARAGRAPH_RE, html);
        let has_headings = headings.is_some();
        let has_paragraphs = paragraphs.is_some();

        if let (Some(h), Some(p)) = (&headings, &paragraphs) {
            let combined = self.rules.strip(&format!("{} {}", h, p));
            if combined.chars().count() > HEADING_PARAGRAPH_TEXT_MIN {
                return Verdict::HeadingsAndParagraphs;
            }
        }

        if meaningful_len > SUBSTANTIAL_TEXT_MIN {
            return Verdict::SubstantialText;
        }

        // Any mention of "blog" counts, including a footer link, so a
        // non-blog page with a blog link in its footer gets the looser bar.
        if html_lower.contains("blog") {
            if meaningful_len >= BLOG_TEXT_MIN && (has_headings || has_paragraphs) {
                return Verdict::BlogContent;
            }
            return Verdict::ThinBlogPage;
        }

        Verdict::Boilerplate
    }
}

/// Tag-stripped text of every match of `re`, or `None` if nothing matched
fn inner_text(re: &Regex, html: &str) -> Option<String> {
    let parts: Vec<&str> = re
        .captures_iter(html)
        .map(|cap| cap.get(1).map_or("", |m| m.as_str()))
        .collect();

    if parts.is_empty() {
        return None;
    }
    Some(collapse_whitespace(&TAG_RE.replace_all(&parts.join(" "), " ")))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
