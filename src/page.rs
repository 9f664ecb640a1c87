use crate::model::PromoRecord;
use askama::Template;
use regex::Regex;
use std::sync::OnceLock;

pub const FALLBACK_LINK: &str = "#";
pub const PLACEHOLDER_CODE: &str = "XXXX-XXXX";

static CODE_PATTERN: OnceLock<Regex> = OnceLock::new();

#[derive(Template)]
#[template(path = "promo.html")]
struct PromoPage<'a> {
    link: &'a str,
    code: &'a str,
    activated: bool,
}

/// Missing or empty links point nowhere.
pub fn link_or_fallback(url: Option<&str>) -> &str {
    url.filter(|url| !url.is_empty()).unwrap_or(FALLBACK_LINK)
}

/// First `code=` query value anywhere in the link.
pub fn extract_code(link: &str) -> Option<&str> {
    CODE_PATTERN
        .get_or_init(|| Regex::new(r"[?&]code=([^&]+)").expect("Invalid code pattern"))
        .captures(link)
        .and_then(|captures| captures.get(1))
        .map(|code| code.as_str())
}

pub fn display_code(link: &str) -> &str {
    extract_code(link).unwrap_or(PLACEHOLDER_CODE)
}

/// Renders the landing page. Link and code are HTML-escaped by the template.
pub fn render(record: &PromoRecord) -> Result<String, askama::Error> {
    let link = link_or_fallback(record.url.as_deref());
    PromoPage {
        link,
        code: display_code(link),
        activated: record.activated,
    }
    .render()
}
