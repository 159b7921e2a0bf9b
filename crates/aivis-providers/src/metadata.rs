//! Best-effort website metadata lookup.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid attr regex")
});

/// Fetch `url` and return its meta description, if any.
///
/// The whole operation (connect, response, body) is bounded by
/// `timeout_secs`. Every failure, including the timeout, collapses to `None`.
pub async fn fetch_page_meta_description(url: &str, timeout_secs: u64) -> Option<String> {
    let timeout = Duration::from_secs(timeout_secs);
    match tokio::time::timeout(timeout, fetch_html(url, timeout)).await {
        Ok(Ok(html)) => extract_meta_description(&html),
        Ok(Err(e)) => {
            tracing::debug!(url, error = %e, "metadata fetch failed");
            None
        }
        Err(_) => {
            tracing::debug!(url, timeout_secs, "metadata fetch timed out");
            None
        }
    }
}

async fn fetch_html(url: &str, timeout: Duration) -> Result<String, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
        .send()
        .await?
        .error_for_status()?;
    response.text().await
}

/// Pull the page description out of raw HTML.
///
/// Prefers `<meta name="description">` and falls back to
/// `<meta property="og:description">`. Blank values are ignored.
#[must_use]
pub fn extract_meta_description(html: &str) -> Option<String> {
    let mut og_description = None;

    for tag in META_TAG_RE.find_iter(html) {
        let mut key = None;
        let mut content = None;
        for caps in ATTR_RE.captures_iter(tag.as_str()) {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str())
                .trim();
            match name.as_str() {
                "name" | "property" => key = Some(value.to_ascii_lowercase()),
                "content" => content = Some(value.to_string()),
                _ => {}
            }
        }

        let Some(content) = content.filter(|c| !c.is_empty()) else {
            continue;
        };
        match key.as_deref() {
            Some("description") => return Some(content),
            Some("og:description") if og_description.is_none() => og_description = Some(content),
            _ => {}
        }
    }

    og_description
}
