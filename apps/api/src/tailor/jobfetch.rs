//! Web Text Fetcher — retrieves a job posting URL and strips markup down
//! to visible text. Total like the plaintext extractor: network and parse
//! failures degrade to placeholders, never errors.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::tailor::plaintext::TextOutcome;
use crate::tailor::{truncate_chars, MAX_TEXT_CHARS};

/// Descriptive client identifier sent with every outbound fetch.
pub const USER_AGENT: &str = "ResumeAssistantBot/1.0 (+https://example.com)";
/// Job pages are fetched with a short leash; a slow posting page must not
/// stall the tailor request.
pub const JOB_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());

/// Reduces an HTML page to whitespace-collapsed visible text with HTML
/// entities decoded.
pub fn strip_visible_text(html: &str) -> String {
    let without_script = SCRIPT_RE.replace_all(html, " ");
    let without_style = STYLE_RE.replace_all(&without_script, " ");
    let without_tags = TAG_RE.replace_all(&without_style, " ");
    let collapsed = without_tags.split_whitespace().collect::<Vec<_>>().join(" ");
    html_escape::decode_html_entities(&collapsed).into_owned()
}

/// Fetches the job posting and returns its visible text, ≤20,000 chars.
pub async fn fetch_job_text(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> TextOutcome {
    if url.is_empty() {
        return TextOutcome::Degraded("[No job URL provided]".to_string());
    }

    let response = match client
        .get(url)
        .header("user-agent", USER_AGENT)
        .timeout(timeout)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => return TextOutcome::Degraded(format!("[Could not fetch JD: {e}]")),
    };

    let status = response.status();
    if !status.is_success() {
        return TextOutcome::Degraded(format!("[Could not fetch JD: HTTP {status}]"));
    }

    let html = match response.text().await {
        Ok(body) => body,
        Err(e) => return TextOutcome::Degraded(format!("[Could not fetch JD: {e}]")),
    };

    let text = strip_visible_text(&html);
    debug!("job page stripped to {} chars", text.len());
    if text.is_empty() {
        TextOutcome::Degraded("[Fetched page had no visible text]".to_string())
    } else {
        TextOutcome::Extracted(truncate_chars(&text, MAX_TEXT_CHARS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_script_and_style_blocks() {
        let html = r#"<html><head><style>body{color:red}</style>
            <SCRIPT type="text/javascript">alert("x")</SCRIPT></head>
            <body><h1>Senior  Engineer</h1><p>Build things.</p></body></html>"#;
        let text = strip_visible_text(html);
        assert_eq!(text, "Senior Engineer Build things.");
    }

    #[test]
    fn test_strip_decodes_entities_after_collapse() {
        let text = strip_visible_text("<p>Pay: &pound;90k &amp; equity</p>");
        assert_eq!(text, "Pay: £90k & equity");
    }

    #[test]
    fn test_strip_handles_tagless_input() {
        assert_eq!(strip_visible_text("plain   text"), "plain text");
        assert_eq!(strip_visible_text(""), "");
    }

    #[tokio::test]
    async fn test_empty_url_degrades_without_network() {
        let client = reqwest::Client::new();
        let out = fetch_job_text(&client, "", JOB_FETCH_TIMEOUT).await;
        assert_eq!(
            out,
            TextOutcome::Degraded("[No job URL provided]".to_string())
        );
    }

    #[tokio::test]
    async fn test_malformed_url_degrades() {
        let client = reqwest::Client::new();
        let out = fetch_job_text(&client, "not a url", JOB_FETCH_TIMEOUT).await;
        assert!(out.is_degraded());
        assert!(out.text().starts_with("[Could not fetch JD:"));
        assert!(out.text().chars().count() <= MAX_TEXT_CHARS);
    }
}
