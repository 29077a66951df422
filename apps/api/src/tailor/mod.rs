//! Tailor pipeline — produces a complete styled HTML resume from extracted
//! resume text and job posting text, with guardrails against fabricated
//! facts.
//!
//! Flow: extract invariants + section order → build prompt → generation
//! call → post-process → verify invariants → retry once on violation.
//!
//! Failure semantics: this module never errors to its caller. Every path
//! yields a string; a failed generation call yields a synthesized error
//! page (still an HTTP 200 from the caller's perspective).

pub mod contact;
pub mod guardrails;
pub mod handlers;
pub mod jobfetch;
pub mod plaintext;
pub mod prompts;

use std::time::Duration;

use tracing::{info, warn};

use crate::llm_client::ChatBackend;
use self::contact::{detect_section_order, extract_contact_bits};
use self::guardrails::{
    invariants_present, order_ok, postprocess_html, render_error_html, render_fallback_html,
};
use self::prompts::{build_user_prompt, RETRY_SUFFIX, TAILOR_SYSTEM};

/// Cap applied to resume text, job text, and extractor output alike.
pub const MAX_TEXT_CHARS: usize = 20_000;

/// Pause before the retry attempt.
const RETRY_DELAY: Duration = Duration::from_millis(300);

/// Character-count truncation (not byte truncation — inputs are arbitrary
/// UTF-8).
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Per-request tailor knobs, sourced from config.
#[derive(Debug, Clone)]
pub struct TailorOptions {
    /// Timeout for each generation attempt.
    pub per_call_timeout: Duration,
    /// Extra attempts after a failed invariant check.
    pub max_retries: u32,
}

impl Default for TailorOptions {
    fn default() -> Self {
        Self {
            per_call_timeout: Duration::from_secs(18),
            max_retries: 1,
        }
    }
}

/// One generation attempt: call the backend, post-process on success,
/// synthesize an error page on failure.
async fn call_once(backend: &dyn ChatBackend, user_prompt: &str, timeout: Duration) -> String {
    match backend.complete(TAILOR_SYSTEM, user_prompt, timeout).await {
        Ok(html) => postprocess_html(html),
        Err(e) => {
            warn!("generation call failed: {e}");
            render_error_html(&e.to_string())
        }
    }
}

/// Produces the tailored HTML resume.
///
/// With no backend configured this renders the deterministic escaped
/// fallback and never touches the network. Otherwise: one generation
/// attempt, then at most one retry with an amended prompt if the output
/// violated the header or section-order invariants. The retry's output is
/// adopted only if it passes verification; otherwise the first attempt's
/// output is kept — verification failure is best-effort, never fatal.
pub async fn tailor_resume_html(
    backend: Option<&dyn ChatBackend>,
    opts: &TailorOptions,
    resume_text: &str,
    job_text: &str,
    interests: &str,
) -> String {
    let invariants = extract_contact_bits(resume_text);
    let section_order = detect_section_order(resume_text);

    let Some(backend) = backend else {
        info!("no generation credential configured; serving fallback render");
        return render_fallback_html(&invariants, resume_text);
    };

    let user_prompt = build_user_prompt(&invariants, &section_order, resume_text, job_text, interests);

    let mut html = call_once(backend, &user_prompt, opts.per_call_timeout).await;

    if opts.max_retries > 0
        && (!invariants_present(&html, &invariants) || !order_ok(&html, &section_order))
    {
        warn!("tailored output violated invariants/order; retrying once");
        tokio::time::sleep(RETRY_DELAY).await;
        let retry_prompt = format!("{user_prompt}{RETRY_SUFFIX}");
        let retry_html = call_once(backend, &retry_prompt, opts.per_call_timeout).await;
        if invariants_present(&retry_html, &invariants) && order_ok(&retry_html, &section_order) {
            html = retry_html;
        }
    }

    html
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmError;

    // Body lines are deliberately long/lowercase so only the name and the
    // two section titles register as headings.
    const RESUME: &str = "\
Jane Doe
jane@example.com

Experience
worked at acme corp as a senior engineer from 2019 to 2024

Education
graduated from state university with a bsc in computing
";

    /// Compliant output: carries name, email, and headings in order.
    const GOOD_HTML: &str = "<html><head></head><body>\
        <h1>Jane Doe</h1><p>jane@example.com</p>\
        <h2>Experience</h2><ul><li>Did things</li></ul>\
        <h2>Education</h2><p>State University</p>\
        </body></html>";

    /// Output missing the extracted name.
    const BAD_HTML: &str = "<html><head></head><body>\
        <p>jane@example.com</p>\
        <h2>Experience</h2><h2>Education</h2>\
        </body></html>";

    struct ScriptedBackend {
        responses: Mutex<Vec<Result<String, ()>>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<&str, ()>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .rev()
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _timeout: Duration,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.lock().unwrap().pop() {
                Some(Ok(html)) => Ok(html),
                _ => Err(LlmError::EmptyCompletion),
            }
        }
    }

    fn fast_opts() -> TailorOptions {
        TailorOptions {
            per_call_timeout: Duration::from_secs(1),
            max_retries: 1,
        }
    }

    #[tokio::test]
    async fn test_no_backend_serves_escaped_fallback() {
        let html = tailor_resume_html(None, &fast_opts(), "text <with> tags", "job", "").await;
        assert!(html.to_lowercase().starts_with("<!doctype html>"));
        assert!(html.contains("<pre style=\"white-space:pre-wrap\">text &lt;with&gt; tags</pre>"));
    }

    #[tokio::test]
    async fn test_compliant_output_needs_no_retry() {
        let backend = ScriptedBackend::new(vec![Ok(GOOD_HTML)]);
        let html = tailor_resume_html(Some(&backend), &fast_opts(), RESUME, "job", "").await;
        assert_eq!(backend.call_count(), 1);
        assert!(html.contains("Jane Doe"));
        assert!(html.to_lowercase().contains("<!doctype"));
    }

    #[tokio::test]
    async fn test_retry_adopted_when_it_passes_verification() {
        let backend = ScriptedBackend::new(vec![Ok(BAD_HTML), Ok(GOOD_HTML)]);
        let html = tailor_resume_html(Some(&backend), &fast_opts(), RESUME, "job", "").await;
        assert_eq!(backend.call_count(), 2);
        assert!(html.contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_failing_retry_keeps_first_attempt() {
        let backend = ScriptedBackend::new(vec![Ok(BAD_HTML), Ok(BAD_HTML)]);
        let html = tailor_resume_html(Some(&backend), &fast_opts(), RESUME, "job", "").await;
        assert_eq!(backend.call_count(), 2);
        // first attempt's output survives even though it fails verification
        assert!(!html.contains("Jane Doe"));
        assert!(html.contains("jane@example.com"));
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_call() {
        let backend = ScriptedBackend::new(vec![Ok(BAD_HTML)]);
        let opts = TailorOptions {
            max_retries: 0,
            ..fast_opts()
        };
        let html = tailor_resume_html(Some(&backend), &opts, RESUME, "job", "").await;
        assert_eq!(backend.call_count(), 1);
        assert!(html.contains("jane@example.com"));
    }

    #[tokio::test]
    async fn test_backend_failure_yields_error_page_not_panic() {
        let backend = ScriptedBackend::new(vec![Err(()), Err(())]);
        let html = tailor_resume_html(Some(&backend), &fast_opts(), RESUME, "job", "").await;
        assert!(html.contains(guardrails::TAILOR_ERROR_MARKER));
    }

    #[test]
    fn test_truncate_chars_is_boundary_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
