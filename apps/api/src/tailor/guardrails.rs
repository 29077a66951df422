//! Guardrail verification and HTML post-processing.
//!
//! Two hard invariants are checked against generated output:
//! header invariants (extracted name/email must appear verbatim,
//! case-insensitive) and section order (every detected heading present,
//! in the detected relative order). Verification failure is never fatal —
//! it only drives the single retry.

use html_escape::encode_text;

use crate::tailor::contact::{heading_key, ContactInvariants};

/// Default stylesheet injected when generated output arrives without one.
pub const DEFAULT_CSS: &str = "<style>\n\
body{font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif;background:#0b1220;color:#e6eaf2;margin:24px}\n\
.card{background:#121a2b;border:1px solid #223154;border-radius:14px;padding:22px;max-width:900px;margin:auto}\n\
h1,h2{margin:0 0 10px} h1{font-size:28px} h2{font-size:18px;margin-top:22px}\n\
ul{margin:8px 0 0 18px}\n\
li{color:#fff}\n\
</style>\n";

/// Fixed marker distinguishing the synthesized error page from real output.
pub const TAILOR_ERROR_MARKER: &str = "Tailor error";

/// Header invariants: extracted name and email must survive generation as
/// case-insensitive substrings.
pub fn invariants_present(html: &str, invariants: &ContactInvariants) -> bool {
    if html.is_empty() {
        return false;
    }
    let html_lower = html.to_lowercase();
    if !invariants.name.is_empty() && !html_lower.contains(&invariants.name.to_lowercase()) {
        return false;
    }
    if !invariants.email.is_empty() && !html_lower.contains(&invariants.email.to_lowercase()) {
        return false;
    }
    true
}

/// Section order invariant: each detected heading appears, and its first
/// occurrence is positioned no earlier than the previous heading's.
pub fn order_ok(html: &str, section_order: &[String]) -> bool {
    if section_order.is_empty() {
        return true;
    }
    let html_lower = html.to_lowercase();
    let mut last_pos = 0;
    for heading in section_order {
        match html_lower.find(&heading_key(heading)) {
            Some(pos) if pos >= last_pos => last_pos = pos,
            _ => return false,
        }
    }
    true
}

/// Normalizes generated output into a complete styled document: doctype
/// prepended if missing, stylesheet injected if absent, and list items
/// forced to a visible color.
pub fn postprocess_html(html: String) -> String {
    let mut html = html;
    if !html.to_lowercase().contains("<!doctype") {
        html = format!("<!doctype html>\n{html}");
    }
    if !html.to_lowercase().contains("<style") {
        if html.contains("<head>") {
            html = html.replace("<head>", &format!("<head>\n{DEFAULT_CSS}"));
        } else {
            html = format!("<!doctype html><html><head>{DEFAULT_CSS}</head><body>{html}</body></html>");
        }
    } else if !html.contains("li{color") {
        html = html.replace("</style>", "li{color:#fff}\n</style>");
    }
    html
}

/// Synthesized page for a failed generation call. Served with HTTP 200 —
/// a partial, explanatory result beats no result.
pub fn render_error_html(error: &str) -> String {
    let safe = encode_text(error);
    format!(
        "<!doctype html><html><head>{DEFAULT_CSS}</head>\
         <body><div class='card'>\
         <h2>{TAILOR_ERROR_MARKER}</h2>\
         <p class='muted'>Generation request failed or timed out.</p>\
         <pre>{safe}</pre></div></body></html>"
    )
}

/// Deterministic render used when no generation credential is configured.
/// Escaped plaintext with the extracted header bits; never calls out.
pub fn render_fallback_html(invariants: &ContactInvariants, resume_text: &str) -> String {
    let safe_resume = resume_text.replace('<', "&lt;").replace('>', "&gt;");
    let name = if invariants.name.is_empty() {
        "Your Name"
    } else {
        invariants.name.as_str()
    };
    let links = invariants
        .links
        .iter()
        .map(|l| encode_text(l).into_owned())
        .collect::<Vec<_>>()
        .join(" • ");
    format!(
        "<!doctype html>\n\
         <html lang=\"en\"><meta charset=\"utf-8\" />\n\
         <title>Tailored Resume (AI disabled)</title>\n\
         {DEFAULT_CSS}\
         <div class=\"card\">\n\
         <h1>{}</h1>\n\
         <div class=\"muted\">{} {}</div>\n\
         <p class=\"muted\">{links}</p>\n\
         <h2>Original (not parsed)</h2>\n\
         <pre style=\"white-space:pre-wrap\">{safe_resume}</pre>\n\
         </div>\n\
         </html>",
        encode_text(name),
        encode_text(&invariants.email),
        encode_text(&invariants.phone),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invariants() -> ContactInvariants {
        ContactInvariants {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "(555) 123-4567".to_string(),
            links: vec!["https://janedoe.dev".to_string()],
        }
    }

    #[test]
    fn test_invariants_present_is_case_insensitive() {
        let html = "<h1>JANE DOE</h1><p>Jane@Example.COM</p>";
        assert!(invariants_present(html, &invariants()));
    }

    #[test]
    fn test_invariants_missing_name_fails() {
        let html = "<p>jane@example.com</p>";
        assert!(!invariants_present(html, &invariants()));
        assert!(!invariants_present("", &invariants()));
    }

    #[test]
    fn test_empty_invariants_always_pass_on_nonempty_html() {
        assert!(invariants_present("<p>x</p>", &ContactInvariants::default()));
    }

    #[test]
    fn test_order_ok_respects_relative_positions() {
        let order = vec!["Experience".to_string(), "Education".to_string()];
        assert!(order_ok("<h2>Experience</h2>...<h2>Education</h2>", &order));
        assert!(!order_ok("<h2>Education</h2>...<h2>Experience</h2>", &order));
        assert!(!order_ok("<h2>Experience</h2> only", &order));
        assert!(order_ok("anything", &[]));
    }

    #[test]
    fn test_postprocess_prepends_doctype() {
        let out = postprocess_html("<html><head><style>x</style></head></html>".to_string());
        assert!(out.to_lowercase().starts_with("<!doctype html>"));
    }

    #[test]
    fn test_postprocess_injects_css_after_head() {
        let out = postprocess_html("<!doctype html><html><head></head><body></body></html>".to_string());
        assert!(out.contains("<style>"));
        assert!(out.contains("li{color:#fff}"));
    }

    #[test]
    fn test_postprocess_wraps_bare_fragment() {
        let out = postprocess_html("<h1>Hi</h1>".to_string());
        assert!(out.to_lowercase().contains("<!doctype"));
        assert!(out.contains("<style>"));
        assert!(out.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_postprocess_forces_li_color_into_existing_style() {
        let out =
            postprocess_html("<!doctype html><html><head><style>body{}</style></head></html>".to_string());
        assert!(out.contains("li{color:#fff}\n</style>"));
    }

    #[test]
    fn test_error_page_carries_marker_and_escaped_detail() {
        let out = render_error_html("timeout <deadline exceeded>");
        assert!(out.contains(TAILOR_ERROR_MARKER));
        assert!(out.contains("&lt;deadline exceeded&gt;"));
        assert!(out.to_lowercase().contains("<!doctype"));
    }

    #[test]
    fn test_fallback_is_complete_document_with_escaped_resume() {
        let out = render_fallback_html(&invariants(), "line <one>\nline two");
        assert!(out.to_lowercase().starts_with("<!doctype html>"));
        assert!(out.contains("<pre style=\"white-space:pre-wrap\">line &lt;one&gt;\nline two</pre>"));
        assert!(out.contains("Jane Doe"));
        assert!(out.contains("jane@example.com"));
        assert!(out.contains("https://janedoe.dev"));
    }

    #[test]
    fn test_fallback_placeholder_name_when_missing() {
        let out = render_fallback_html(&ContactInvariants::default(), "text");
        assert!(out.contains("Your Name"));
    }
}
