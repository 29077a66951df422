//! Plaintext Extractor — best-effort text from uploaded document bytes.
//!
//! This component is total: every input yields text. Content that cannot
//! be extracted degrades to a bracketed placeholder instead of failing the
//! request, so content-quality problems stay visible in the output itself.

use crate::tailor::{truncate_chars, MAX_TEXT_CHARS};

/// Outcome of a best-effort text producer. `Degraded` carries the
/// bracketed placeholder that stands in for the missing content, so
/// downstream code can branch on the variant instead of pattern-matching
/// magic strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    Extracted(String),
    Degraded(String),
}

impl TextOutcome {
    pub fn text(&self) -> &str {
        match self {
            TextOutcome::Extracted(s) | TextOutcome::Degraded(s) => s,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, TextOutcome::Degraded(_))
    }
}

/// Extracts plain text from uploaded bytes according to the declared
/// content type, capped at 20,000 characters.
pub fn extract_resume_text(data: &[u8], content_type: &str) -> TextOutcome {
    if content_type == "application/pdf" || data.starts_with(b"%PDF") {
        return extract_pdf_text(data);
    }
    if content_type.starts_with("text/")
        || content_type == "application/json"
        || content_type == "application/xml"
    {
        let text = String::from_utf8_lossy(data);
        return TextOutcome::Extracted(truncate_chars(&text, MAX_TEXT_CHARS));
    }
    TextOutcome::Degraded(format!("[Original content-type {content_type} not parsed]"))
}

fn extract_pdf_text(data: &[u8]) -> TextOutcome {
    match pdf_extract::extract_text_from_mem(data) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                TextOutcome::Degraded("[PDF had no extractable text]".to_string())
            } else {
                TextOutcome::Extracted(truncate_chars(text, MAX_TEXT_CHARS))
            }
        }
        Err(e) => {
            // pdf-extract tries an empty owner password itself; a document
            // that still reports encryption is unreadable for us.
            let detail = e.to_string();
            if detail.to_lowercase().contains("encrypt") {
                TextOutcome::Degraded("[PDF is encrypted; text not extracted]".to_string())
            } else {
                TextOutcome::Degraded(format!("[Could not extract PDF text: {detail}]"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_types_decode_lossily() {
        let out = extract_resume_text(b"Jane Doe\nEngineer", "text/plain");
        assert_eq!(out, TextOutcome::Extracted("Jane Doe\nEngineer".to_string()));

        let out = extract_resume_text(&[0x4a, 0xff, 0x61], "text/plain");
        assert!(!out.is_degraded());
        assert!(out.text().contains('\u{FFFD}'));
    }

    #[test]
    fn test_json_and_xml_treated_as_text() {
        assert!(!extract_resume_text(b"{}", "application/json").is_degraded());
        assert!(!extract_resume_text(b"<r/>", "application/xml").is_degraded());
    }

    #[test]
    fn test_unparsed_content_type_degrades_with_placeholder() {
        let out = extract_resume_text(b"\x00\x01", "application/msword");
        assert_eq!(
            out,
            TextOutcome::Degraded(
                "[Original content-type application/msword not parsed]".to_string()
            )
        );
    }

    #[test]
    fn test_garbage_bytes_declared_pdf_never_panic() {
        let out = extract_resume_text(b"not a pdf at all", "application/pdf");
        assert!(out.is_degraded());
        assert!(out.text().starts_with('['));
    }

    #[test]
    fn test_pdf_magic_overrides_declared_type() {
        // starts with %PDF but is truncated garbage — must degrade, not panic
        let out = extract_resume_text(b"%PDF-1.7 garbage", "text/plain");
        assert!(out.is_degraded());
    }

    #[test]
    fn test_zero_length_input() {
        let out = extract_resume_text(b"", "text/plain");
        assert_eq!(out, TextOutcome::Extracted(String::new()));
        assert!(extract_resume_text(b"", "application/pdf").is_degraded());
    }

    #[test]
    fn test_output_capped_at_20000_chars() {
        let big = "a".repeat(50_000);
        let out = extract_resume_text(big.as_bytes(), "text/plain");
        assert_eq!(out.text().chars().count(), MAX_TEXT_CHARS);
    }
}
