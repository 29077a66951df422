//! Prompt construction for the tailor pipeline.

use crate::tailor::contact::{heading_key, ContactInvariants};
use crate::tailor::{truncate_chars, MAX_TEXT_CHARS};

/// Hard rules the generation backend must honor. Everything the guardrail
/// verifier checks afterwards is stated here first.
pub const TAILOR_SYSTEM: &str = "\
You are a precise, ATS-friendly resume editor.
HARD RULES:
• Do NOT invent or change facts: company names, job titles, locations, date ranges, degrees, school names.
• Keep the original EXPERIENCE role scaffolding (employer/title/location/dates) exactly.
• Rewrite ONLY the bullet points to emphasize JD keywords; keep counts similar (3–6/role) and realistic.
• If a field is missing in the source, omit it rather than fabricating.
• Output a COMPLETE, valid HTML document (<!doctype html>…</html>) with modest inline CSS. No code fences.
• Bullets (<li>) must render with white text (set inline CSS or parent style).
• **Preserve the original SECTION ORDER exactly as provided.**";

/// Appended to the user message on retry, restating the violated
/// constraints explicitly.
pub const RETRY_SUFFIX: &str = "\n\n\
IMPORTANT: Your previous draft missed invariants and/or original section order. Regenerate and:\n\
- Include header invariants verbatim if present.\n\
- Keep EXACT section order as listed; do not rename or reorder sections.\n\
- Keep employer/title/location/date scaffolding exactly; only rewrite bullets.";

/// Assembles the user message: header invariants, section order (display
/// and normalized keys), experience-scaffolding instructions, and the
/// truncated resume/job text.
pub fn build_user_prompt(
    invariants: &ContactInvariants,
    section_order: &[String],
    resume_text: &str,
    job_text: &str,
    interests: &str,
) -> String {
    let mut invariant_lines = Vec::new();
    if !invariants.name.is_empty() {
        invariant_lines.push(format!("- Name: {}", invariants.name));
    }
    if !invariants.email.is_empty() {
        invariant_lines.push(format!("- Email: {}", invariants.email));
    }
    if !invariants.phone.is_empty() {
        invariant_lines.push(format!("- Phone: {}", invariants.phone));
    }
    if !invariants.links.is_empty() {
        invariant_lines.push(format!("- Links: {}", invariants.links.join(", ")));
    }
    let invariant_block = if invariant_lines.is_empty() {
        "- (no explicit header invariants found)".to_string()
    } else {
        invariant_lines.join("\n")
    };

    let order_display = if section_order.is_empty() {
        "(not detected)".to_string()
    } else {
        section_order.join(" > ")
    };
    let order_keys: Vec<String> = section_order.iter().map(|h| heading_key(h)).collect();

    let interests = if interests.is_empty() {
        "(none)"
    } else {
        interests
    };

    format!(
        "Produce a tailored resume as HTML.\n\n\
         HEADER INVARIANTS (must appear verbatim if present; omit blank lines):\n\
         {invariant_block}\n\n\
         ORIGINAL SECTION ORDER (must be preserved as-is, including unfamiliar/custom sections):\n\
         {order_display}\n\n\
         Normalized order keys (for strict compliance):\n\
         {order_keys:?}\n\n\
         EXPERIENCE INVARIANTS:\n\
         - Read the Experience section in the RESUME TEXT and copy employer names, job titles, locations, and date ranges EXACTLY as written.\n\
         - Rewrite only the bullets under each role; incorporate JD keywords naturally without keyword-stuffing.\n\n\
         STYLE:\n\
         - Sections present in the source must appear in the SAME ORDER. Do not add new sections unless present in the source.\n\
         - Concise, metric-oriented bullets where authentic.\n\
         - Use <ul><li> for bullets and ensure <li> text is white via CSS.\n\n\
         RESUME TEXT (raw/extracted, may be partial):\n\
         -----\n{resume}\n-----\n\n\
         JOB DESCRIPTION (sanitized):\n\
         -----\n{job}\n-----\n\n\
         Candidate interests/keywords: {interests}\n",
        resume = truncate_chars(resume_text, MAX_TEXT_CHARS),
        job = truncate_chars(job_text, MAX_TEXT_CHARS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_invariants_and_order() {
        let invariants = ContactInvariants {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: String::new(),
            links: vec!["https://janedoe.dev".to_string()],
        };
        let order = vec!["Experience".to_string(), "Education".to_string()];
        let prompt = build_user_prompt(&invariants, &order, "resume body", "job body", "rust");
        assert!(prompt.contains("- Name: Jane Doe"));
        assert!(prompt.contains("- Email: jane@example.com"));
        assert!(!prompt.contains("- Phone:"));
        assert!(prompt.contains("Experience > Education"));
        assert!(prompt.contains("[\"experience\", \"education\"]"));
        assert!(prompt.contains("resume body"));
        assert!(prompt.contains("Candidate interests/keywords: rust"));
    }

    #[test]
    fn test_prompt_placeholders_when_nothing_detected() {
        let prompt = build_user_prompt(&ContactInvariants::default(), &[], "r", "j", "");
        assert!(prompt.contains("(no explicit header invariants found)"));
        assert!(prompt.contains("(not detected)"));
        assert!(prompt.contains("Candidate interests/keywords: (none)"));
    }

    #[test]
    fn test_prompt_truncates_long_inputs() {
        let long = "x".repeat(30_000);
        let prompt = build_user_prompt(&ContactInvariants::default(), &[], &long, "j", "");
        assert!(prompt.len() < 25_000);
    }
}
