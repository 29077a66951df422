use serde::{Deserialize, Serialize};

/// What a stored document is: an uploaded original or a generated tailor.
/// Wire values match the store's `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "resume_original")]
    Original,
    #[serde(rename = "resume_tailored")]
    Tailored,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Original => "resume_original",
            DocumentKind::Tailored => "resume_tailored",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        if s == "resume_tailored" {
            DocumentKind::Tailored
        } else {
            DocumentKind::Original
        }
    }
}

/// A document record as stored in the docs table. Immutable once created;
/// deleted explicitly. A tailored record always carries `sourceDocumentId`
/// referencing the original it was derived from (descriptive only — no
/// cascading delete).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub user_id: String,
    pub document_id: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub s3_key: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
    /// Presigned retrieval URL, attached on listing only. Never stored.
    #[serde(skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_values() {
        assert_eq!(
            serde_json::to_string(&DocumentKind::Original).unwrap(),
            "\"resume_original\""
        );
        assert_eq!(
            serde_json::to_string(&DocumentKind::Tailored).unwrap(),
            "\"resume_tailored\""
        );
        assert_eq!(
            DocumentKind::from_str_lossy("resume_tailored"),
            DocumentKind::Tailored
        );
        assert_eq!(
            DocumentKind::from_str_lossy("anything else"),
            DocumentKind::Original
        );
    }

    #[test]
    fn test_record_serializes_camel_case_and_omits_absent_fields() {
        let record = DocumentRecord {
            user_id: "demo".to_string(),
            document_id: "d-1".to_string(),
            kind: DocumentKind::Original,
            s3_key: "resumes/demo/file.txt".to_string(),
            content_type: "text/plain".to_string(),
            size: 50,
            created_at: 1_700_000_000,
            source_document_id: None,
            job_url: None,
            interests: None,
            url: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], "demo");
        assert_eq!(value["s3Key"], "resumes/demo/file.txt");
        assert_eq!(value["type"], "resume_original");
        assert!(value.get("sourceDocumentId").is_none());
        assert!(value.get("url").is_none());
    }
}
