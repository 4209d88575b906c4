//! # Certificate Records
//!
//! The data that gets hashed into a registry key, and the metadata that is
//! stored alongside it on-chain.
//!
//! [`CertificateRecord`] holds only stable fields. Anything that changes
//! between issuance and verification (a wall-clock timestamp, say) would
//! make the certificate unverifiable, so the record deliberately has no
//! such field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::digest::{hash_certificate, CertificateHash};
use crate::error::{CanonicalizationError, ValidationError};

/// Grade recorded when none is supplied.
pub const DEFAULT_GRADE: &str = "N/A";

/// Institution recorded when none is supplied.
pub const DEFAULT_INSTITUTION: &str = "Unknown Institution";

/// Certificate type recorded for web-issued certificates.
pub const COURSE_COMPLETION: &str = "Course Completion";

/// Issuance channel recorded for web-issued certificates.
pub const ISSUED_VIA_WEB: &str = "Web Interface";

/// Issuance channel recorded for certificates issued from the command line.
pub const ISSUED_VIA_CLI: &str = "Command Line";

const REQUIRED_FIELDS: [&str; 3] = ["studentName", "courseName", "issueDate"];

/// `null`, `false`, zero or the empty string.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// A course-completion certificate.
///
/// Field order is significant: it is the order the fields are hashed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Name of the certificate holder.
    pub student_name: String,
    /// Name of the completed course.
    pub course_name: String,
    /// Issue date as entered by the issuer (free-form, hashed verbatim).
    pub issue_date: String,
    /// Grade, or [`DEFAULT_GRADE`].
    pub grade: String,
}

impl CertificateRecord {
    /// Build a record, substituting [`DEFAULT_GRADE`] for a missing or empty grade.
    ///
    /// Does not validate required fields; verification deliberately hashes
    /// whatever was submitted. Check
    /// [`CertificateDocument::require_record_fields`] before issuing.
    pub fn new(
        student_name: impl Into<String>,
        course_name: impl Into<String>,
        issue_date: impl Into<String>,
        grade: Option<String>,
    ) -> Self {
        let grade = grade
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| DEFAULT_GRADE.to_string());
        Self {
            student_name: student_name.into(),
            course_name: course_name.into(),
            issue_date: issue_date.into(),
            grade,
        }
    }

    /// Registry key for this record.
    pub fn hash(&self) -> Result<CertificateHash, CanonicalizationError> {
        hash_certificate(self)
    }
}

/// Metadata stored on-chain next to a certificate hash.
///
/// The three well-known fields come first; any extra keys follow in
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateMetadata {
    /// Issuing institution.
    pub institution: String,
    /// Kind of certificate, e.g. [`COURSE_COMPLETION`].
    pub certificate_type: String,
    /// Channel the certificate was issued through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_via: Option<String>,
    /// Additional issuer-defined fields (e.g. `validUntil`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CertificateMetadata {
    /// Course-completion metadata issued through `channel`.
    ///
    /// A missing or empty institution becomes [`DEFAULT_INSTITUTION`].
    pub fn issued_via(institution: Option<String>, channel: &str) -> Self {
        Self {
            institution: institution
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| DEFAULT_INSTITUTION.to_string()),
            certificate_type: COURSE_COMPLETION.to_string(),
            issued_via: Some(channel.to_string()),
            extra: Map::new(),
        }
    }

    /// Metadata for a certificate issued through the web interface.
    pub fn web(institution: Option<String>) -> Self {
        Self::issued_via(institution, ISSUED_VIA_WEB)
    }

    /// Metadata for a certificate issued from the command line.
    pub fn cli(institution: Option<String>) -> Self {
        Self::issued_via(institution, ISSUED_VIA_CLI)
    }

    /// Attach a field.
    ///
    /// `institution`, `certificateType` and `issuedVia` replace the matching
    /// well-known field instead of landing in [`extra`](Self::extra), so the
    /// stored JSON never carries a key twice. Non-string values for those
    /// keys are stored as their JSON text.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        let text = || match &value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match key.as_str() {
            "institution" => self.institution = text(),
            "certificateType" => self.certificate_type = text(),
            "issuedVia" => self.issued_via = Some(text()),
            _ => {
                self.extra.insert(key, value);
            }
        }
        self
    }

    /// Compact JSON string as stored in the contract.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// An arbitrary certificate document.
///
/// For certificates that carry more than the fixed record fields (credits,
/// instructor, ...). Hashed with the same canonical rules, so key order in
/// the source document is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateDocument(Map<String, Value>);

impl CertificateDocument {
    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Array(_) => Err(ValidationError::NotAnObject("array")),
            Value::String(_) => Err(ValidationError::NotAnObject("string")),
            Value::Number(_) => Err(ValidationError::NotAnObject("number")),
            Value::Bool(_) => Err(ValidationError::NotAnObject("boolean")),
            Value::Null => Err(ValidationError::NotAnObject("null")),
        }
    }

    /// The hashed document for a submitted certificate form.
    ///
    /// Takes `studentName`, `courseName` and `issueDate` in that order, then
    /// `grade`. A key that was not submitted is left out rather than hashed as
    /// an empty string, and values are hashed as they arrived, so a numeric
    /// grade stays a number. A grade that is absent, `null`, `false`, `0` or
    /// empty becomes [`DEFAULT_GRADE`]. Other submitted keys are ignored.
    pub fn from_submission(fields: &Map<String, Value>) -> Self {
        let mut map = Map::new();
        for key in REQUIRED_FIELDS {
            if let Some(value) = fields.get(key) {
                map.insert(key.into(), value.clone());
            }
        }
        let grade = fields
            .get("grade")
            .filter(|g| !is_empty_value(g))
            .cloned()
            .unwrap_or_else(|| DEFAULT_GRADE.into());
        map.insert("grade".into(), grade);
        Self(map)
    }

    /// Check that `studentName`, `courseName` and `issueDate` are present and
    /// not blank, listing every one that is.
    pub fn require_record_fields(&self) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .into_iter()
            .filter(|key| {
                self.0.get(*key).map_or(true, |v| {
                    is_empty_value(v) || v.as_str().is_some_and(|s| s.trim().is_empty())
                })
            })
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Start a document from a record, followed by additional fields.
    pub fn from_record(record: &CertificateRecord) -> Self {
        let mut map = Map::new();
        map.insert("studentName".into(), record.student_name.clone().into());
        map.insert("courseName".into(), record.course_name.clone().into());
        map.insert("issueDate".into(), record.issue_date.clone().into());
        map.insert("grade".into(), record.grade.clone().into());
        Self(map)
    }

    /// Append a field. Replacing an existing key keeps its original position.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Access the underlying fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Registry key for this document.
    pub fn hash(&self) -> Result<CertificateHash, CanonicalizationError> {
        hash_certificate(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> CertificateRecord {
        CertificateRecord::new(
            "John Doe",
            "Blockchain Development Fundamentals",
            "2024-01-15",
            Some("A+".to_string()),
        )
    }

    #[test]
    fn record_serializes_in_field_order() {
        let json = serde_json::to_string(&john()).unwrap();
        assert_eq!(
            json,
            r#"{"studentName":"John Doe","courseName":"Blockchain Development Fundamentals","issueDate":"2024-01-15","grade":"A+"}"#
        );
    }

    #[test]
    fn missing_grade_defaults_to_na() {
        let r = CertificateRecord::new("a", "b", "c", None);
        assert_eq!(r.grade, DEFAULT_GRADE);
        let r = CertificateRecord::new("a", "b", "c", Some(String::new()));
        assert_eq!(r.grade, DEFAULT_GRADE);
    }

    #[test]
    fn complete_record_has_required_fields() {
        assert!(CertificateDocument::from_record(&john())
            .require_record_fields()
            .is_ok());
    }

    #[test]
    fn required_fields_lists_every_blank_one() {
        let r = CertificateRecord::new("", "Rust", "  ", None);
        match CertificateDocument::from_record(&r).require_record_fields() {
            Err(ValidationError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["studentName", "issueDate"]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn record_hash_is_stable() {
        assert_eq!(
            john().hash().unwrap().to_hex(),
            "5cb59d400a1c3195c64aea1db6778bda8c0bb9827b14aaf4ba79d4ccf6ea40b5"
        );
    }

    #[test]
    fn different_student_gives_different_hash() {
        let mut other = john();
        other.student_name = "Jane Doe".into();
        assert_ne!(john().hash().unwrap(), other.hash().unwrap());
    }

    #[test]
    fn web_metadata_defaults() {
        let m = CertificateMetadata::web(None);
        assert_eq!(
            m.to_json_string().unwrap(),
            r#"{"institution":"Unknown Institution","certificateType":"Course Completion","issuedVia":"Web Interface"}"#
        );
    }

    #[test]
    fn metadata_extra_fields_follow_known_fields() {
        let m = CertificateMetadata {
            institution: "Blockchain Academy".into(),
            certificate_type: COURSE_COMPLETION.into(),
            issued_via: None,
            extra: Map::new(),
        }
        .with_field("validUntil", "2025-01-15");
        assert_eq!(
            m.to_json_string().unwrap(),
            r#"{"institution":"Blockchain Academy","certificateType":"Course Completion","validUntil":"2025-01-15"}"#
        );
    }

    #[test]
    fn document_from_record_hashes_like_record() {
        let doc = CertificateDocument::from_record(&john());
        assert_eq!(doc.hash().unwrap(), john().hash().unwrap());
    }

    #[test]
    fn document_with_extra_fields() {
        let doc = CertificateDocument::from_record(&john())
            .with_field("credits", 3)
            .with_field("instructor", "Prof. Smith");
        assert_eq!(
            doc.hash().unwrap().to_hex(),
            "c7593735053dd7ad6711ea4a2782494575c4a5e542a4a2daff4dbabbfa817a9d"
        );
    }

    #[test]
    fn metadata_known_keys_replace_typed_fields() {
        let m = CertificateMetadata::cli(None)
            .with_field("institution", "Blockchain Academy")
            .with_field("validUntil", "2025-01-15");
        assert_eq!(
            m.to_json_string().unwrap(),
            r#"{"institution":"Blockchain Academy","certificateType":"Course Completion","issuedVia":"Command Line","validUntil":"2025-01-15"}"#
        );
        assert!(m.extra.get("institution").is_none());

        let m = CertificateMetadata::web(None).with_field("certificateType", 7);
        assert_eq!(m.certificate_type, "7");
    }

    #[test]
    fn submission_with_string_fields_hashes_like_record() {
        let body = serde_json::json!({
            "grade": "A+",
            "issueDate": "2024-01-15",
            "courseName": "Blockchain Development Fundamentals",
            "studentName": "John Doe",
            "institution": "ignored"
        });
        let doc = CertificateDocument::from_submission(body.as_object().unwrap());
        assert_eq!(doc.hash().unwrap(), john().hash().unwrap());
    }

    #[test]
    fn submission_omits_absent_keys() {
        let body = serde_json::json!({
            "courseName": "Blockchain Development Fundamentals",
            "issueDate": "2024-01-15"
        });
        let doc = CertificateDocument::from_submission(body.as_object().unwrap());
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"courseName":"Blockchain Development Fundamentals","issueDate":"2024-01-15","grade":"N/A"}"#
        );
        assert_eq!(
            doc.hash().unwrap().to_hex(),
            "f43fda4f022d5c336139cb617c7db0a88340af146be77f832b63d0d8da92506f"
        );
        assert!(matches!(
            doc.require_record_fields(),
            Err(ValidationError::MissingFields(f)) if f == vec!["studentName"]
        ));
    }

    #[test]
    fn submission_keeps_value_types() {
        let body = serde_json::json!({
            "studentName": "John Doe",
            "courseName": "Rust",
            "issueDate": "2024-01-15",
            "grade": 95
        });
        let doc = CertificateDocument::from_submission(body.as_object().unwrap());
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"studentName":"John Doe","courseName":"Rust","issueDate":"2024-01-15","grade":95}"#
        );
        assert!(doc.require_record_fields().is_ok());

        for blank in [serde_json::json!(0), serde_json::json!(""), serde_json::json!(null)] {
            let body = serde_json::json!({"grade": blank});
            let doc = CertificateDocument::from_submission(body.as_object().unwrap());
            assert_eq!(doc.fields()["grade"], DEFAULT_GRADE);
        }
    }

    #[test]
    fn submission_blank_required_fields_are_missing() {
        let body = serde_json::json!({
            "studentName": null,
            "courseName": "  ",
            "issueDate": 0
        });
        let doc = CertificateDocument::from_submission(body.as_object().unwrap());
        assert!(matches!(
            doc.require_record_fields(),
            Err(ValidationError::MissingFields(f))
                if f == vec!["studentName", "courseName", "issueDate"]
        ));
    }

    #[test]
    fn document_rejects_non_object() {
        let err = CertificateDocument::from_value(serde_json::json!([1, 2])).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnObject("array")));
    }
}
