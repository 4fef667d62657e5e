//! Evidence uploads and the file list kept in facts.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::domain::normalize_token;
use super::facts::CaseFacts;
use super::persistence::CaseId;

/// Facts path holding the normalised evidence list.
pub const EVIDENCE_FILES_PATH: &str = "evidence.files";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    TenancyAgreement,
    RentStatement,
    NoticeServed,
    DepositCertificate,
    Correspondence,
    Photos,
    Other,
}

impl EvidenceCategory {
    /// Unrecognised categories are filed under `Other`.
    pub fn parse(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "tenancy_agreement" | "agreement" => Self::TenancyAgreement,
            "rent_statement" | "rent_ledger" | "arrears_schedule" => Self::RentStatement,
            "notice_served" | "notice" | "proof_of_service" => Self::NoticeServed,
            "deposit_certificate" | "deposit" => Self::DepositCertificate,
            "correspondence" | "letters" => Self::Correspondence,
            "photos" | "photo" | "images" => Self::Photos,
            _ => Self::Other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TenancyAgreement => "tenancy_agreement",
            Self::RentStatement => "rent_statement",
            Self::NoticeServed => "notice_served",
            Self::DepositCertificate => "deposit_certificate",
            Self::Correspondence => "correspondence",
            Self::Photos => "photos",
            Self::Other => "other",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TenancyAgreement => "Tenancy agreement",
            Self::RentStatement => "Rent statement",
            Self::NoticeServed => "Proof of notice service",
            Self::DepositCertificate => "Deposit protection certificate",
            Self::Correspondence => "Correspondence",
            Self::Photos => "Photos",
            Self::Other => "Other documents",
        }
    }
}

/// One stored evidence file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceFile {
    pub id: String,
    pub filename: String,
    pub category: EvidenceCategory,
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl EvidenceFile {
    /// Normalise an upload-service record. Key spellings vary between
    /// endpoints, so `fileId`/`file_id`, `fileName`/`name` and
    /// `uploadedAt`/`created_at` are all accepted. Records without an id are
    /// dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = first_text(object, &["id", "file_id", "fileId"])?;
        let filename = first_text(object, &["filename", "file_name", "fileName", "name"])
            .unwrap_or_else(|| id.clone());
        let category = first_text(object, &["category", "evidence_category"])
            .map(|raw| EvidenceCategory::parse(&raw))
            .unwrap_or(EvidenceCategory::Other);
        let uploaded_at = first_text(object, &["uploaded_at", "uploadedAt", "created_at"])
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|stamp| stamp.with_timezone(&Utc));
        let content_type = first_text(object, &["content_type", "contentType", "mime_type"]);

        Some(Self {
            id,
            filename,
            category,
            uploaded_at,
            content_type,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "id": self.id,
            "filename": self.filename,
            "category": self.category.as_str(),
            "uploaded_at": self.uploaded_at.map(|stamp| stamp.to_rfc3339()),
        });
        if let (Some(content_type), Value::Object(map)) = (&self.content_type, &mut value) {
            map.insert("content_type".to_string(), json!(content_type));
        }
        value
    }

    pub fn list_from_facts(facts: &CaseFacts) -> Vec<Self> {
        facts
            .array(EVIDENCE_FILES_PATH)
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }
}

fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// A file waiting to be sent to the upload service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceUpload {
    pub question_id: String,
    pub category: EvidenceCategory,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl EvidenceUpload {
    pub fn new(
        question_id: impl Into<String>,
        category: EvidenceCategory,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            category,
            filename: filename.into(),
            bytes,
        }
    }

    /// MIME type guessed from the file extension.
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("upload of {filename} was rejected: {reason}")]
    Rejected { filename: String, reason: String },
    #[error("upload service unavailable: {0}")]
    Transport(String),
}

/// One request per file; the response is the case's updated file list in
/// whatever shape the service returns.
#[async_trait]
pub trait EvidenceUploader: Send + Sync {
    async fn upload(&self, case_id: &CaseId, upload: &EvidenceUpload)
        -> Result<Vec<Value>, UploadError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    pub filename: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failures: BTreeMap<EvidenceCategory, Vec<UploadFailure>>,
}

impl UploadReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failures_for(&self, category: EvidenceCategory) -> &[UploadFailure] {
        self.failures
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The case's evidence list, deduplicated by file id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceLedger {
    files: Vec<EvidenceFile>,
}

impl EvidenceLedger {
    pub fn from_facts(facts: &CaseFacts) -> Self {
        let mut ledger = Self::default();
        ledger.merge(EvidenceFile::list_from_facts(facts));
        ledger
    }

    pub fn files(&self) -> &[EvidenceFile] {
        &self.files
    }

    pub fn by_category(&self, category: EvidenceCategory) -> impl Iterator<Item = &EvidenceFile> {
        self.files.iter().filter(move |file| file.category == category)
    }

    /// Add files, replacing any already held under the same id.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = EvidenceFile>) {
        for file in incoming {
            match self.files.iter_mut().find(|existing| existing.id == file.id) {
                Some(existing) => *existing = file,
                None => self.files.push(file),
            }
        }
    }

    /// Upload files one at a time. A failed file is recorded against its
    /// category and the remaining files are still sent.
    pub async fn upload_all<U>(
        &mut self,
        uploader: &U,
        case_id: &CaseId,
        uploads: Vec<EvidenceUpload>,
    ) -> UploadReport
    where
        U: EvidenceUploader + ?Sized,
    {
        let mut report = UploadReport::default();

        for upload in uploads {
            match uploader.upload(case_id, &upload).await {
                Ok(records) => {
                    let files: Vec<EvidenceFile> =
                        records.iter().filter_map(EvidenceFile::from_value).collect();
                    info!(
                        case_id = %case_id,
                        filename = %upload.filename,
                        category = upload.category.as_str(),
                        files = files.len(),
                        "evidence uploaded"
                    );
                    self.merge(files);
                    report.uploaded.push(upload.filename);
                }
                Err(error) => {
                    warn!(
                        case_id = %case_id,
                        filename = %upload.filename,
                        error = %error,
                        "evidence upload failed"
                    );
                    report
                        .failures
                        .entry(upload.category)
                        .or_default()
                        .push(UploadFailure {
                            filename: upload.filename,
                            message: error.to_string(),
                        });
                }
            }
        }

        report
    }

    pub fn to_facts_patch(&self) -> Value {
        let files: Vec<Value> = self.files.iter().map(EvidenceFile::to_value).collect();
        json!({ "evidence": { "files": files } })
    }
}
