use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::wizard::analytics::{AnalyticsEvent, AnalyticsSink, Attribution};
use crate::wizard::domain::{Jurisdiction, Product};
use crate::wizard::evidence::{EvidenceUpload, EvidenceUploader, UploadError};
use crate::wizard::facts::CaseFacts;
use crate::wizard::persistence::{CaseId, FactsRepository, RepositoryError, SaveContext};
use crate::wizard::session::{SessionOptions, WizardSession};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn case_id() -> CaseId {
    CaseId("case-1".to_string())
}

pub(super) fn facts(value: Value) -> CaseFacts {
    CaseFacts::from_value(value)
}

/// Two £1,000 rent periods with `first` and `second` left unpaid.
pub(super) fn arrears_items(first: f64, second: f64) -> Value {
    json!([
        {
            "period_start": "2026-08-01",
            "period_end": "2026-08-31",
            "rent_due": 1000,
            "rent_paid": 1000.0 - first
        },
        {
            "period_start": "2026-09-01",
            "period_end": "2026-09-30",
            "rent_due": 1000,
            "rent_paid": 1000.0 - second
        }
    ])
}

/// An English Section 8 case on grounds 8 and 10 that is ready for review.
pub(super) fn section8_case() -> CaseFacts {
    facts(json!({
        "eviction_route": "section_8",
        "landlord_full_name": "Priya Landlord",
        "landlord_address_line1": "1 High Street",
        "landlord_address_postcode": "M1 1AE",
        "tenant_full_name": "Sam Tenant",
        "property_address_line1": "22 Acacia Avenue",
        "property_address_postcode": "M14 5RT",
        "tenancy_start_date": "2024-01-01",
        "rent_amount": 1000,
        "rent_frequency": "monthly",
        "section8_grounds": ["8", "10"],
        "section8_particulars": "Rent unpaid since August 2026",
        "issues": { "rent_arrears": { "arrears_items": arrears_items(1000.0, 1000.0) } },
        "notice_served_date": "2026-10-01",
        "notice_service_method": "first_class_post",
        "notice_expiry_date": "2026-10-15"
    }))
}

/// A money claim for arrears only, complete apart from the court section.
pub(super) fn money_claim_case() -> CaseFacts {
    facts(json!({
        "landlord_full_name": "Priya Landlord",
        "landlord_address_line1": "1 High Street",
        "landlord_address_postcode": "M1 1AE",
        "tenant_full_name": "Sam Tenant",
        "defendant_address_line1": "9 New Road",
        "defendant_address_postcode": "M20 2AB",
        "property_address_line1": "22 Acacia Avenue",
        "property_address_postcode": "M14 5RT",
        "tenancy_start_date": "2024-01-01",
        "rent_amount": 1000,
        "rent_frequency": "monthly",
        "claiming_rent_arrears": true,
        "claiming_damages": false,
        "claiming_other": false,
        "issues": { "rent_arrears": { "arrears_items": arrears_items(1000.0, 500.0) } },
        "money_claim": {
            "letter_before_claim_sent": true,
            "letter_before_claim_date": "2026-08-01"
        }
    }))
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    cases: Mutex<HashMap<CaseId, CaseFacts>>,
    saves: Mutex<Vec<(CaseFacts, SaveContext)>>,
    attempts: AtomicUsize,
    failing_saves: AtomicBool,
    failing_loads: AtomicBool,
}

impl MemoryRepository {
    pub(super) fn with_case(case_id: CaseId, facts: CaseFacts) -> Self {
        let repository = Self::default();
        repository
            .cases
            .lock()
            .expect("cases lock")
            .insert(case_id, facts);
        repository
    }

    pub(super) fn fail_saves(&self, failing: bool) {
        self.failing_saves.store(failing, Ordering::SeqCst);
    }

    pub(super) fn fail_loads(&self, failing: bool) {
        self.failing_loads.store(failing, Ordering::SeqCst);
    }

    pub(super) fn saves(&self) -> Vec<(CaseFacts, SaveContext)> {
        self.saves.lock().expect("saves lock").clone()
    }

    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(super) fn last_saved(&self) -> Option<CaseFacts> {
        self.saves().last().map(|(facts, _)| facts.clone())
    }
}

#[async_trait]
impl FactsRepository for MemoryRepository {
    async fn get_case_facts(&self, case_id: &CaseId) -> Result<Option<CaseFacts>, RepositoryError> {
        if self.failing_loads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("load timed out".to_string()));
        }
        Ok(self.cases.lock().expect("cases lock").get(case_id).cloned())
    }

    async fn save_case_facts(
        &self,
        case_id: &CaseId,
        facts: &CaseFacts,
        context: SaveContext,
    ) -> Result<(), RepositoryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("save timed out".to_string()));
        }
        self.cases
            .lock()
            .expect("cases lock")
            .insert(case_id.clone(), facts.clone());
        self.saves
            .lock()
            .expect("saves lock")
            .push((facts.clone(), context));
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct RecordingAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingAnalytics {
    pub(super) fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn record(&self, event: AnalyticsEvent) {
        self.events.lock().expect("events lock").push(event);
    }
}

/// Upload service double. Each success returns every file stored so far, the
/// way the real endpoint returns the case's full list.
#[derive(Default)]
pub(super) struct ScriptedUploader {
    rejected: HashSet<String>,
    stored: Mutex<Vec<Value>>,
}

impl ScriptedUploader {
    pub(super) fn rejecting(filenames: &[&str]) -> Self {
        Self {
            rejected: filenames.iter().map(|name| name.to_string()).collect(),
            stored: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EvidenceUploader for ScriptedUploader {
    async fn upload(
        &self,
        _case_id: &CaseId,
        upload: &EvidenceUpload,
    ) -> Result<Vec<Value>, UploadError> {
        if self.rejected.contains(&upload.filename) {
            return Err(UploadError::Rejected {
                filename: upload.filename.clone(),
                reason: "file type not allowed".to_string(),
            });
        }
        let mut stored = self.stored.lock().expect("stored lock");
        stored.push(json!({
            "fileId": format!("file-{}", upload.filename),
            "fileName": upload.filename,
            "category": upload.category.as_str(),
            "uploadedAt": "2026-10-18T09:30:00Z",
            "contentType": upload.content_type(),
        }));
        Ok(stored.clone())
    }
}

pub(super) fn options() -> SessionOptions {
    SessionOptions {
        save_debounce: Duration::from_secs(60),
        attribution: Attribution {
            utm_source: Some("newsletter".to_string()),
            ..Attribution::default()
        },
        today: Some(today()),
    }
}

pub(super) async fn open_session(
    repository: Arc<MemoryRepository>,
    product: Product,
    jurisdiction: Jurisdiction,
    analytics: Arc<RecordingAnalytics>,
) -> WizardSession {
    WizardSession::load(repository, case_id(), product, jurisdiction, analytics, options()).await
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
