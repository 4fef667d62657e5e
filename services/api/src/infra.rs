use async_trait::async_trait;
use chrono::NaiveDate;
use landlord_wizard::wizard::{CaseFacts, CaseId, FactsRepository, RepositoryError, SaveContext};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local facts store used by the HTTP service and the CLI demo.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFactsRepository {
    cases: Arc<Mutex<HashMap<CaseId, CaseFacts>>>,
}

impl InMemoryFactsRepository {
    pub(crate) fn len(&self) -> usize {
        self.cases.lock().map(|guard| guard.len()).unwrap_or_default()
    }
}

#[async_trait]
impl FactsRepository for InMemoryFactsRepository {
    async fn get_case_facts(&self, case_id: &CaseId) -> Result<Option<CaseFacts>, RepositoryError> {
        let guard = self
            .cases
            .lock()
            .map_err(|_| RepositoryError::Unavailable("facts store poisoned".to_string()))?;
        Ok(guard.get(case_id).cloned())
    }

    async fn save_case_facts(
        &self,
        case_id: &CaseId,
        facts: &CaseFacts,
        context: SaveContext,
    ) -> Result<(), RepositoryError> {
        let mut guard = self
            .cases
            .lock()
            .map_err(|_| RepositoryError::Unavailable("facts store poisoned".to_string()))?;
        guard.insert(case_id.clone(), facts.clone());
        debug!(
            case_id = %case_id,
            case_type = context.case_type,
            jurisdiction = context.jurisdiction.as_str(),
            "case facts stored"
        );
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
