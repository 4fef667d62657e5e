//! One user's pass through the wizard for one case.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::analytics::{AnalyticsEvent, AnalyticsSink, Attribution, StepEvent};
use super::domain::{Jurisdiction, Product};
use super::evidence::{EvidenceLedger, EvidenceUpload, EvidenceUploader, UploadReport};
use super::facts::CaseFacts;
use super::flow::{FlowController, FlowSnapshot, NavigationError, StepOutcome};
use super::navigation::{resolve_section, NavigateRequest};
use super::persistence::{CaseId, FactsRepository, SaveContext, SaveError, SaveQueue, SaveStatus};
use super::sections::{SectionId, SectionTable, WizardReport};
use crate::config::WizardConfig;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Host page visibility, as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVisibility {
    Visible,
    Hidden,
}

/// Where the user goes once the wizard is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionHandoff {
    pub case_id: CaseId,
    pub product: Product,
    pub jurisdiction: Jurisdiction,
    pub case_type: &'static str,
    pub redirect_path: String,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub save_debounce: Duration,
    pub attribution: Attribution,
    /// Fixed evaluation date; the local date is used when unset.
    pub today: Option<NaiveDate>,
}

impl SessionOptions {
    pub fn from_config(config: &WizardConfig) -> Self {
        Self {
            save_debounce: config.save_debounce(),
            ..Self::default()
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            save_debounce: WizardConfig::default().save_debounce(),
            attribution: Attribution::default(),
            today: None,
        }
    }
}

pub struct WizardSession {
    case_id: CaseId,
    product: Product,
    jurisdiction: Jurisdiction,
    facts: CaseFacts,
    flow: FlowController,
    saves: SaveQueue,
    evidence: EvidenceLedger,
    analytics: Arc<dyn AnalyticsSink>,
    attribution: Attribution,
    today: Option<NaiveDate>,
}

impl WizardSession {
    /// Load persisted facts and open the first visible section. A failed load
    /// is logged and the session starts from empty facts.
    pub async fn load<R>(
        repository: Arc<R>,
        case_id: CaseId,
        product: Product,
        jurisdiction: Jurisdiction,
        analytics: Arc<dyn AnalyticsSink>,
        options: SessionOptions,
    ) -> Self
    where
        R: FactsRepository + ?Sized + 'static,
    {
        let mut facts = match repository.get_case_facts(&case_id).await {
            Ok(Some(facts)) => facts,
            Ok(None) => CaseFacts::new(),
            Err(error) => {
                warn!(
                    case_id = %case_id,
                    error = %error,
                    "failed to load case facts; starting empty"
                );
                CaseFacts::new()
            }
        };
        facts.set_meta(product, jurisdiction);

        let saves = SaveQueue::spawn(
            repository,
            case_id.clone(),
            SaveContext::new(product, jurisdiction),
            options.save_debounce,
        );

        let mut session = Self {
            case_id,
            product,
            jurisdiction,
            evidence: EvidenceLedger::from_facts(&facts),
            flow: FlowController::new(SectionTable::for_product(product, jurisdiction)),
            facts,
            saves,
            analytics,
            attribution: options.attribution,
            today: options.today,
        };
        let today = session.today();
        session.flow.start(&session.facts, today);
        info!(
            case_id = %session.case_id,
            product = product.as_str(),
            jurisdiction = jurisdiction.as_str(),
            sections = session.flow.visible().len(),
            "wizard session started"
        );
        session
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    pub fn facts(&self) -> &CaseFacts {
        &self.facts
    }

    pub fn flow(&self) -> &FlowController {
        &self.flow
    }

    pub fn current_section(&self) -> Option<SectionId> {
        self.flow.current()
    }

    pub fn evidence(&self) -> &EvidenceLedger {
        &self.evidence
    }

    pub fn save_status(&self) -> SaveStatus {
        self.saves.status()
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Merge a partial update, schedule a save and re-evaluate visibility.
    /// In-memory facts are kept even if later saves fail.
    pub fn update(&mut self, patch: &Value) -> Result<(), SessionError> {
        self.facts.merge_value(patch);
        self.saves.schedule(self.facts.clone())?;
        let today = self.today();
        self.flow.refresh(&self.facts, today);
        Ok(())
    }

    pub fn next(&mut self) -> Result<SectionId, SessionError> {
        let today = self.today();
        let outcome = self.flow.next(&self.facts, today)?;
        self.record_step(&outcome);
        Ok(outcome.to)
    }

    pub fn back(&mut self) -> Result<SectionId, SessionError> {
        Ok(self.flow.back()?)
    }

    pub fn jump_to(&mut self, section: SectionId) -> Result<SectionId, SessionError> {
        Ok(self.flow.jump_to(section)?)
    }

    /// Handle a `wizard:navigate` request naming a section loosely.
    pub fn handle_navigate(
        &mut self,
        request: &NavigateRequest,
    ) -> Result<SectionId, SessionError> {
        let target = resolve_section(self.product, &request.section, self.flow.visible())
            .ok_or_else(|| NavigationError::UnknownSection(request.section.clone()))?;
        debug!(
            case_id = %self.case_id,
            requested = %request.section,
            section = %target,
            "navigate request"
        );
        self.jump_to(target)
    }

    /// Hiding the page saves immediately instead of waiting for the debounce.
    pub async fn on_visibility_change(
        &mut self,
        visibility: PageVisibility,
    ) -> Result<(), SessionError> {
        match visibility {
            PageVisibility::Hidden => Ok(self.saves.flush().await?),
            PageVisibility::Visible => Ok(()),
        }
    }

    pub async fn flush(&self) -> Result<(), SessionError> {
        Ok(self.saves.flush().await?)
    }

    pub async fn retry_save(&self) -> Result<(), SessionError> {
        Ok(self.saves.retry().await?)
    }

    /// Finish from the review section. Pending saves are flushed before the
    /// handoff is returned.
    pub async fn complete(&mut self) -> Result<CompletionHandoff, SessionError> {
        let today = self.today();
        self.flow.ready_to_complete(&self.facts, today)?;
        self.saves.flush().await?;
        self.flow.complete(&self.facts, today)?;

        info!(case_id = %self.case_id, product = self.product.as_str(), "wizard completed");
        Ok(CompletionHandoff {
            case_id: self.case_id.clone(),
            product: self.product,
            jurisdiction: self.jurisdiction,
            case_type: self.product.case_type(),
            redirect_path: format!(
                "/wizard/preview/{}?product={}",
                self.case_id,
                self.product.as_str()
            ),
        })
    }

    /// Upload evidence files one by one and record the merged file list in facts.
    pub async fn attach_evidence<U>(
        &mut self,
        uploader: &U,
        uploads: Vec<EvidenceUpload>,
    ) -> Result<UploadReport, SessionError>
    where
        U: EvidenceUploader + ?Sized,
    {
        let report = self
            .evidence
            .upload_all(uploader, &self.case_id, uploads)
            .await;
        let patch = self.evidence.to_facts_patch();
        self.update(&patch)?;
        Ok(report)
    }

    pub fn report(&self) -> WizardReport {
        self.flow.table().evaluate(&self.facts, self.today())
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        self.flow.snapshot(&self.facts, self.today())
    }

    /// Flush outstanding saves and stop the save actor.
    pub async fn close(self) -> Result<(), SessionError> {
        Ok(self.saves.shutdown().await?)
    }

    fn record_step(&self, outcome: &StepOutcome) {
        let step = StepEvent {
            jurisdiction: self.jurisdiction,
            product: self.product,
            step_id: outcome.from,
            step_index: outcome.from_index,
            total_steps: outcome.total,
            attribution: self.attribution.clone(),
        };
        if outcome.first_completion {
            self.analytics.record(AnalyticsEvent::StepCompleted(step));
        } else if !outcome.was_complete {
            self.analytics.record(AnalyticsEvent::SectionSkipped(step));
        }
    }
}
