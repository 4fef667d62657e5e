//! Landlord document wizard: case facts, per-section rule tables, navigation
//! and debounced persistence.

pub mod analytics;
pub mod arrears;
pub mod calculators;
pub mod domain;
pub mod evidence;
pub mod facts;
pub mod flow;
pub mod navigation;
pub mod persistence;
pub mod reference;
pub mod router;
pub mod sections;
pub mod session;

#[cfg(test)]
mod tests;

pub use analytics::{AnalyticsEvent, AnalyticsSink, Attribution, StepEvent, TracingAnalytics};
pub use arrears::{ArrearsImportError, ArrearsItem, ArrearsSchedule};
pub use calculators::{
    deposit_cap, suggest_notice_expiry, validate_ground8_eligibility, DepositCap,
    Ground8Assessment, NoticeSuggestion, SixMonthRule,
};
pub use domain::{Answer, Jurisdiction, Pence, Product, RentFrequency, Route};
pub use evidence::{
    EvidenceCategory, EvidenceFile, EvidenceLedger, EvidenceUpload, EvidenceUploader,
    UploadError, UploadReport,
};
pub use facts::CaseFacts;
pub use flow::{FlowController, FlowSnapshot, FlowState, NavigationError, StepOutcome};
pub use navigation::{resolve_section, NavigateRequest, NAVIGATE_EVENT};
pub use persistence::{
    CaseId, FactsRepository, RepositoryError, SaveContext, SaveError, SaveQueue, SaveStatus,
};
pub use router::{wizard_router, WizardRequestError};
pub use sections::{RuleContext, SectionEvaluation, SectionId, SectionTable, WizardReport};
pub use session::{
    CompletionHandoff, PageVisibility, SessionError, SessionOptions, WizardSession,
};
