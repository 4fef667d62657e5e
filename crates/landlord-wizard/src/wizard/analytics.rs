//! Fire-and-forget wizard step events.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Jurisdiction, Product};
use super::sections::SectionId;

/// Campaign attribution captured when the case was started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub landing_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEvent {
    pub jurisdiction: Jurisdiction,
    pub product: Product,
    pub step_id: SectionId,
    pub step_index: usize,
    pub total_steps: usize,
    #[serde(flatten)]
    pub attribution: Attribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    StepCompleted(StepEvent),
    SectionSkipped(StepEvent),
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StepCompleted(_) => "wizard_step_completed",
            Self::SectionSkipped(_) => "wizard_section_skipped",
        }
    }

    pub fn step(&self) -> &StepEvent {
        match self {
            Self::StepCompleted(step) | Self::SectionSkipped(step) => step,
        }
    }
}

/// Event delivery must never block navigation, so sinks are synchronous and
/// infallible from the caller's point of view.
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: AnalyticsEvent);
}

/// Emits events as structured log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn record(&self, event: AnalyticsEvent) {
        let step = event.step();
        info!(
            event = event.name(),
            jurisdiction = step.jurisdiction.as_str(),
            product = step.product.as_str(),
            step_id = step.step_id.as_str(),
            step_index = step.step_index,
            total_steps = step.total_steps,
            utm_source = step.attribution.utm_source.as_deref().unwrap_or(""),
            utm_campaign = step.attribution.utm_campaign.as_deref().unwrap_or(""),
            "wizard analytics"
        );
    }
}
