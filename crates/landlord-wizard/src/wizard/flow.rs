//! Section-to-section navigation over the visible section list.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::facts::CaseFacts;
use super::sections::{SectionId, SectionTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Loading,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("the wizard has not finished loading")]
    NotStarted,
    #[error("the wizard has already been completed")]
    AlreadyCompleted,
    #[error("{section} has {} unresolved issue(s)", .blockers.len())]
    Blocked {
        section: SectionId,
        blockers: Vec<String>,
    },
    #[error("already at the last section")]
    AtEnd,
    #[error("already at the first section")]
    AtStart,
    #[error("section {0} is not available for this case")]
    NotVisible(SectionId),
    #[error("no section called '{0}'")]
    UnknownSection(String),
    #[error("the wizard can only be completed from the review section, not {0}")]
    NotOnReview(SectionId),
    #[error("sections still incomplete: {}", format_sections(.0))]
    Incomplete(Vec<SectionId>),
}

fn format_sections(sections: &[SectionId]) -> String {
    sections
        .iter()
        .map(|section| section.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of a successful `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub from: SectionId,
    pub from_index: usize,
    pub to: SectionId,
    pub total: usize,
    pub was_complete: bool,
    /// True the first time this section is left complete in the session.
    pub first_completion: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSnapshot {
    pub state: FlowState,
    pub current: Option<SectionId>,
    pub index: usize,
    pub visible: Vec<SectionId>,
    pub progress_percent: u8,
    pub blockers: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FlowController {
    table: SectionTable,
    state: FlowState,
    visible: Vec<SectionId>,
    current: usize,
    completed_steps: HashSet<SectionId>,
}

impl FlowController {
    pub fn new(table: SectionTable) -> Self {
        Self {
            table,
            state: FlowState::Loading,
            visible: Vec::new(),
            current: 0,
            completed_steps: HashSet::new(),
        }
    }

    pub fn table(&self) -> &SectionTable {
        &self.table
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn visible(&self) -> &[SectionId] {
        &self.visible
    }

    pub fn current(&self) -> Option<SectionId> {
        match self.state {
            FlowState::Loading => None,
            _ => self.visible.get(self.current).copied(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Leave the loading state once facts are available.
    pub fn start(&mut self, facts: &CaseFacts, today: NaiveDate) {
        self.visible = self.table.visible_sections(facts, today);
        self.current = 0;
        self.state = FlowState::Active;
    }

    /// Recompute visibility after facts change. The current section is kept
    /// when it is still visible; otherwise the index is clamped.
    pub fn refresh(&mut self, facts: &CaseFacts, today: NaiveDate) {
        if self.state == FlowState::Loading {
            return;
        }
        let current = self.visible.get(self.current).copied();
        self.visible = self.table.visible_sections(facts, today);
        self.current = match current.and_then(|id| self.position(id)) {
            Some(index) => index,
            None => self.current.min(self.visible.len().saturating_sub(1)),
        };
    }

    pub fn next(
        &mut self,
        facts: &CaseFacts,
        today: NaiveDate,
    ) -> Result<StepOutcome, NavigationError> {
        let from = self.active_section()?;
        let blockers = self.table.blockers(from, facts, today);
        if !blockers.is_empty() {
            return Err(NavigationError::Blocked {
                section: from,
                blockers,
            });
        }
        if self.current + 1 >= self.visible.len() {
            return Err(NavigationError::AtEnd);
        }

        let was_complete = self.table.is_complete(from, facts, today);
        let first_completion = was_complete && self.completed_steps.insert(from);
        let from_index = self.current;
        self.current += 1;

        Ok(StepOutcome {
            from,
            from_index,
            to: self.visible[self.current],
            total: self.visible.len(),
            was_complete,
            first_completion,
        })
    }

    pub fn back(&mut self) -> Result<SectionId, NavigationError> {
        self.active_section()?;
        if self.current == 0 {
            return Err(NavigationError::AtStart);
        }
        self.current -= 1;
        Ok(self.visible[self.current])
    }

    pub fn jump_to(&mut self, id: SectionId) -> Result<SectionId, NavigationError> {
        self.active_section()?;
        let index = self.position(id).ok_or(NavigationError::NotVisible(id))?;
        self.current = index;
        Ok(id)
    }

    /// Finish the wizard. Only valid on a complete, unblocked review section.
    pub fn complete(&mut self, facts: &CaseFacts, today: NaiveDate) -> Result<(), NavigationError> {
        self.ready_to_complete(facts, today)?;
        self.state = FlowState::Completed;
        Ok(())
    }

    pub fn ready_to_complete(
        &self,
        facts: &CaseFacts,
        today: NaiveDate,
    ) -> Result<(), NavigationError> {
        let current = self.active_section()?;
        if current != SectionId::Review {
            return Err(NavigationError::NotOnReview(current));
        }
        let blockers = self.table.blockers(SectionId::Review, facts, today);
        if !blockers.is_empty() {
            return Err(NavigationError::Blocked {
                section: SectionId::Review,
                blockers,
            });
        }
        let incomplete: Vec<SectionId> = self
            .visible
            .iter()
            .copied()
            .filter(|id| *id != SectionId::Review && !self.table.is_complete(*id, facts, today))
            .collect();
        if !incomplete.is_empty() {
            return Err(NavigationError::Incomplete(incomplete));
        }
        Ok(())
    }

    pub fn progress(&self, facts: &CaseFacts, today: NaiveDate) -> u8 {
        let completed = self
            .visible
            .iter()
            .filter(|id| self.table.is_complete(**id, facts, today))
            .count();
        super::sections::progress_percent(completed, self.visible.len())
    }

    pub fn snapshot(&self, facts: &CaseFacts, today: NaiveDate) -> FlowSnapshot {
        let current = self.current();
        FlowSnapshot {
            state: self.state,
            current,
            index: self.current,
            visible: self.visible.clone(),
            progress_percent: self.progress(facts, today),
            blockers: current
                .map(|id| self.table.blockers(id, facts, today))
                .unwrap_or_default(),
            warnings: current
                .map(|id| self.table.warnings(id, facts, today))
                .unwrap_or_default(),
        }
    }

    fn position(&self, id: SectionId) -> Option<usize> {
        self.visible.iter().position(|visible| *visible == id)
    }

    fn active_section(&self) -> Result<SectionId, NavigationError> {
        match self.state {
            FlowState::Loading => Err(NavigationError::NotStarted),
            FlowState::Completed => Err(NavigationError::AlreadyCompleted),
            FlowState::Active => self
                .visible
                .get(self.current)
                .copied()
                .ok_or(NavigationError::NotStarted),
        }
    }
}
