//! Section rule tables.
//!
//! Each wizard step is a [`SectionId`]. Its completion, blocker, warning and
//! visibility rules are dispatched with a `match`, so adding a section forces
//! every rule to account for it. Rules are total over arbitrary facts: a
//! missing or malformed answer reads as "not yet answered".

mod common;
mod compliance;
mod eviction;
mod money_claim;
mod tables;
mod tenancy_agreement;

pub(crate) use tables::progress_percent;
pub use tables::{SectionEvaluation, SectionTable, WizardReport};

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{normalize_token, Jurisdiction, Product, Route};
use super::facts::CaseFacts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    CaseBasics,
    Parties,
    Claimant,
    Defendant,
    Property,
    Tenancy,
    Section21Compliance,
    WalesCompliance,
    Section8Grounds,
    WalesGrounds,
    ScotlandGrounds,
    ClaimType,
    Arrears,
    Damages,
    OtherCharges,
    PreAction,
    Deposit,
    Notice,
    Evidence,
    Court,
    Review,
}

impl SectionId {
    pub const ALL: [Self; 21] = [
        Self::CaseBasics,
        Self::Parties,
        Self::Claimant,
        Self::Defendant,
        Self::Property,
        Self::Tenancy,
        Self::Section21Compliance,
        Self::WalesCompliance,
        Self::Section8Grounds,
        Self::WalesGrounds,
        Self::ScotlandGrounds,
        Self::ClaimType,
        Self::Arrears,
        Self::Damages,
        Self::OtherCharges,
        Self::PreAction,
        Self::Deposit,
        Self::Notice,
        Self::Evidence,
        Self::Court,
        Self::Review,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CaseBasics => "case_basics",
            Self::Parties => "parties",
            Self::Claimant => "claimant",
            Self::Defendant => "defendant",
            Self::Property => "property",
            Self::Tenancy => "tenancy",
            Self::Section21Compliance => "section21_compliance",
            Self::WalesCompliance => "wales_compliance",
            Self::Section8Grounds => "section8_grounds",
            Self::WalesGrounds => "wales_grounds",
            Self::ScotlandGrounds => "scotland_grounds",
            Self::ClaimType => "claim_type",
            Self::Arrears => "arrears",
            Self::Damages => "damages",
            Self::OtherCharges => "other_charges",
            Self::PreAction => "pre_action",
            Self::Deposit => "deposit",
            Self::Notice => "notice",
            Self::Evidence => "evidence",
            Self::Court => "court",
            Self::Review => "review",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let token = normalize_token(raw);
        Self::ALL.into_iter().find(|id| id.as_str() == token)
    }

    /// Whether the section is finished. The review section is judged by
    /// [`SectionTable`], which can see every other section.
    pub fn is_complete(self, facts: &CaseFacts, ctx: &RuleContext) -> bool {
        match self {
            Self::CaseBasics => eviction::case_basics_complete(facts, ctx),
            Self::Parties => common::parties_complete(facts),
            Self::Claimant => money_claim::claimant_complete(facts),
            Self::Defendant => money_claim::defendant_complete(facts),
            Self::Property => common::property_complete(facts),
            Self::Tenancy => common::tenancy_complete(facts, ctx),
            Self::Section21Compliance => compliance::section21_complete(facts, ctx),
            Self::WalesCompliance => compliance::wales_complete(facts, ctx),
            Self::Section8Grounds => eviction::section8_grounds_complete(facts),
            Self::WalesGrounds => eviction::wales_grounds_complete(facts),
            Self::ScotlandGrounds => eviction::scotland_grounds_complete(facts),
            Self::ClaimType => money_claim::claim_type_complete(facts),
            Self::Arrears => common::arrears_complete(facts, ctx),
            Self::Damages => money_claim::damages_complete(facts),
            Self::OtherCharges => money_claim::other_charges_complete(facts),
            Self::PreAction => money_claim::pre_action_complete(facts),
            Self::Deposit => tenancy_agreement::deposit_complete(facts, ctx),
            Self::Notice => eviction::notice_complete(facts, ctx),
            Self::Evidence => common::evidence_complete(facts),
            Self::Court => common::court_complete(facts, ctx),
            Self::Review => false,
        }
    }

    /// Conditions that prevent leaving the section.
    pub fn blockers(self, facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
        match self {
            Self::CaseBasics => eviction::case_basics_blockers(facts, ctx),
            Self::Tenancy => common::tenancy_blockers(facts, ctx),
            Self::Section21Compliance => compliance::section21_blockers(facts, ctx),
            Self::WalesCompliance => compliance::wales_blockers(facts, ctx),
            Self::ClaimType => money_claim::claim_type_blockers(facts),
            Self::Arrears => common::arrears_blockers(facts, ctx),
            Self::PreAction => money_claim::pre_action_blockers(facts),
            Self::Deposit => tenancy_agreement::deposit_blockers(facts, ctx),
            Self::Notice => eviction::notice_blockers(facts, ctx),
            Self::Court => common::court_blockers(facts, ctx),
            Self::Parties
            | Self::Claimant
            | Self::Defendant
            | Self::Property
            | Self::Section8Grounds
            | Self::WalesGrounds
            | Self::ScotlandGrounds
            | Self::Damages
            | Self::OtherCharges
            | Self::Evidence
            | Self::Review => Vec::new(),
        }
    }

    /// Non-blocking risk disclosures.
    pub fn warnings(self, facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
        match self {
            Self::Parties => common::parties_warnings(facts),
            Self::Defendant => money_claim::defendant_warnings(facts, ctx),
            Self::Property => common::property_warnings(facts),
            Self::Tenancy => common::tenancy_warnings(facts, ctx),
            Self::Section21Compliance | Self::WalesCompliance => {
                compliance::deposit_warnings(facts, ctx)
            }
            Self::Section8Grounds => eviction::section8_grounds_warnings(facts),
            Self::WalesGrounds => eviction::wales_grounds_warnings(facts),
            Self::ScotlandGrounds => eviction::scotland_grounds_warnings(facts),
            Self::Arrears => common::arrears_warnings(facts, ctx),
            Self::Damages => money_claim::damages_warnings(facts),
            Self::OtherCharges => money_claim::other_charges_warnings(facts),
            Self::PreAction => money_claim::pre_action_warnings(facts, ctx),
            Self::Deposit => tenancy_agreement::deposit_warnings(facts, ctx),
            Self::Notice => eviction::notice_warnings(facts, ctx),
            Self::Evidence => common::evidence_warnings(facts, ctx),
            Self::Court => common::court_warnings(facts, ctx),
            Self::CaseBasics | Self::Claimant | Self::ClaimType | Self::Review => Vec::new(),
        }
    }

    /// Fact-dependent visibility on top of route and jurisdiction filters.
    fn is_relevant(self, facts: &CaseFacts, ctx: &RuleContext) -> bool {
        match self {
            Self::Arrears => common::arrears_relevant(facts, ctx),
            Self::Damages => money_claim::claiming(facts, money_claim::CLAIMING_DAMAGES),
            Self::OtherCharges => money_claim::claiming(facts, money_claim::CLAIMING_OTHER),
            _ => true,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a rule needs besides the facts themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    pub product: Product,
    pub jurisdiction: Jurisdiction,
    pub today: NaiveDate,
}

impl RuleContext {
    pub fn new(product: Product, jurisdiction: Jurisdiction, today: NaiveDate) -> Self {
        Self {
            product,
            jurisdiction,
            today,
        }
    }

    pub fn route(&self, facts: &CaseFacts) -> Option<Route> {
        facts.route(self.jurisdiction)
    }
}

/// Static description of one wizard step within a product table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDescriptor {
    pub id: SectionId,
    pub label: &'static str,
    pub description: &'static str,
    pub routes: Option<&'static [Route]>,
    pub jurisdictions: Option<&'static [Jurisdiction]>,
}

impl SectionDescriptor {
    pub const fn new(id: SectionId, label: &'static str, description: &'static str) -> Self {
        Self {
            id,
            label,
            description,
            routes: None,
            jurisdictions: None,
        }
    }

    pub const fn for_routes(mut self, routes: &'static [Route]) -> Self {
        self.routes = Some(routes);
        self
    }

    pub const fn in_jurisdictions(mut self, jurisdictions: &'static [Jurisdiction]) -> Self {
        self.jurisdictions = Some(jurisdictions);
        self
    }

    /// Route-gated sections stay hidden until a route valid for the
    /// jurisdiction has been chosen.
    pub fn is_visible(&self, facts: &CaseFacts, ctx: &RuleContext) -> bool {
        if let Some(jurisdictions) = self.jurisdictions {
            if !jurisdictions.contains(&ctx.jurisdiction) {
                return false;
            }
        }

        if let Some(routes) = self.routes {
            match ctx.route(facts) {
                Some(route) if routes.contains(&route) => {}
                _ => return false,
            }
        }

        self.id.is_relevant(facts, ctx)
    }
}
