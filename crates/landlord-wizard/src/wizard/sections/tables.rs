use chrono::NaiveDate;
use serde::Serialize;

use super::{RuleContext, SectionDescriptor, SectionId};
use crate::wizard::domain::{Jurisdiction, Product, Route};
use crate::wizard::facts::CaseFacts;

const SECTION_21: &[Route] = &[Route::Section21];
const SECTION_8: &[Route] = &[Route::Section8];
const SECTION_173: &[Route] = &[Route::Section173];
const FAULT_BASED: &[Route] = &[Route::FaultBased];
const NOTICE_TO_LEAVE: &[Route] = &[Route::NoticeToLeave];
const GROUNDS_BASED: &[Route] = &[Route::Section8, Route::FaultBased, Route::NoticeToLeave];
const ENGLAND_AND_WALES: &[Jurisdiction] = &[Jurisdiction::England, Jurisdiction::Wales];

/// Ordered section list for one product in one jurisdiction.
#[derive(Debug, Clone)]
pub struct SectionTable {
    product: Product,
    jurisdiction: Jurisdiction,
    sections: Vec<SectionDescriptor>,
}

/// Result of evaluating one section against the current facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionEvaluation {
    pub id: SectionId,
    pub label: &'static str,
    pub visible: bool,
    pub complete: bool,
    pub blockers: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardReport {
    pub product: Product,
    pub jurisdiction: Jurisdiction,
    pub route: Option<Route>,
    pub sections: Vec<SectionEvaluation>,
    pub visible: Vec<SectionId>,
    pub completed: usize,
    pub progress_percent: u8,
}

impl WizardReport {
    pub fn section(&self, id: SectionId) -> Option<&SectionEvaluation> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn is_visible(&self, id: SectionId) -> bool {
        self.visible.contains(&id)
    }
}

impl SectionTable {
    pub fn for_product(product: Product, jurisdiction: Jurisdiction) -> Self {
        let sections = match product {
            Product::NoticeOnly => eviction_sections(false),
            Product::CompletePack => eviction_sections(true),
            Product::MoneyClaim => money_claim_sections(),
            Product::TenancyAgreement => tenancy_agreement_sections(),
        };
        Self {
            product,
            jurisdiction,
            sections,
        }
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn jurisdiction(&self) -> Jurisdiction {
        self.jurisdiction
    }

    pub fn descriptors(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    pub fn descriptor(&self, id: SectionId) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn context(&self, today: NaiveDate) -> RuleContext {
        RuleContext::new(self.product, self.jurisdiction, today)
    }

    /// Sections the user can currently reach, in table order.
    pub fn visible_sections(&self, facts: &CaseFacts, today: NaiveDate) -> Vec<SectionId> {
        let ctx = self.context(today);
        self.sections
            .iter()
            .filter(|section| section.is_visible(facts, &ctx))
            .map(|section| section.id)
            .collect()
    }

    pub fn is_complete(&self, id: SectionId, facts: &CaseFacts, today: NaiveDate) -> bool {
        let ctx = self.context(today);
        match id {
            SectionId::Review => {
                self.review_blockers(facts, &ctx).is_empty() && self.others_complete(facts, &ctx)
            }
            other => other.is_complete(facts, &ctx),
        }
    }

    pub fn blockers(&self, id: SectionId, facts: &CaseFacts, today: NaiveDate) -> Vec<String> {
        let ctx = self.context(today);
        match id {
            SectionId::Review => self.review_blockers(facts, &ctx),
            other => other.blockers(facts, &ctx),
        }
    }

    pub fn warnings(&self, id: SectionId, facts: &CaseFacts, today: NaiveDate) -> Vec<String> {
        id.warnings(facts, &self.context(today))
    }

    /// Evaluate every section in the table. Rules are re-run on each call.
    pub fn evaluate(&self, facts: &CaseFacts, today: NaiveDate) -> WizardReport {
        let ctx = self.context(today);
        let sections: Vec<SectionEvaluation> = self
            .sections
            .iter()
            .map(|descriptor| {
                let visible = descriptor.is_visible(facts, &ctx);
                let (complete, blockers) = match descriptor.id {
                    SectionId::Review => {
                        let blockers = self.review_blockers(facts, &ctx);
                        (blockers.is_empty() && self.others_complete(facts, &ctx), blockers)
                    }
                    id => (id.is_complete(facts, &ctx), id.blockers(facts, &ctx)),
                };
                SectionEvaluation {
                    id: descriptor.id,
                    label: descriptor.label,
                    visible,
                    complete,
                    blockers,
                    warnings: descriptor.id.warnings(facts, &ctx),
                }
            })
            .collect();

        let visible: Vec<SectionId> = sections
            .iter()
            .filter(|section| section.visible)
            .map(|section| section.id)
            .collect();
        let completed = sections
            .iter()
            .filter(|section| section.visible && section.complete)
            .count();

        WizardReport {
            product: self.product,
            jurisdiction: self.jurisdiction,
            route: ctx.route(facts),
            progress_percent: progress_percent(completed, visible.len()),
            sections,
            visible,
            completed,
        }
    }

    fn others_complete(&self, facts: &CaseFacts, ctx: &RuleContext) -> bool {
        self.sections
            .iter()
            .filter(|section| section.id != SectionId::Review && section.is_visible(facts, ctx))
            .all(|section| section.id.is_complete(facts, ctx))
    }

    /// Review cannot be finished while any earlier visible section is blocked.
    fn review_blockers(&self, facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
        self.sections
            .iter()
            .filter(|section| section.id != SectionId::Review && section.is_visible(facts, ctx))
            .flat_map(|section| {
                section
                    .id
                    .blockers(facts, ctx)
                    .into_iter()
                    .map(move |blocker| format!("{}: {blocker}", section.label))
            })
            .collect()
    }
}

pub(crate) fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (completed.min(total) * 100) / total;
    u8::try_from(percent).unwrap_or(100)
}

fn eviction_sections(complete_pack: bool) -> Vec<SectionDescriptor> {
    let mut sections = vec![
        SectionDescriptor::new(
            SectionId::CaseBasics,
            "Case basics",
            "Choose the possession route for the property",
        ),
        SectionDescriptor::new(
            SectionId::Parties,
            "Landlord and tenant",
            "Who the notice is between",
        ),
        SectionDescriptor::new(
            SectionId::Property,
            "Property",
            "Address of the let property",
        ),
        SectionDescriptor::new(
            SectionId::Tenancy,
            "Tenancy",
            "Start date, rent and rent frequency",
        ),
        SectionDescriptor::new(
            SectionId::Section21Compliance,
            "Section 21 compliance",
            "Deposit protection and the documents the tenant must have received",
        )
        .for_routes(SECTION_21),
        SectionDescriptor::new(
            SectionId::WalesCompliance,
            "Section 173 compliance",
            "Occupation contract paperwork required before a no-fault notice",
        )
        .for_routes(SECTION_173),
        SectionDescriptor::new(
            SectionId::Section8Grounds,
            "Grounds for possession",
            "Housing Act 1988 grounds and particulars",
        )
        .for_routes(SECTION_8),
        SectionDescriptor::new(
            SectionId::WalesGrounds,
            "Grounds for possession",
            "Renting Homes (Wales) Act 2016 possession grounds",
        )
        .for_routes(FAULT_BASED),
        SectionDescriptor::new(
            SectionId::ScotlandGrounds,
            "Eviction grounds",
            "Private residential tenancy eviction grounds",
        )
        .for_routes(NOTICE_TO_LEAVE),
        SectionDescriptor::new(
            SectionId::Arrears,
            "Rent arrears",
            "Schedule of unpaid rent by period",
        )
        .for_routes(GROUNDS_BASED),
        SectionDescriptor::new(
            SectionId::Notice,
            "Notice details",
            "Service date, method and expiry",
        )
        .for_routes(&Route::ALL),
    ];

    if complete_pack {
        sections.push(
            SectionDescriptor::new(
                SectionId::Evidence,
                "Evidence",
                "Documents supporting the claim",
            )
            .in_jurisdictions(ENGLAND_AND_WALES),
        );
        sections.push(
            SectionDescriptor::new(SectionId::Court, "Court", "County court hearing centre")
                .in_jurisdictions(ENGLAND_AND_WALES),
        );
    }

    sections.push(SectionDescriptor::new(
        SectionId::Review,
        "Review",
        "Check answers before generating documents",
    ));

    // until a route is chosen only case basics is shown
    for section in sections.iter_mut() {
        if section.id != SectionId::CaseBasics && section.routes.is_none() {
            section.routes = Some(&Route::ALL);
        }
    }
    sections
}

fn money_claim_sections() -> Vec<SectionDescriptor> {
    vec![
        SectionDescriptor::new(
            SectionId::Claimant,
            "Claimant",
            "The landlord making the claim",
        ),
        SectionDescriptor::new(
            SectionId::Defendant,
            "Defendant",
            "The tenant and their current address",
        ),
        SectionDescriptor::new(
            SectionId::Property,
            "Property",
            "Address of the let property",
        ),
        SectionDescriptor::new(
            SectionId::Tenancy,
            "Tenancy",
            "Start date, rent and rent frequency",
        ),
        SectionDescriptor::new(
            SectionId::ClaimType,
            "What you are claiming",
            "Rent arrears, damages and other charges",
        ),
        SectionDescriptor::new(
            SectionId::Arrears,
            "Rent arrears",
            "Schedule of unpaid rent by period",
        ),
        SectionDescriptor::new(
            SectionId::Damages,
            "Damages",
            "Damage to the property beyond fair wear and tear",
        ),
        SectionDescriptor::new(
            SectionId::OtherCharges,
            "Other charges",
            "Other sums due under the tenancy",
        ),
        SectionDescriptor::new(
            SectionId::PreAction,
            "Pre-action steps",
            "Letter before claim and response period",
        )
        .in_jurisdictions(ENGLAND_AND_WALES),
        SectionDescriptor::new(
            SectionId::Evidence,
            "Evidence",
            "Documents supporting the claim",
        ),
        SectionDescriptor::new(
            SectionId::Court,
            "Court",
            "Court the claim will be issued in",
        ),
        SectionDescriptor::new(
            SectionId::Review,
            "Review",
            "Check answers before generating documents",
        ),
    ]
}

fn tenancy_agreement_sections() -> Vec<SectionDescriptor> {
    vec![
        SectionDescriptor::new(
            SectionId::Parties,
            "Landlord and tenant",
            "Parties to the agreement",
        ),
        SectionDescriptor::new(
            SectionId::Property,
            "Property",
            "Address of the let property",
        ),
        SectionDescriptor::new(
            SectionId::Tenancy,
            "Tenancy",
            "Start date, rent and rent frequency",
        ),
        SectionDescriptor::new(
            SectionId::Deposit,
            "Deposit",
            "Deposit amount and protection scheme",
        ),
        SectionDescriptor::new(
            SectionId::Review,
            "Review",
            "Check answers before generating documents",
        ),
    ]
}
