//! `wizard:navigate` requests from the review section.
//!
//! Validation messages name sections loosely ("parties", "grounds"), so names
//! go through a per-product alias table before being matched against the
//! visible section list.

use serde::{Deserialize, Serialize};

use super::domain::{normalize_token, Product};
use super::sections::SectionId;

pub const NAVIGATE_EVENT: &str = "wizard:navigate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub section: String,
}

fn aliases(product: Product, token: &str) -> &'static [SectionId] {
    use SectionId::*;

    match (product, token) {
        (Product::MoneyClaim, "parties" | "landlord" | "landlord_details" | "claimant") => {
            &[Claimant]
        }
        (Product::MoneyClaim, "tenant" | "tenant_details" | "defendant") => &[Defendant],
        (Product::MoneyClaim, "claim" | "claim_details" | "claim_type") => &[ClaimType],
        (Product::MoneyClaim, "letter_before_claim" | "pre_action_protocol") => &[PreAction],
        (_, "parties" | "landlord" | "tenant" | "landlord_details" | "tenant_details") => {
            &[Parties]
        }
        (_, "route" | "eviction_route" | "case_type") => &[CaseBasics],
        (_, "grounds" | "possession_grounds" | "eviction_grounds") => {
            &[Section8Grounds, WalesGrounds, ScotlandGrounds]
        }
        (_, "compliance" | "deposit_protection") => {
            &[Section21Compliance, WalesCompliance, Deposit]
        }
        (_, "rent_arrears" | "arrears_schedule") => &[Arrears],
        (_, "notice_details" | "notice_service") => &[Notice],
        (_, "property_details" | "address") => &[Property],
        (_, "tenancy_details" | "rent") => &[Tenancy],
        (_, "documents" | "uploads") => &[Evidence],
        _ => &[],
    }
}

/// Map a requested section name onto a visible section for `product`.
pub fn resolve_section(
    product: Product,
    requested: &str,
    visible: &[SectionId],
) -> Option<SectionId> {
    let token = normalize_token(requested);
    aliases(product, &token)
        .iter()
        .copied()
        .chain(SectionId::parse(&token))
        .find(|candidate| visible.contains(candidate))
}
