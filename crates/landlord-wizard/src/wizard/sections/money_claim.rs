//! Money claim sections: who is claiming, what is claimed and the
//! pre-action steps taken.

use chrono::Duration;
use serde_json::Value;

use super::RuleContext;
use crate::wizard::arrears::ArrearsSchedule;
use crate::wizard::domain::Pence;
use crate::wizard::facts::{number_from_value, CaseFacts};

pub(super) const CLAIMING_RENT_ARREARS: &str = "claiming_rent_arrears";
pub(super) const CLAIMING_DAMAGES: &str = "claiming_damages";
pub(super) const CLAIMING_OTHER: &str = "claiming_other";

const DAMAGE_ITEMS: &str = "money_claim.damage_items";
const OTHER_CHARGES: &str = "money_claim.other_charges";
const LETTER_SENT: &str = "money_claim.letter_before_claim_sent";
const LETTER_DATE: &str = "money_claim.letter_before_claim_date";
const RESPONSE_DAYS: i64 = 30;

/// Claim-type sections stay visible until the user answers "No".
pub(super) fn claiming(facts: &CaseFacts, key: &str) -> bool {
    !facts.answer(key).is_no()
}

pub(super) fn claimant_complete(facts: &CaseFacts) -> bool {
    ["landlord_full_name", "landlord_address_line1", "landlord_address_postcode"]
        .iter()
        .all(|key| facts.has_text(key))
}

pub(super) fn defendant_complete(facts: &CaseFacts) -> bool {
    ["tenant_full_name", "defendant_address_line1", "defendant_address_postcode"]
        .iter()
        .all(|key| facts.has_text(key))
}

pub(super) fn defendant_warnings(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    let moved_out = facts
        .date("tenancy_end_date")
        .map(|end| end <= ctx.today)
        .unwrap_or(false);
    let same_address = match (
        facts.text("defendant_address_line1"),
        facts.text("property_address_line1"),
    ) {
        (Some(defendant), Some(property)) => defendant.eq_ignore_ascii_case(property),
        _ => false,
    };

    if moved_out && same_address {
        vec![
            "The defendant's address matches the let property but the tenancy has ended; use the tenant's current address"
                .to_string(),
        ]
    } else {
        Vec::new()
    }
}

pub(super) fn claim_type_complete(facts: &CaseFacts) -> bool {
    [CLAIMING_RENT_ARREARS, CLAIMING_DAMAGES, CLAIMING_OTHER]
        .iter()
        .all(|key| facts.answer(key).is_answered())
        && claim_type_blockers(facts).is_empty()
}

pub(super) fn claim_type_blockers(facts: &CaseFacts) -> Vec<String> {
    let all_declined = [CLAIMING_RENT_ARREARS, CLAIMING_DAMAGES, CLAIMING_OTHER]
        .iter()
        .all(|key| facts.answer(key).is_no());
    if all_declined {
        vec![
            "Choose at least one thing to claim: rent arrears, damages or other charges".to_string(),
        ]
    } else {
        Vec::new()
    }
}

/// One claimed line item (`{description, amount}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ClaimLine {
    pub description: Option<String>,
    pub amount: Option<Pence>,
}

impl ClaimLine {
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let description = object
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        let amount = object
            .get("amount")
            .and_then(number_from_value)
            .and_then(Pence::from_pounds);
        Some(Self {
            description,
            amount,
        })
    }
}

fn claim_lines(facts: &CaseFacts, path: &str) -> Vec<ClaimLine> {
    facts
        .array(path)
        .iter()
        .filter_map(ClaimLine::from_value)
        .collect()
}

fn lines_total(lines: &[ClaimLine]) -> Pence {
    lines
        .iter()
        .filter_map(|line| line.amount)
        .filter(|amount| amount.is_positive())
        .sum()
}

fn lines_complete(lines: &[ClaimLine]) -> bool {
    !lines.is_empty()
        && lines
            .iter()
            .all(|line| line.description.is_some() && line.amount.is_some_and(Pence::is_positive))
}

fn lines_warnings(lines: &[ClaimLine], noun: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let position = index + 1;
        if line.description.is_none() {
            warnings.push(format!("{noun} {position} has no description"));
        }
        match line.amount {
            None => warnings.push(format!("{noun} {position} has no amount")),
            Some(amount) if !amount.is_positive() => {
                warnings.push(format!("{noun} {position} must be more than £0.00"))
            }
            Some(_) => {}
        }
    }
    warnings
}

pub(super) fn damages_complete(facts: &CaseFacts) -> bool {
    lines_complete(&claim_lines(facts, DAMAGE_ITEMS))
}

pub(super) fn damages_warnings(facts: &CaseFacts) -> Vec<String> {
    lines_warnings(&claim_lines(facts, DAMAGE_ITEMS), "Damage item")
}

pub(super) fn other_charges_complete(facts: &CaseFacts) -> bool {
    lines_complete(&claim_lines(facts, OTHER_CHARGES))
}

pub(super) fn other_charges_warnings(facts: &CaseFacts) -> Vec<String> {
    lines_warnings(&claim_lines(facts, OTHER_CHARGES), "Charge")
}

/// Everything being claimed, skipping heads the user has declined.
pub(super) fn claim_total(facts: &CaseFacts) -> Pence {
    let mut total = Pence::ZERO;
    if claiming(facts, CLAIMING_RENT_ARREARS) {
        total = total.saturating_add(ArrearsSchedule::from_facts(facts).total());
    }
    if claiming(facts, CLAIMING_DAMAGES) {
        total = total.saturating_add(lines_total(&claim_lines(facts, DAMAGE_ITEMS)));
    }
    if claiming(facts, CLAIMING_OTHER) {
        total = total.saturating_add(lines_total(&claim_lines(facts, OTHER_CHARGES)));
    }
    total
}

pub(super) fn pre_action_complete(facts: &CaseFacts) -> bool {
    facts.answer(LETTER_SENT).is_yes() && facts.date(LETTER_DATE).is_some()
}

pub(super) fn pre_action_blockers(facts: &CaseFacts) -> Vec<String> {
    if facts.answer(LETTER_SENT).is_no() {
        vec![
            "A letter before claim must be sent under the Pre-Action Protocol for Debt Claims before issuing"
                .to_string(),
        ]
    } else {
        Vec::new()
    }
}

pub(super) fn pre_action_warnings(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    if !facts.answer(LETTER_SENT).is_yes() {
        return Vec::new();
    }
    match facts.date(LETTER_DATE) {
        Some(sent) => {
            let respond_by = sent + Duration::days(RESPONSE_DAYS);
            if ctx.today < respond_by {
                vec![format!(
                    "The tenant has {RESPONSE_DAYS} days to respond to the letter before claim; issuing before {respond_by} risks cost sanctions"
                )]
            } else {
                Vec::new()
            }
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn claim_total_skips_declined_heads() {
        let facts = CaseFacts::from_value(json!({
            "claiming_rent_arrears": true,
            "claiming_damages": false,
            "issues": { "rent_arrears": { "total_arrears": 1200 } },
            "money_claim": {
                "damage_items": [{ "description": "Carpet", "amount": 400 }],
                "other_charges": [{ "description": "Keys", "amount": "£35.50" }]
            }
        }));
        assert_eq!(claim_total(&facts), Pence(123_550));
    }

    #[test]
    fn line_items_need_a_description_and_positive_amount() {
        let facts = CaseFacts::from_value(json!({
            "money_claim": { "damage_items": [{ "amount": 0 }] }
        }));
        assert!(!damages_complete(&facts));
        assert_eq!(
            damages_warnings(&facts),
            vec![
                "Damage item 1 has no description".to_string(),
                "Damage item 1 must be more than £0.00".to_string()
            ]
        );
    }
}
