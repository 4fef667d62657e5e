//! Pre-conditions for no-fault possession: deposit protection and the
//! landlord's statutory paperwork.

use chrono::Duration;

use super::RuleContext;
use crate::wizard::domain::Answer;
use crate::wizard::facts::CaseFacts;
use crate::wizard::reference::{find_deposit_scheme, find_licensing_option};

const PROTECTION_DEADLINE_DAYS: i64 = 30;

pub(super) fn section21_complete(facts: &CaseFacts, ctx: &RuleContext) -> bool {
    deposit_answered(facts)
        && gas_answered(facts)
        && facts.answer("epc_provided").is_answered()
        && facts.answer("how_to_rent_provided").is_answered()
        && facts
            .text("property_licensing")
            .and_then(find_licensing_option)
            .is_some()
        && section21_blockers(facts, ctx).is_empty()
}

pub(super) fn section21_blockers(facts: &CaseFacts, _ctx: &RuleContext) -> Vec<String> {
    let mut blockers = deposit_blockers(facts, "Section 21");

    if facts.answer("gas_safety_cert_provided").is_no()
        && facts.answer("has_gas_appliances").is_yes()
    {
        blockers.push(
            "Gas safety certificate not given to the tenant — Section 21 cannot be used".to_string(),
        );
    }
    if facts.answer("epc_provided").is_no() {
        blockers.push(
            "Energy Performance Certificate not given to the tenant — Section 21 cannot be used"
                .to_string(),
        );
    }
    if facts.answer("how_to_rent_provided").is_no() {
        blockers.push(
            "How to Rent guide not given to the tenant — Section 21 cannot be used".to_string(),
        );
    }
    if let Some(option) = facts.text("property_licensing").and_then(find_licensing_option) {
        if option.blocks_no_fault {
            blockers.push(
                "Property requires a licence that is not held — Section 21 cannot be used"
                    .to_string(),
            );
        }
    }
    blockers
}

pub(super) fn wales_complete(facts: &CaseFacts, ctx: &RuleContext) -> bool {
    deposit_answered(facts)
        && gas_answered(facts)
        && facts.answer("written_statement_provided").is_answered()
        && facts.answer("epc_provided").is_answered()
        && facts.answer("eicr_provided").is_answered()
        && facts.answer("smoke_alarms_fitted").is_answered()
        && wales_blockers(facts, ctx).is_empty()
}

pub(super) fn wales_blockers(facts: &CaseFacts, _ctx: &RuleContext) -> Vec<String> {
    let route = "a section 173 notice";
    let mut blockers = deposit_blockers(facts, route);

    let paperwork = [
        ("written_statement_provided", "Written statement of the occupation contract not provided"),
        ("epc_provided", "Energy Performance Certificate not given to the contract-holder"),
        ("eicr_provided", "Electrical condition report not given to the contract-holder"),
        ("smoke_alarms_fitted", "Working smoke alarms not fitted on every storey"),
    ];
    for (key, problem) in paperwork {
        if facts.answer(key).is_no() {
            blockers.push(format!("{problem} — {route} cannot be given"));
        }
    }
    if facts.answer("has_gas_appliances").is_yes()
        && facts.answer("gas_safety_cert_provided").is_no()
    {
        blockers.push(format!(
            "Gas safety certificate not given to the contract-holder — {route} cannot be given"
        ));
    }
    blockers
}

pub(super) fn deposit_warnings(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    if !facts.answer("deposit_taken").is_yes() {
        return Vec::new();
    }
    match facts.text("deposit_scheme_name") {
        Some(name) if find_deposit_scheme(ctx.jurisdiction, name).is_none() => vec![format!(
            "'{name}' is not a recognised deposit protection scheme in {}",
            ctx.jurisdiction
        )],
        _ => Vec::new(),
    }
}

fn deposit_answered(facts: &CaseFacts) -> bool {
    match facts.answer("deposit_taken") {
        Answer::Unanswered => false,
        Answer::No => true,
        Answer::Yes => {
            facts.answer("deposit_protected").is_yes()
                && facts.has_text("deposit_scheme_name")
                && facts.date("deposit_protection_date").is_some()
                && facts.answer("prescribed_info_given").is_answered()
        }
    }
}

fn gas_answered(facts: &CaseFacts) -> bool {
    match facts.answer("has_gas_appliances") {
        Answer::Unanswered => false,
        Answer::No => true,
        Answer::Yes => facts.answer("gas_safety_cert_provided").is_answered(),
    }
}

fn deposit_blockers(facts: &CaseFacts, route: &str) -> Vec<String> {
    if !facts.answer("deposit_taken").is_yes() {
        return Vec::new();
    }

    let mut blockers = Vec::new();
    if facts.answer("deposit_protected").is_no() {
        blockers.push(format!(
            "Deposit not protected — {route} cannot be used until the deposit is protected in an authorised scheme"
        ));
        return blockers;
    }

    if let (Some(received), Some(protected)) = (
        facts.date("deposit_received_date"),
        facts.date("deposit_protection_date"),
    ) {
        if protected > received + Duration::days(PROTECTION_DEADLINE_DAYS) {
            blockers.push(format!(
                "Deposit was protected more than {PROTECTION_DEADLINE_DAYS} days after it was received — {route} cannot be used until the deposit is returned"
            ));
        }
    }

    if facts.answer("prescribed_info_given").is_no() {
        blockers.push(format!(
            "Prescribed information about the deposit not given — {route} cannot be used"
        ));
    }
    blockers
}
