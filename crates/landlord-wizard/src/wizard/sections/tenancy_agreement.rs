use super::RuleContext;
use crate::wizard::calculators::deposit_cap;
use crate::wizard::facts::CaseFacts;
use crate::wizard::reference::find_deposit_scheme;

pub(super) fn deposit_complete(facts: &CaseFacts, ctx: &RuleContext) -> bool {
    let Some(amount) = facts.pence("deposit_amount") else {
        return false;
    };
    (!amount.is_positive() || facts.has_text("deposit_scheme_name"))
        && deposit_blockers(facts, ctx).is_empty()
}

pub(super) fn deposit_blockers(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    let mut blockers = Vec::new();
    let Some(amount) = facts.pence("deposit_amount") else {
        return blockers;
    };

    if amount.0 < 0 {
        blockers.push("Deposit amount cannot be negative".to_string());
        return blockers;
    }

    if let (Some(rent), Some(frequency)) = (facts.rent_amount(), facts.rent_frequency()) {
        if let Some(cap) = deposit_cap(ctx.jurisdiction, rent, frequency) {
            if amount > cap.maximum {
                blockers.push(format!(
                    "Deposit of {amount} exceeds the legal maximum of {} ({}) in {}",
                    cap.maximum, cap.basis, ctx.jurisdiction
                ));
            }
        }
    }
    blockers
}

pub(super) fn deposit_warnings(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    let mut warnings = Vec::new();
    if let Some(name) = facts.text("deposit_scheme_name") {
        if find_deposit_scheme(ctx.jurisdiction, name).is_none() {
            warnings.push(format!(
                "'{name}' is not a recognised deposit protection scheme in {}",
                ctx.jurisdiction
            ));
        }
    }
    if facts.pence("deposit_amount").is_some_and(|amount| amount.is_positive()) {
        warnings.push(
            "The deposit must be protected and the prescribed information given within 30 days of receipt"
                .to_string(),
        );
    }
    warnings
}
