//! Route choice, possession grounds and the notice itself.

use super::RuleContext;
use crate::wizard::calculators::{suggest_notice_expiry, SixMonthRule, SECTION21_MIN_MONTHS};
use crate::wizard::domain::{Jurisdiction, Route};
use crate::wizard::facts::CaseFacts;
use crate::wizard::reference::{resolve_grounds, GroundKind};

pub(super) const GROUND_8: &str = "8";
pub(super) const WALES_SERIOUS_ARREARS: &str = "157";

/// Facts key holding the grounds chosen for `route`.
pub(super) fn grounds_key(route: Route) -> Option<&'static str> {
    match route {
        Route::Section8 => Some("section8_grounds"),
        Route::FaultBased => Some("wales_grounds"),
        Route::NoticeToLeave => Some("scotland_grounds"),
        Route::Section21 | Route::Section173 => None,
    }
}

pub(super) fn selected_grounds(facts: &CaseFacts, route: Route) -> Vec<String> {
    grounds_key(route)
        .map(|key| facts.string_list(key))
        .unwrap_or_default()
}

pub(super) fn case_basics_complete(facts: &CaseFacts, ctx: &RuleContext) -> bool {
    ctx.route(facts).is_some()
}

pub(super) fn case_basics_blockers(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    match facts.raw_route() {
        Some(route) if !route.available_in(ctx.jurisdiction) => vec![format!(
            "{} is not available for properties in {}; choose a {} route",
            route.label(),
            ctx.jurisdiction,
            ctx.jurisdiction
        )],
        _ => Vec::new(),
    }
}

pub(super) fn section8_grounds_complete(facts: &CaseFacts) -> bool {
    grounds_complete(facts, Jurisdiction::England, "section8_grounds")
        && facts.has_text("section8_particulars")
}

pub(super) fn section8_grounds_warnings(facts: &CaseFacts) -> Vec<String> {
    grounds_warnings(facts, Jurisdiction::England, "section8_grounds")
}

pub(super) fn wales_grounds_complete(facts: &CaseFacts) -> bool {
    grounds_complete(facts, Jurisdiction::Wales, "wales_grounds")
}

pub(super) fn wales_grounds_warnings(facts: &CaseFacts) -> Vec<String> {
    grounds_warnings(facts, Jurisdiction::Wales, "wales_grounds")
}

pub(super) fn scotland_grounds_complete(facts: &CaseFacts) -> bool {
    grounds_complete(facts, Jurisdiction::Scotland, "scotland_grounds")
}

pub(super) fn scotland_grounds_warnings(facts: &CaseFacts) -> Vec<String> {
    grounds_warnings(facts, Jurisdiction::Scotland, "scotland_grounds")
}

fn grounds_complete(facts: &CaseFacts, jurisdiction: Jurisdiction, key: &str) -> bool {
    let (known, _) = resolve_grounds(jurisdiction, &facts.string_list(key));
    !known.is_empty()
}

fn grounds_warnings(facts: &CaseFacts, jurisdiction: Jurisdiction, key: &str) -> Vec<String> {
    let (known, unknown) = resolve_grounds(jurisdiction, &facts.string_list(key));
    let mut warnings: Vec<String> = unknown
        .iter()
        .map(|raw| {
            format!("Ground '{raw}' is not recognised in {jurisdiction} and will be ignored")
        })
        .collect();

    if known.is_empty() {
        return warnings;
    }

    if jurisdiction == Jurisdiction::Scotland {
        warnings.push(
            "All Scottish eviction grounds are discretionary: the First-tier Tribunal decides whether eviction is reasonable"
                .to_string(),
        );
    } else if known.iter().all(|ground| ground.kind == GroundKind::Discretionary) {
        warnings.push(
            "All selected grounds are discretionary; the court will only order possession if it considers it reasonable"
                .to_string(),
        );
    }

    if known.iter().any(|ground| ground.code == GROUND_8) && jurisdiction == Jurisdiction::England {
        warnings.push(
            "Consider adding Grounds 10 and 11 in case arrears fall below the Ground 8 threshold before the hearing"
                .to_string(),
        );
    }
    warnings
}

pub(super) fn notice_complete(facts: &CaseFacts, ctx: &RuleContext) -> bool {
    ctx.route(facts).is_some()
        && facts.date("notice_served_date").is_some()
        && facts.has_text("notice_service_method")
        && facts.date("notice_expiry_date").is_some()
        && notice_blockers(facts, ctx).is_empty()
}

/// Timing rules are checked against the service date when one is entered,
/// otherwise against today.
pub(super) fn notice_blockers(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    let Some(route) = ctx.route(facts) else {
        return Vec::new();
    };
    let served = facts.date("notice_served_date");
    let reference_date = served.unwrap_or(ctx.today);
    let mut blockers = Vec::new();

    if let Some(start) = facts.date("tenancy_start_date") {
        let waiting_period = match route {
            Route::NoticeToLeave => Some((
                SixMonthRule::evaluate(start, reference_date),
                "A Notice to Leave cannot be served in the first 6 months of the tenancy",
            )),
            Route::Section173 => Some((
                SixMonthRule::evaluate(start, reference_date),
                "A section 173 notice cannot be given in the first 6 months of the occupation contract",
            )),
            Route::Section21 => Some((
                SixMonthRule::with_months(start, reference_date, SECTION21_MIN_MONTHS),
                "A Section 21 notice cannot be served in the first 4 months of the tenancy",
            )),
            Route::Section8 | Route::FaultBased => None,
        };
        if let Some((rule, message)) = waiting_period {
            if !rule.satisfied {
                blockers.push(format!("{message} (earliest {})", rule.earliest_service));
            }
        }
    }

    if let (Some(served), Some(expiry)) = (served, facts.date("notice_expiry_date")) {
        let suggestion = suggest_notice_expiry(route, &selected_grounds(facts, route), served);
        if expiry < suggestion.expiry {
            blockers.push(format!(
                "Notice expiry date {expiry} is earlier than the {}-day notice period allows (earliest {})",
                suggestion.minimum_days, suggestion.expiry
            ));
        }
    }
    blockers
}

pub(super) fn notice_warnings(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    let Some(route) = ctx.route(facts) else {
        return Vec::new();
    };
    let mut warnings = Vec::new();
    let served = facts.date("notice_served_date");

    if let Some(served) = served {
        if served > ctx.today {
            warnings
                .push("Notice service date is in the future; check it before serving".to_string());
        }
        if facts.date("notice_expiry_date").is_none() {
            let suggestion = suggest_notice_expiry(route, &selected_grounds(facts, route), served);
            warnings.push(format!(
                "Suggested expiry date: {} ({} days' notice)",
                suggestion.expiry, suggestion.minimum_days
            ));
        }
    }

    if route == Route::Section21 {
        warnings.push(
            "A Section 21 notice lapses if proceedings are not started within 6 months of service"
                .to_string(),
        );
    }
    warnings
}
