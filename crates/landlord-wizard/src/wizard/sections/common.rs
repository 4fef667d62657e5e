//! Rules shared by more than one product table.

use super::eviction::{selected_grounds, GROUND_8, WALES_SERIOUS_ARREARS};
use super::money_claim::{self, CLAIMING_RENT_ARREARS};
use super::RuleContext;
use crate::wizard::arrears::ArrearsSchedule;
use crate::wizard::calculators::{
    earliest_date_after_months, Ground8Assessment, SixMonthRule, SECTION21_MIN_MONTHS,
};
use crate::wizard::domain::{Jurisdiction, Pence, Product, Route};
use crate::wizard::evidence::{EvidenceCategory, EvidenceFile, EVIDENCE_FILES_PATH};
use crate::wizard::facts::CaseFacts;
use crate::wizard::reference::find_ground;

const SCOTLAND_RENT_ARREARS: &str = "12";
const SCOTLAND_ARREARS_MONTHS: usize = 3;

pub(super) fn parties_complete(facts: &CaseFacts) -> bool {
    ["landlord_full_name", "landlord_address_line1", "tenant_full_name"]
        .iter()
        .all(|key| facts.has_text(key))
        && facts.has_text("landlord_address_postcode")
}

pub(super) fn parties_warnings(facts: &CaseFacts) -> Vec<String> {
    let mut warnings = Vec::new();
    let joint = facts
        .number("tenant_count")
        .map(|count| count > 1.0)
        .unwrap_or(false);
    if joint && !facts.has_text("tenant2_full_name") {
        warnings.push("Add the second tenant's name; every joint tenant must be named".to_string());
    }
    if let Some(postcode) = facts.text("landlord_address_postcode") {
        if !looks_like_postcode(postcode) {
            warnings.push(format!(
                "Landlord postcode '{postcode}' does not look like a UK postcode"
            ));
        }
    }
    warnings
}

pub(super) fn property_complete(facts: &CaseFacts) -> bool {
    facts.has_text("property_address_line1") && facts.has_text("property_address_postcode")
}

pub(super) fn property_warnings(facts: &CaseFacts) -> Vec<String> {
    match facts.text("property_address_postcode") {
        Some(postcode) if !looks_like_postcode(postcode) => {
            vec![format!("Property postcode '{postcode}' does not look like a UK postcode")]
        }
        _ => Vec::new(),
    }
}

pub(super) fn tenancy_complete(facts: &CaseFacts, ctx: &RuleContext) -> bool {
    facts.date("tenancy_start_date").is_some()
        && facts.rent_amount().is_some()
        && facts.rent_frequency().is_some()
        && tenancy_blockers(facts, ctx).is_empty()
}

/// A tenancy agreement may be drafted ahead of its start date; a claim or
/// notice cannot concern a tenancy that has not begun.
pub(super) fn tenancy_blockers(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    if ctx.product == Product::TenancyAgreement {
        return Vec::new();
    }
    match facts.date("tenancy_start_date") {
        Some(start) if start > ctx.today => vec![format!(
            "Tenancy start date {start} is in the future; notices and claims need a tenancy that has started"
        )],
        _ => Vec::new(),
    }
}

pub(super) fn tenancy_warnings(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    let Some(start) = facts.date("tenancy_start_date") else {
        return Vec::new();
    };
    if !ctx.product.is_eviction() || start > ctx.today {
        return Vec::new();
    }

    let mut warnings = Vec::new();
    match ctx.jurisdiction {
        Jurisdiction::Scotland => {
            let rule = SixMonthRule::evaluate(start, ctx.today);
            if !rule.satisfied {
                warnings.push(format!(
                    "Tenancy started less than 6 months ago — a Notice to Leave cannot be served until {}",
                    rule.earliest_service
                ));
            }
        }
        Jurisdiction::Wales if ctx.route(facts) == Some(Route::Section173) => {
            let rule = SixMonthRule::evaluate(start, ctx.today);
            if !rule.satisfied {
                warnings.push(format!(
                    "Occupation contract started less than 6 months ago — a section 173 notice cannot be given until {}",
                    rule.earliest_service
                ));
            }
        }
        Jurisdiction::England if ctx.route(facts) == Some(Route::Section21) => {
            let rule = SixMonthRule::with_months(start, ctx.today, SECTION21_MIN_MONTHS);
            if !rule.satisfied {
                warnings.push(format!(
                    "Tenancy started less than 4 months ago — a Section 21 notice cannot be served until {}",
                    rule.earliest_service
                ));
            }
        }
        _ => {}
    }

    if facts.answer("fixed_term").is_yes() {
        if let Some(end) = facts.date("fixed_term_end_date") {
            if end < start {
                warnings.push("Fixed term end date is before the tenancy start date".to_string());
            }
        }
    }
    warnings
}

/// Arrears are collected when an arrears ground is in play, or when a money
/// claim has not ruled rent arrears out.
pub(super) fn arrears_relevant(facts: &CaseFacts, ctx: &RuleContext) -> bool {
    match ctx.product {
        Product::MoneyClaim => money_claim::claiming(facts, CLAIMING_RENT_ARREARS),
        Product::TenancyAgreement => false,
        Product::NoticeOnly | Product::CompletePack => {
            let Some(route) = ctx.route(facts) else {
                return false;
            };
            if matches!(route, Route::Section21 | Route::Section173) {
                return false;
            }
            let grounds = selected_grounds(facts, route);
            if grounds.is_empty() {
                return true;
            }
            grounds.iter().any(|raw| {
                find_ground(route.jurisdiction(), raw)
                    .map(|ground| ground.arrears_related)
                    .unwrap_or(false)
            })
        }
    }
}

pub(super) fn arrears_complete(facts: &CaseFacts, ctx: &RuleContext) -> bool {
    !ArrearsSchedule::from_facts(facts).is_empty() && arrears_blockers(facts, ctx).is_empty()
}

/// Serious-arrears grounds need the statutory threshold met; the check waits
/// until an arrears figure has been entered.
pub(super) fn arrears_blockers(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    let Some(route) = ctx.route(facts) else {
        return Vec::new();
    };
    if !ctx.product.is_eviction() {
        return Vec::new();
    }

    let ground_label = match route {
        Route::Section8 if has_ground(facts, route, GROUND_8) => "Ground 8",
        Route::FaultBased if has_ground(facts, route, WALES_SERIOUS_ARREARS) => "Section 157",
        _ => return Vec::new(),
    };

    if ArrearsSchedule::from_facts(facts).is_empty() {
        return Vec::new();
    }

    match Ground8Assessment::from_facts(facts) {
        Some(assessment) if !assessment.eligible => vec![format!(
            "Arrears of {} are below the {ground_label} threshold of {} ({} short) — {ground_label} cannot be relied on",
            assessment.total_arrears,
            assessment.threshold,
            assessment.shortfall()
        )],
        _ => Vec::new(),
    }
}

pub(super) fn arrears_warnings(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    let schedule = ArrearsSchedule::from_facts(facts);
    let mut warnings: Vec<String> = schedule
        .items
        .iter()
        .filter(|item| item.has_inverted_period())
        .map(|item| match item.period_start {
            Some(start) => format!("Arrears period starting {start} ends before it begins"),
            None => "An arrears period ends before it begins".to_string(),
        })
        .collect();

    if ctx.jurisdiction == Jurisdiction::Scotland
        && ctx.route(facts) == Some(Route::NoticeToLeave)
        && has_ground(facts, Route::NoticeToLeave, SCOTLAND_RENT_ARREARS)
        && !schedule.items.is_empty()
    {
        let run = schedule.longest_arrears_run();
        if run < SCOTLAND_ARREARS_MONTHS {
            warnings.push(format!(
                "Ground 12 needs rent arrears over three or more consecutive months; the longest unbroken run is {run}"
            ));
        }
    }

    if ctx.product.is_eviction() {
        if let Some(assessment) = Ground8Assessment::from_facts(facts) {
            if assessment.eligible && ctx.route(facts) == Some(Route::Section8) {
                warnings.push(
                    "Ground 8 arrears must still meet the threshold on the date of the hearing"
                        .to_string(),
                );
            }
        }
    }
    warnings
}

pub(super) fn evidence_complete(facts: &CaseFacts) -> bool {
    !EvidenceFile::list_from_facts(facts).is_empty()
        || facts.answer("evidence.not_available").is_yes()
}

pub(super) fn evidence_warnings(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    let files = EvidenceFile::list_from_facts(facts);
    let arrears_claimed = match ctx.product {
        Product::MoneyClaim => facts.answer(CLAIMING_RENT_ARREARS).is_yes(),
        _ => arrears_relevant(facts, ctx) && ctx.route(facts).is_some(),
    };
    let has_statement = files
        .iter()
        .any(|file| file.category == EvidenceCategory::RentStatement);

    let mut warnings = Vec::new();
    if arrears_claimed && !has_statement {
        warnings.push("Upload a rent statement to evidence the arrears".to_string());
    }
    if files.is_empty() && !facts.array(EVIDENCE_FILES_PATH).is_empty() {
        warnings.push("Some uploaded evidence could not be read and has been ignored".to_string());
    }
    warnings
}

fn court_name_path(product: Product) -> &'static str {
    match product {
        Product::MoneyClaim => "money_claim.court_name",
        _ => "court_name",
    }
}

pub(super) fn court_complete(facts: &CaseFacts, ctx: &RuleContext) -> bool {
    facts.has_text(court_name_path(ctx.product)) && court_blockers(facts, ctx).is_empty()
}

const ONLINE_CLAIM_LIMIT: Pence = Pence(10_000_000);
const FAST_TRACK_THRESHOLD: Pence = Pence(1_000_000);
const SIMPLE_PROCEDURE_LIMIT: Pence = Pence(500_000);

pub(super) fn court_blockers(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    if ctx.product != Product::MoneyClaim || ctx.jurisdiction == Jurisdiction::Scotland {
        return Vec::new();
    }
    let total = money_claim::claim_total(facts);
    if total > ONLINE_CLAIM_LIMIT {
        vec![format!(
            "A claim of {total} exceeds the {ONLINE_CLAIM_LIMIT} limit for Money Claim Online"
        )]
    } else {
        Vec::new()
    }
}

pub(super) fn court_warnings(facts: &CaseFacts, ctx: &RuleContext) -> Vec<String> {
    match ctx.product {
        Product::MoneyClaim => {
            let total = money_claim::claim_total(facts);
            match ctx.jurisdiction {
                Jurisdiction::Scotland if total > SIMPLE_PROCEDURE_LIMIT => vec![format!(
                    "Claims over {SIMPLE_PROCEDURE_LIMIT} cannot use simple procedure in the sheriff court"
                )],
                Jurisdiction::England | Jurisdiction::Wales
                    if total > FAST_TRACK_THRESHOLD && total <= ONLINE_CLAIM_LIMIT =>
                {
                    vec![format!(
                        "Claims over {FAST_TRACK_THRESHOLD} are allocated beyond the small claims track and carry higher cost risk"
                    )]
                }
                _ => Vec::new(),
            }
        }
        _ => match (ctx.route(facts), facts.date("notice_expiry_date")) {
            (Some(Route::Section21), Some(expiry)) => {
                let deadline = earliest_date_after_months(expiry, 4).unwrap_or(expiry);
                if ctx.today > deadline {
                    vec![format!(
                        "Possession proceedings on a Section 21 notice must start within 4 months of expiry ({deadline})"
                    )]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        },
    }
}

fn has_ground(facts: &CaseFacts, route: Route, code: &str) -> bool {
    selected_grounds(facts, route).iter().any(|raw| {
        find_ground(route.jurisdiction(), raw)
            .map(|ground| ground.code == code)
            .unwrap_or(false)
    })
}

/// Loose shape check: outward code starting with a letter, inward code of a
/// digit and two letters.
fn looks_like_postcode(raw: &str) -> bool {
    let compact: Vec<char> = raw
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| ch.to_ascii_uppercase())
        .collect();
    if !(5..=7).contains(&compact.len()) {
        return false;
    }
    let (outward, inward) = compact.split_at(compact.len() - 3);
    outward[0].is_ascii_alphabetic()
        && outward.iter().all(|ch| ch.is_ascii_alphanumeric())
        && inward[0].is_ascii_digit()
        && inward[1..].iter().all(|ch| ch.is_ascii_alphabetic())
}
