use serde_json::json;

use super::common::*;
use crate::wizard::domain::{Jurisdiction, Product};
use crate::wizard::facts::CaseFacts;
use crate::wizard::sections::{SectionId, SectionTable};

fn england_notice() -> SectionTable {
    SectionTable::for_product(Product::NoticeOnly, Jurisdiction::England)
}

#[test]
fn ground8_below_two_months_blocks_the_arrears_section() {
    let table = england_notice();
    let mut case = section8_case();
    case.merge_value(&json!({
        "issues": { "rent_arrears": { "arrears_items": arrears_items(1000.0, 900.0) } }
    }));

    let blockers = table.blockers(SectionId::Arrears, &case, today());
    assert_eq!(blockers.len(), 1);
    assert!(blockers[0].contains("£1,900.00"));
    assert!(blockers[0].contains("£2,000.00"));
    assert!(blockers[0].contains("Ground 8"));
    assert!(!table.is_complete(SectionId::Arrears, &case, today()));

    let review = table.blockers(SectionId::Review, &case, today());
    assert!(review.iter().any(|blocker| blocker.starts_with("Rent arrears: ")));
}

#[test]
fn ground8_at_exactly_two_months_passes() {
    let table = england_notice();
    let case = section8_case();

    assert!(table.blockers(SectionId::Arrears, &case, today()).is_empty());
    assert!(table.is_complete(SectionId::Arrears, &case, today()));
    assert!(table
        .warnings(SectionId::Arrears, &case, today())
        .iter()
        .any(|warning| warning.contains("date of the hearing")));
}

#[test]
fn ground8_check_waits_for_an_arrears_figure() {
    let table = england_notice();
    let mut case = section8_case();
    case.set("issues", json!({}));

    assert!(table.blockers(SectionId::Arrears, &case, today()).is_empty());
    assert!(!table.is_complete(SectionId::Arrears, &case, today()));
}

#[test]
fn complete_section8_case_reaches_a_complete_review() {
    let report = england_notice().evaluate(&section8_case(), today());

    assert_eq!(
        report.visible,
        vec![
            SectionId::CaseBasics,
            SectionId::Parties,
            SectionId::Property,
            SectionId::Tenancy,
            SectionId::Section8Grounds,
            SectionId::Arrears,
            SectionId::Notice,
            SectionId::Review,
        ]
    );
    let review = report.section(SectionId::Review).expect("review evaluated");
    assert!(review.complete, "blockers: {:?}", review.blockers);
    assert_eq!(report.progress_percent, 100);
}

#[test]
fn scotland_notice_to_leave_respects_the_six_month_rule() {
    let table = SectionTable::for_product(Product::NoticeOnly, Jurisdiction::Scotland);
    let recent = facts(json!({
        "eviction_route": "notice_to_leave",
        "tenancy_start_date": "2026-05-18",
        "rent_amount": 800,
        "rent_frequency": "monthly"
    }));

    let warnings = table.warnings(SectionId::Tenancy, &recent, today());
    assert_eq!(
        warnings,
        vec![
            "Tenancy started less than 6 months ago — a Notice to Leave cannot be served until 2026-11-18"
                .to_string()
        ]
    );
    let blockers = table.blockers(SectionId::Notice, &recent, today());
    assert!(blockers
        .iter()
        .any(|blocker| blocker.contains("first 6 months") && blocker.contains("2026-11-18")));

    let established = facts(json!({
        "eviction_route": "notice_to_leave",
        "tenancy_start_date": "2026-03-18",
        "rent_amount": 800,
        "rent_frequency": "monthly"
    }));
    assert!(table.warnings(SectionId::Tenancy, &established, today()).is_empty());
    assert!(table.blockers(SectionId::Notice, &established, today()).is_empty());
}

#[test]
fn ground12_warning_counts_consecutive_periods_only() {
    let table = SectionTable::for_product(Product::NoticeOnly, Jurisdiction::Scotland);
    let period = |start: &str, paid: u32| {
        json!({ "period_start": start, "rent_due": 800, "rent_paid": paid })
    };
    let schedule = |items: Vec<serde_json::Value>| {
        facts(json!({
            "eviction_route": "notice_to_leave",
            "scotland_grounds": ["12"],
            "issues": { "rent_arrears": { "arrears_items": items } }
        }))
    };
    let ground12_warning = |case: &CaseFacts| {
        table
            .warnings(SectionId::Arrears, case, today())
            .into_iter()
            .find(|warning| warning.starts_with("Ground 12"))
    };

    let broken = schedule(vec![
        period("2026-05-01", 0),
        period("2026-06-01", 800),
        period("2026-07-01", 0),
        period("2026-08-01", 100),
    ]);
    assert_eq!(
        ground12_warning(&broken).as_deref(),
        Some(
            "Ground 12 needs rent arrears over three or more consecutive months; \
             the longest unbroken run is 2"
        )
    );

    let unbroken = schedule(vec![
        period("2026-06-01", 0),
        period("2026-07-01", 0),
        period("2026-08-01", 100),
    ]);
    assert_eq!(ground12_warning(&unbroken), None);
}

#[test]
fn scotland_never_shows_english_sections() {
    let table = SectionTable::for_product(Product::CompletePack, Jurisdiction::Scotland);
    let case = facts(json!({ "eviction_route": "notice_to_leave", "scotland_grounds": ["12"] }));

    let visible = table.visible_sections(&case, today());
    assert!(visible.contains(&SectionId::ScotlandGrounds));
    assert!(visible.contains(&SectionId::Arrears));
    assert!(!visible.contains(&SectionId::Section21Compliance));
    assert!(!visible.contains(&SectionId::Section8Grounds));
    assert!(!visible.contains(&SectionId::Court));
    assert!(table
        .warnings(SectionId::ScotlandGrounds, &case, today())
        .iter()
        .any(|warning| warning.contains("discretionary")));
}

#[test]
fn only_case_basics_is_visible_until_a_valid_route_is_chosen() {
    let table = england_notice();

    let empty = CaseFacts::new();
    assert_eq!(table.visible_sections(&empty, today()), vec![SectionId::CaseBasics]);

    let wrong_jurisdiction = facts(json!({ "eviction_route": "notice_to_leave" }));
    assert_eq!(
        table.visible_sections(&wrong_jurisdiction, today()),
        vec![SectionId::CaseBasics]
    );
    let blockers = table.blockers(SectionId::CaseBasics, &wrong_jurisdiction, today());
    assert_eq!(blockers.len(), 1);
    assert!(blockers[0].contains("Notice to Leave"));
}

#[test]
fn section21_unprotected_deposit_is_a_blocker() {
    let table = england_notice();
    let case = facts(json!({
        "eviction_route": "section_21",
        "deposit_taken": true,
        "deposit_protected": false,
        "has_gas_appliances": false,
        "epc_provided": true,
        "how_to_rent_provided": true,
        "property_licensing": "not_required"
    }));

    assert!(table.visible_sections(&case, today()).contains(&SectionId::Section21Compliance));
    let blockers = table.blockers(SectionId::Section21Compliance, &case, today());
    assert_eq!(blockers.len(), 1);
    assert!(blockers[0].to_lowercase().contains("deposit"));
    assert!(!table.is_complete(SectionId::Section21Compliance, &case, today()));
}

#[test]
fn section21_late_protection_and_missing_documents_block() {
    let table = england_notice();
    let case = facts(json!({
        "eviction_route": "section_21",
        "deposit_taken": "yes",
        "deposit_protected": "yes",
        "deposit_scheme_name": "DPS",
        "deposit_received_date": "2026-01-01",
        "deposit_protection_date": "2026-03-01",
        "prescribed_info_given": "yes",
        "has_gas_appliances": "yes",
        "gas_safety_cert_provided": "no",
        "epc_provided": "no",
        "how_to_rent_provided": "yes",
        "property_licensing": "unlicensed"
    }));

    let blockers = table.blockers(SectionId::Section21Compliance, &case, today());
    assert_eq!(blockers.len(), 4, "{blockers:?}");
    assert!(blockers.iter().any(|blocker| blocker.contains("30 days")));
    assert!(blockers.iter().any(|blocker| blocker.contains("Gas safety")));
    assert!(blockers.iter().any(|blocker| blocker.contains("Energy Performance")));
    assert!(blockers.iter().any(|blocker| blocker.contains("licence")));
}

#[test]
fn notice_expiry_must_cover_the_longest_ground() {
    let table = england_notice();
    let mut case = section8_case();
    case.set("section8_grounds", json!(["8", "1"]));

    let blockers = table.blockers(SectionId::Notice, &case, today());
    assert_eq!(blockers.len(), 1);
    assert!(blockers[0].contains("60-day"));
    assert!(blockers[0].contains("2026-11-30"));

    case.set("notice_expiry_date", json!("2026-11-30"));
    assert!(table.blockers(SectionId::Notice, &case, today()).is_empty());
}

#[test]
fn money_claim_hides_declined_heads_and_pre_action_outside_england_and_wales() {
    let england = SectionTable::for_product(Product::MoneyClaim, Jurisdiction::England);
    let case = money_claim_case();

    let visible = england.visible_sections(&case, today());
    assert_eq!(
        visible,
        vec![
            SectionId::Claimant,
            SectionId::Defendant,
            SectionId::Property,
            SectionId::Tenancy,
            SectionId::ClaimType,
            SectionId::Arrears,
            SectionId::PreAction,
            SectionId::Evidence,
            SectionId::Court,
            SectionId::Review,
        ]
    );

    let undecided = facts(json!({}));
    let visible = england.visible_sections(&undecided, today());
    assert!(visible.contains(&SectionId::Arrears));
    assert!(visible.contains(&SectionId::Damages));
    assert!(visible.contains(&SectionId::OtherCharges));

    let declined = facts(json!({
        "claiming_rent_arrears": false,
        "claiming_damages": false,
        "claiming_other": false
    }));
    let visible = england.visible_sections(&declined, today());
    assert!(!visible.contains(&SectionId::Arrears));
    assert!(!visible.contains(&SectionId::Damages));
    assert!(!visible.contains(&SectionId::OtherCharges));
    assert!(visible.contains(&SectionId::ClaimType));

    let scotland = SectionTable::for_product(Product::MoneyClaim, Jurisdiction::Scotland);
    assert!(!scotland
        .visible_sections(&case, today())
        .contains(&SectionId::PreAction));
}

#[test]
fn money_claim_requires_at_least_one_head() {
    let table = SectionTable::for_product(Product::MoneyClaim, Jurisdiction::England);
    let case = facts(json!({
        "claiming_rent_arrears": false,
        "claiming_damages": "no",
        "claiming_other": false
    }));

    assert_eq!(table.blockers(SectionId::ClaimType, &case, today()).len(), 1);
    assert!(!table.is_complete(SectionId::ClaimType, &case, today()));
}

#[test]
fn money_claim_court_limits_follow_the_claim_total() {
    let table = SectionTable::for_product(Product::MoneyClaim, Jurisdiction::England);
    let mut case = money_claim_case();
    case.set("money_claim.court_name", json!("Manchester County Court"));
    assert!(table.is_complete(SectionId::Court, &case, today()));

    case.set("issues.rent_arrears.arrears_items", json!([]));
    case.set("issues.rent_arrears.total_arrears", json!(12_500));
    assert!(table
        .warnings(SectionId::Court, &case, today())
        .iter()
        .any(|warning| warning.contains("£10,000.00")));

    case.set("issues.rent_arrears.total_arrears", json!(150_000));
    assert_eq!(table.blockers(SectionId::Court, &case, today()).len(), 1);
}

#[test]
fn tenancy_agreement_deposit_is_capped_at_five_weeks() {
    let table = SectionTable::for_product(Product::TenancyAgreement, Jurisdiction::England);
    let mut case = facts(json!({
        "tenancy_start_date": "2027-01-01",
        "rent_amount": 1300,
        "rent_frequency": "monthly",
        "deposit_amount": 1600,
        "deposit_scheme_name": "TDS"
    }));

    assert!(table.blockers(SectionId::Tenancy, &case, today()).is_empty());
    let blockers = table.blockers(SectionId::Deposit, &case, today());
    assert_eq!(blockers.len(), 1);
    assert!(blockers[0].contains("£1,500.00"));

    case.set("deposit_amount", json!(1500));
    assert!(table.is_complete(SectionId::Deposit, &case, today()));
}

#[test]
fn rules_are_total_over_malformed_facts() {
    let garbage = facts(json!({
        "eviction_route": ["section_8"],
        "tenancy_start_date": 20240101,
        "rent_amount": "lots",
        "rent_frequency": { "every": "month" },
        "section8_grounds": "eight",
        "deposit_taken": "perhaps",
        "issues": { "rent_arrears": { "arrears_items": "none", "total_arrears": null } },
        "evidence": { "files": [{ "name": "missing id" }, 7] },
        "money_claim": { "damage_items": [null, { "amount": "-5" }] }
    }));
    let enormous = facts(json!({
        "eviction_route": "section_8",
        "tenancy_start_date": "2024-01-01",
        "rent_amount": 9.0e16,
        "rent_frequency": "weekly",
        "deposit_taken": true,
        "deposit_amount": 9.0e16,
        "section8_grounds": ["8"],
        "issues": { "rent_arrears": { "total_arrears": 100 } },
        "claiming_rent_arrears": true,
        "money_claim": { "damage_items": [{ "amount": 9.0e16 }, { "amount": 9.0e16 }] }
    }));

    for (case, product) in [&garbage, &enormous].into_iter().flat_map(|case| {
        [
            Product::NoticeOnly,
            Product::CompletePack,
            Product::MoneyClaim,
            Product::TenancyAgreement,
        ]
        .map(|product| (case, product))
    }) {
        for jurisdiction in Jurisdiction::ordered() {
            let table = SectionTable::for_product(product, jurisdiction);
            let report = table.evaluate(case, today());
            assert!(!report.visible.is_empty());
            assert!(report.progress_percent <= 100);
            for id in SectionId::ALL {
                let _ = table.is_complete(id, case, today());
                let _ = table.blockers(id, case, today());
                let _ = table.warnings(id, case, today());
            }
        }
    }
}

#[test]
fn unreadable_evidence_records_produce_a_warning() {
    let table = SectionTable::for_product(Product::CompletePack, Jurisdiction::England);
    let mut case = section8_case();
    case.set("evidence.files", json!([{ "name": "no id" }]));

    assert!(!table.is_complete(SectionId::Evidence, &case, today()));
    let warnings = table.warnings(SectionId::Evidence, &case, today());
    assert!(warnings.iter().any(|warning| warning.contains("rent statement")));
    assert!(warnings.iter().any(|warning| warning.contains("could not be read")));

    case.set("evidence.not_available", json!(true));
    assert!(table.is_complete(SectionId::Evidence, &case, today()));
}
