use crate::infra::{parse_date, InMemoryFactsRepository};
use chrono::{Local, NaiveDate};
use clap::Args;
use landlord_wizard::error::AppError;
use landlord_wizard::wizard::arrears::import_ledger_path;
use landlord_wizard::wizard::router::{parse_jurisdiction, parse_product};
use landlord_wizard::wizard::{
    suggest_notice_expiry, ArrearsItem, ArrearsSchedule, CaseFacts, CaseId, Ground8Assessment,
    Jurisdiction, Product, Route, SectionId, SectionTable, SessionError, SessionOptions,
    TracingAnalytics, WizardReport, WizardSession,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON file holding the case facts
    #[arg(long)]
    pub(crate) facts: PathBuf,
    /// Product being drafted (notice_only, complete_pack, money_claim, tenancy_agreement)
    #[arg(long, value_parser = parse_product)]
    pub(crate) product: Product,
    /// Jurisdiction of the property (england, wales, scotland)
    #[arg(long, value_parser = parse_jurisdiction)]
    pub(crate) jurisdiction: Jurisdiction,
    /// Evaluation date for date-sensitive rules (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Rent ledger CSV replacing the arrears schedule in the facts file
    #[arg(long)]
    pub(crate) arrears_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Rent ledger CSV used for the arrears section
    #[arg(long)]
    pub(crate) arrears_csv: Option<PathBuf>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        facts,
        product,
        jurisdiction,
        today,
        arrears_csv,
    } = args;

    let raw = std::fs::read_to_string(&facts)?;
    let value: serde_json::Value = serde_json::from_str(&raw).map_err(std::io::Error::from)?;
    let mut facts = CaseFacts::from_value(value);
    if let Some(path) = arrears_csv {
        apply_ledger(&mut facts, path)?;
    }

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let report = SectionTable::for_product(product, jurisdiction).evaluate(&facts, today);
    let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, arrears_csv } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let repository = Arc::new(InMemoryFactsRepository::default());
    let case_id = CaseId("demo-section8".to_string());
    let options = SessionOptions {
        save_debounce: Duration::from_millis(100),
        today: Some(today),
        ..SessionOptions::default()
    };
    let mut session = WizardSession::load(
        repository.clone(),
        case_id,
        Product::NoticeOnly,
        Jurisdiction::England,
        Arc::new(TracingAnalytics),
        options,
    )
    .await;

    println!("Landlord wizard demo: Section 8 notice (England), evaluated on {today}");
    session.update(&demo_case_facts(today))?;
    match arrears_csv {
        Some(path) => {
            let mut patch = CaseFacts::new();
            apply_ledger(&mut patch, path)?;
            session.update(&patch.into_value())?;
            println!("Arrears schedule: imported from rent ledger");
        }
        None => {
            session.update(&demo_arrears().to_facts_patch())?;
            println!("Arrears schedule: built-in three month sample");
        }
    }

    render_report(&session.report());

    if let Some(assessment) = Ground8Assessment::from_facts(session.facts()) {
        println!(
            "\nGround 8: {} owed against a {} threshold ({:.1} months) -> {}",
            assessment.total_arrears,
            assessment.threshold,
            assessment.months_in_arrears,
            if assessment.eligible {
                "eligible"
            } else {
                "not eligible"
            }
        );
    }

    let grounds = session.facts().string_list("section8_grounds");
    if let Some(served_on) = session.facts().date("notice_served_date") {
        let suggestion = suggest_notice_expiry(Route::Section8, &grounds, served_on);
        println!(
            "Notice: {} days minimum, expiry no earlier than {}",
            suggestion.minimum_days, suggestion.expiry
        );
    }

    println!("\nWalking the wizard");
    while session.current_section() != Some(SectionId::Review) {
        let from = session.current_section();
        match session.next() {
            Ok(section) => println!("  {} -> {}", describe(from), section),
            Err(SessionError::Navigation(err)) => {
                println!("  stopped at {}: {}", describe(from), err);
                session.close().await?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    }

    let handoff = session.complete().await?;
    println!(
        "Completed at {}% progress; continue at {}",
        session.snapshot().progress_percent,
        handoff.redirect_path
    );
    println!("Cases stored: {}", repository.len());
    session.close().await?;
    Ok(())
}

fn apply_ledger(facts: &mut CaseFacts, path: PathBuf) -> Result<(), AppError> {
    let schedule = ArrearsSchedule {
        items: import_ledger_path(path)?,
        declared_total: None,
    };
    facts.merge_value(&schedule.to_facts_patch());
    Ok(())
}

fn describe(section: Option<SectionId>) -> String {
    section
        .map(|section| section.to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

fn render_report(report: &WizardReport) {
    println!(
        "\nSections ({} of {} complete, {}%)",
        report.completed,
        report.visible.len(),
        report.progress_percent
    );
    for section in report.sections.iter().filter(|section| section.visible) {
        let marker = if section.complete { "x" } else { " " };
        println!("  [{marker}] {}", section.label);
        for blocker in &section.blockers {
            println!("      blocker: {blocker}");
        }
        for warning in &section.warnings {
            println!("      warning: {warning}");
        }
    }
}

fn demo_case_facts(today: NaiveDate) -> serde_json::Value {
    let served = today - chrono::Duration::days(17);
    let expiry = served + chrono::Duration::days(14);
    json!({
        "eviction_route": "section_8",
        "landlord_full_name": "Priya Landlord",
        "landlord_address_line1": "1 High Street",
        "landlord_address_postcode": "M1 1AE",
        "tenant_full_name": "Sam Tenant",
        "property_address_line1": "22 Acacia Avenue",
        "property_address_postcode": "M14 5RT",
        "tenancy_start_date": "2024-01-01",
        "rent_amount": 1000,
        "rent_frequency": "monthly",
        "section8_grounds": ["8", "10"],
        "section8_particulars": "Rent unpaid for three consecutive months",
        "notice_served_date": served.to_string(),
        "notice_service_method": "first_class_post",
        "notice_expiry_date": expiry.to_string()
    })
}

fn demo_arrears() -> ArrearsSchedule {
    let items = (1..=3)
        .map(|month| {
            ArrearsItem::from_value(&json!({
                "period_start": format!("2026-0{}-01", month + 5),
                "rent_due": 1000,
                "rent_paid": 0
            }))
        })
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();
    ArrearsSchedule {
        items,
        declared_total: None,
    }
}
