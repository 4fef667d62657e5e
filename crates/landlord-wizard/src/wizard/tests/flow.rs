use serde_json::json;

use super::common::*;
use crate::wizard::domain::{Jurisdiction, Product};
use crate::wizard::facts::CaseFacts;
use crate::wizard::flow::{FlowController, FlowState, NavigationError};
use crate::wizard::sections::{SectionId, SectionTable};

fn started(product: Product, jurisdiction: Jurisdiction, facts: &CaseFacts) -> FlowController {
    let mut flow = FlowController::new(SectionTable::for_product(product, jurisdiction));
    flow.start(facts, today());
    flow
}

#[test]
fn navigation_is_rejected_while_loading() {
    let mut flow = FlowController::new(SectionTable::for_product(
        Product::NoticeOnly,
        Jurisdiction::England,
    ));

    assert_eq!(flow.state(), FlowState::Loading);
    assert_eq!(flow.current(), None);
    assert_eq!(
        flow.next(&CaseFacts::new(), today()),
        Err(NavigationError::NotStarted)
    );
    assert_eq!(flow.back(), Err(NavigationError::NotStarted));
}

#[test]
fn next_is_refused_while_the_section_has_blockers() {
    let facts = facts(json!({ "eviction_route": "notice_to_leave" }));
    let mut flow = started(Product::NoticeOnly, Jurisdiction::England, &facts);

    match flow.next(&facts, today()) {
        Err(NavigationError::Blocked { section, blockers }) => {
            assert_eq!(section, SectionId::CaseBasics);
            assert_eq!(blockers.len(), 1);
        }
        other => panic!("expected blocked navigation, got {other:?}"),
    }
    assert_eq!(flow.current(), Some(SectionId::CaseBasics));
}

#[test]
fn incomplete_sections_can_still_be_skipped() {
    let facts = facts(json!({ "eviction_route": "section_8" }));
    let mut flow = started(Product::NoticeOnly, Jurisdiction::England, &facts);
    flow.jump_to(SectionId::Parties).expect("parties visible");

    let outcome = flow.next(&facts, today()).expect("no blockers on parties");
    assert_eq!(outcome.from, SectionId::Parties);
    assert_eq!(outcome.to, SectionId::Property);
    assert!(!outcome.was_complete);
    assert!(!outcome.first_completion);
}

#[test]
fn first_completion_is_reported_once_per_section() {
    let case = section8_case();
    let mut flow = started(Product::NoticeOnly, Jurisdiction::England, &case);

    let first = flow.next(&case, today()).expect("case basics complete");
    assert!(first.was_complete);
    assert!(first.first_completion);
    assert_eq!(first.from_index, 0);
    assert_eq!(first.total, 8);

    flow.back().expect("back to case basics");
    let again = flow.next(&case, today()).expect("still complete");
    assert!(again.was_complete);
    assert!(!again.first_completion);
}

#[test]
fn hiding_the_current_section_clamps_to_a_visible_one() {
    let mut case = section8_case();
    let mut flow = started(Product::NoticeOnly, Jurisdiction::England, &case);
    flow.jump_to(SectionId::Arrears).expect("arrears visible");
    assert_eq!(flow.current_index(), 5);

    case.set("section8_grounds", json!(["14"]));
    flow.refresh(&case, today());
    assert!(!flow.visible().contains(&SectionId::Arrears));
    assert_eq!(flow.current(), Some(SectionId::Notice));

    case.set("eviction_route", json!(null));
    flow.refresh(&case, today());
    assert_eq!(flow.visible(), &[SectionId::CaseBasics]);
    assert_eq!(flow.current(), Some(SectionId::CaseBasics));
}

#[test]
fn refresh_keeps_the_current_section_when_earlier_ones_appear() {
    let mut case = section8_case();
    case.set("section8_grounds", json!(["14"]));
    let mut flow = started(Product::NoticeOnly, Jurisdiction::England, &case);
    flow.jump_to(SectionId::Notice).expect("notice visible");

    case.set("section8_grounds", json!(["8"]));
    flow.refresh(&case, today());
    assert!(flow.visible().contains(&SectionId::Arrears));
    assert_eq!(flow.current(), Some(SectionId::Notice));
}

#[test]
fn boundaries_and_hidden_targets_are_errors() {
    let case = section8_case();
    let mut flow = started(Product::NoticeOnly, Jurisdiction::England, &case);

    assert_eq!(flow.back(), Err(NavigationError::AtStart));
    assert_eq!(
        flow.jump_to(SectionId::Section21Compliance),
        Err(NavigationError::NotVisible(SectionId::Section21Compliance))
    );

    flow.jump_to(SectionId::Review).expect("review visible");
    assert_eq!(flow.next(&case, today()), Err(NavigationError::AtEnd));
}

#[test]
fn completion_requires_review_and_every_section_complete() {
    let mut case = section8_case();
    let mut flow = started(Product::NoticeOnly, Jurisdiction::England, &case);

    assert_eq!(
        flow.complete(&case, today()),
        Err(NavigationError::NotOnReview(SectionId::CaseBasics))
    );

    flow.jump_to(SectionId::Review).expect("review visible");
    case.set("notice_service_method", json!(""));
    assert_eq!(
        flow.complete(&case, today()),
        Err(NavigationError::Incomplete(vec![SectionId::Notice]))
    );

    case.set("notice_service_method", json!("hand"));
    flow.complete(&case, today()).expect("complete");
    assert_eq!(flow.state(), FlowState::Completed);
    assert_eq!(flow.back(), Err(NavigationError::AlreadyCompleted));
}

#[test]
fn snapshot_reports_progress_for_the_visible_list() {
    let mut case = section8_case();
    case.set("notice_service_method", json!(""));
    let flow = started(Product::NoticeOnly, Jurisdiction::England, &case);

    let snapshot = flow.snapshot(&case, today());
    assert_eq!(snapshot.current, Some(SectionId::CaseBasics));
    assert_eq!(snapshot.visible.len(), 8);
    // notice and review are incomplete
    assert_eq!(snapshot.progress_percent, 75);
    assert!(snapshot.blockers.is_empty());
}
