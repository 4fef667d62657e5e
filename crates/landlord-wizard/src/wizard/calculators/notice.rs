use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::wizard::domain::Route;
use crate::wizard::reference::resolve_grounds;

/// Suggested notice expiry for the chosen route and grounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeSuggestion {
    pub route: Route,
    pub served_on: NaiveDate,
    pub minimum_days: u32,
    pub expiry: NaiveDate,
    /// Ground whose notice period governs the expiry, if any.
    pub governing_ground: Option<&'static str>,
}

fn route_default_days(route: Route) -> u32 {
    match route {
        Route::Section21 => 60,
        Route::Section8 => 14,
        Route::Section173 => 182,
        Route::FaultBased => 30,
        Route::NoticeToLeave => 28,
    }
}

/// The longest notice period among the selected grounds. Adding grounds can
/// only lengthen the notice; unknown grounds are ignored and routes without
/// grounds use their statutory default.
pub fn minimum_notice_days(route: Route, grounds: &[String]) -> (u32, Option<&'static str>) {
    match route {
        Route::Section21 | Route::Section173 => (route_default_days(route), None),
        Route::Section8 | Route::FaultBased | Route::NoticeToLeave => {
            let (known, _) = resolve_grounds(route.jurisdiction(), grounds);
            known
                .iter()
                .max_by_key(|ground| ground.notice_days)
                .map(|ground| (ground.notice_days, Some(ground.code)))
                .unwrap_or((route_default_days(route), None))
        }
    }
}

pub fn suggest_notice_expiry(
    route: Route,
    grounds: &[String],
    served_on: NaiveDate,
) -> NoticeSuggestion {
    let (minimum_days, governing_ground) = minimum_notice_days(route, grounds);
    let expiry = served_on
        .checked_add_signed(Duration::days(i64::from(minimum_days)))
        .unwrap_or(NaiveDate::MAX);

    NoticeSuggestion {
        route,
        served_on,
        minimum_days,
        expiry,
        governing_ground,
    }
}
