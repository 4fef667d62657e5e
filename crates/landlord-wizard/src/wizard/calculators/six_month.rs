use chrono::{Months, NaiveDate};
use serde::Serialize;

/// A Section 21 notice cannot be served in the first four months of an
/// assured shorthold tenancy.
pub const SECTION21_MIN_MONTHS: u32 = 4;

/// First date on which `months` calendar months have elapsed since `start`.
pub fn earliest_date_after_months(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(months))
}

/// Six calendar months must pass after the tenancy starts before notice can
/// be served (Scotland Notice to Leave, Wales section 173).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SixMonthRule {
    pub tenancy_start: NaiveDate,
    pub earliest_service: NaiveDate,
    pub satisfied: bool,
}

impl SixMonthRule {
    pub const MONTHS: u32 = 6;

    pub fn evaluate(tenancy_start: NaiveDate, on: NaiveDate) -> Self {
        Self::with_months(tenancy_start, on, Self::MONTHS)
    }

    pub fn with_months(tenancy_start: NaiveDate, on: NaiveDate, months: u32) -> Self {
        let earliest_service =
            earliest_date_after_months(tenancy_start, months).unwrap_or(NaiveDate::MAX);
        Self {
            tenancy_start,
            earliest_service,
            satisfied: on >= earliest_service,
        }
    }
}
