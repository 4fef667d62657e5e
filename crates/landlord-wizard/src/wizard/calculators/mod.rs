//! Date and money arithmetic used by individual sections.

mod deposit;
mod ground8;
mod notice;
mod six_month;

pub use deposit::{deposit_cap, DepositCap};
pub use ground8::{validate_ground8_eligibility, Ground8Assessment};
pub use notice::{minimum_notice_days, suggest_notice_expiry, NoticeSuggestion};
pub use six_month::{earliest_date_after_months, SixMonthRule, SECTION21_MIN_MONTHS};
