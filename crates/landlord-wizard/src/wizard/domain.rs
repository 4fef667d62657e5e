use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// UK legal systems the wizard produces documents for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    England,
    Wales,
    Scotland,
}

impl Jurisdiction {
    pub const fn ordered() -> [Self; 3] {
        [Self::England, Self::Wales, Self::Scotland]
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "england" => Some(Self::England),
            "wales" => Some(Self::Wales),
            "scotland" => Some(Self::Scotland),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::England => "england",
            Self::Wales => "wales",
            Self::Scotland => "scotland",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::England => "England",
            Self::Wales => "Wales",
            Self::Scotland => "Scotland",
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Document bundles sold through the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    NoticeOnly,
    CompletePack,
    MoneyClaim,
    TenancyAgreement,
}

impl Product {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "notice_only" | "notice" => Some(Self::NoticeOnly),
            "complete_pack" | "eviction_pack" => Some(Self::CompletePack),
            "money_claim" => Some(Self::MoneyClaim),
            "tenancy_agreement" | "ast" | "prt" => Some(Self::TenancyAgreement),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoticeOnly => "notice_only",
            Self::CompletePack => "complete_pack",
            Self::MoneyClaim => "money_claim",
            Self::TenancyAgreement => "tenancy_agreement",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoticeOnly => "Notice Only",
            Self::CompletePack => "Complete Eviction Pack",
            Self::MoneyClaim => "Money Claim",
            Self::TenancyAgreement => "Tenancy Agreement",
        }
    }

    /// Case type reported to the persistence collaborator.
    pub const fn case_type(self) -> &'static str {
        match self {
            Self::NoticeOnly | Self::CompletePack => "eviction",
            Self::MoneyClaim => "money_claim",
            Self::TenancyAgreement => "tenancy_agreement",
        }
    }

    pub const fn is_eviction(self) -> bool {
        matches!(self, Self::NoticeOnly | Self::CompletePack)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Possession route chosen on the case basics section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[serde(rename = "section_21")]
    Section21,
    #[serde(rename = "section_8")]
    Section8,
    #[serde(rename = "section_173")]
    Section173,
    FaultBased,
    NoticeToLeave,
}

impl Route {
    pub const ALL: [Self; 5] = [
        Self::Section21,
        Self::Section8,
        Self::Section173,
        Self::FaultBased,
        Self::NoticeToLeave,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "section_21" | "section21" | "s21" => Some(Self::Section21),
            "section_8" | "section8" | "s8" => Some(Self::Section8),
            "section_173" | "section173" | "s173" => Some(Self::Section173),
            "fault_based" | "wales_fault_based" => Some(Self::FaultBased),
            "notice_to_leave" | "ntl" => Some(Self::NoticeToLeave),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Section21 => "section_21",
            Self::Section8 => "section_8",
            Self::Section173 => "section_173",
            Self::FaultBased => "fault_based",
            Self::NoticeToLeave => "notice_to_leave",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Section21 => "Section 21 (no-fault)",
            Self::Section8 => "Section 8 (grounds-based)",
            Self::Section173 => "Section 173 (no-fault, Wales)",
            Self::FaultBased => "Fault-based possession (Wales)",
            Self::NoticeToLeave => "Notice to Leave",
        }
    }

    pub const fn jurisdiction(self) -> Jurisdiction {
        match self {
            Self::Section21 | Self::Section8 => Jurisdiction::England,
            Self::Section173 | Self::FaultBased => Jurisdiction::Wales,
            Self::NoticeToLeave => Jurisdiction::Scotland,
        }
    }

    pub fn available_in(self, jurisdiction: Jurisdiction) -> bool {
        self.jurisdiction() == jurisdiction
    }
}

/// Three-valued answer for yes/no questions the user may not have reached yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    #[default]
    Unanswered,
    Yes,
    No,
}

impl Answer {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(true)) => Self::Yes,
            Some(Value::Bool(false)) => Self::No,
            Some(Value::String(raw)) => match normalize_token(raw).as_str() {
                "yes" | "true" | "y" => Self::Yes,
                "no" | "false" | "n" => Self::No,
                _ => Self::Unanswered,
            },
            _ => Self::Unanswered,
        }
    }

    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }

    pub const fn is_no(self) -> bool {
        matches!(self, Self::No)
    }

    pub const fn is_answered(self) -> bool {
        !matches!(self, Self::Unanswered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentFrequency {
    Weekly,
    Fortnightly,
    FourWeekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RentFrequency {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "weekly" | "week" => Some(Self::Weekly),
            "fortnightly" | "fortnight" | "two_weekly" => Some(Self::Fortnightly),
            "four_weekly" | "4_weekly" | "every_four_weeks" => Some(Self::FourWeekly),
            "monthly" | "month" | "pcm" => Some(Self::Monthly),
            "quarterly" | "quarter" => Some(Self::Quarterly),
            "yearly" | "annually" | "annual" => Some(Self::Yearly),
            _ => None,
        }
    }

    pub const fn periods_per_year(self) -> i64 {
        match self {
            Self::Weekly => 52,
            Self::Fortnightly => 26,
            Self::FourWeekly => 13,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Yearly => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Fortnightly => "fortnightly",
            Self::FourWeekly => "four-weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn annual(self, rent: Pence) -> Pence {
        Pence(rent.0.saturating_mul(self.periods_per_year()))
    }

    pub fn monthly_equivalent(self, rent: Pence) -> Pence {
        Pence(div_round(self.annual(rent).0, 12))
    }

    pub fn weekly_equivalent(self, rent: Pence) -> Pence {
        Pence(div_round(self.annual(rent).0, 52))
    }
}

/// Sterling amount held in whole pence so threshold comparisons are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pence(pub i64);

impl Pence {
    pub const ZERO: Pence = Pence(0);

    pub fn from_pounds(pounds: f64) -> Option<Self> {
        if !pounds.is_finite() {
            return None;
        }
        let pence = (pounds * 100.0).round();
        if pence.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Self(pence as i64))
    }

    pub fn pounds(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn saturating_add(self, other: Pence) -> Pence {
        Pence(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Pence) -> Pence {
        Pence(self.0.saturating_sub(other.0))
    }

    pub fn times(self, factor: i64) -> Pence {
        Pence(self.0.saturating_mul(factor))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl std::iter::Sum for Pence {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Pence::ZERO, Pence::saturating_add)
    }
}

impl fmt::Display for Pence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let pounds = (abs / 100).to_string();
        let pence = abs % 100;

        let mut grouped = String::with_capacity(pounds.len() + pounds.len() / 3);
        for (idx, ch) in pounds.chars().enumerate() {
            if idx > 0 && (pounds.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{sign}£{grouped}.{pence:02}")
    }
}

fn div_round(value: i64, divisor: i64) -> i64 {
    let half = divisor / 2;
    if value >= 0 {
        value.saturating_add(half) / divisor
    } else {
        value.saturating_sub(half) / divisor
    }
}

pub(crate) fn normalize_token(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|ch| match ch {
            '-' | ' ' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_reads_booleans_and_strings() {
        assert_eq!(Answer::from_value(Some(&json!(true))), Answer::Yes);
        assert_eq!(Answer::from_value(Some(&json!("No"))), Answer::No);
        assert_eq!(Answer::from_value(Some(&json!(null))), Answer::Unanswered);
        assert_eq!(Answer::from_value(Some(&json!(1))), Answer::Unanswered);
        assert_eq!(Answer::from_value(None), Answer::Unanswered);
    }

    #[test]
    fn routes_belong_to_one_jurisdiction() {
        assert!(Route::Section21.available_in(Jurisdiction::England));
        assert!(!Route::Section21.available_in(Jurisdiction::Scotland));
        assert_eq!(Route::parse("Notice-To-Leave"), Some(Route::NoticeToLeave));
        assert_eq!(Route::parse("section 8"), Some(Route::Section8));
    }

    #[test]
    fn pence_formats_with_grouping() {
        assert_eq!(Pence(190_000).to_string(), "£1,900.00");
        assert_eq!(Pence(5).to_string(), "£0.05");
        assert_eq!(Pence(123_456_789).to_string(), "£1,234,567.89");
        assert_eq!(Pence(-2_050).to_string(), "-£20.50");
    }

    #[test]
    fn conversions_saturate_instead_of_overflowing() {
        let huge = Pence::from_pounds(9.0e16).expect("finite amount");
        assert_eq!(RentFrequency::Weekly.annual(huge), Pence(i64::MAX));
        assert_eq!(
            RentFrequency::Weekly.monthly_equivalent(huge),
            Pence(i64::MAX / 12)
        );
        assert_eq!(
            RentFrequency::Monthly.weekly_equivalent(Pence(i64::MIN)),
            Pence(i64::MIN / 52)
        );
    }

    #[test]
    fn weekly_rent_converts_to_monthly_equivalent() {
        let monthly = RentFrequency::Weekly.monthly_equivalent(Pence(30_000));
        assert_eq!(monthly, Pence(130_000));
        let weekly = RentFrequency::Monthly.weekly_equivalent(Pence(130_000));
        assert_eq!(weekly, Pence(30_000));
    }
}
