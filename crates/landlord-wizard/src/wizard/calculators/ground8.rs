use serde::Serialize;

use crate::wizard::arrears::ArrearsSchedule;
use crate::wizard::domain::{Pence, RentFrequency};
use crate::wizard::facts::CaseFacts;

/// Outcome of the Ground 8 (serious rent arrears) threshold check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ground8Assessment {
    pub total_arrears: Pence,
    pub threshold: Pence,
    pub rent_amount: Pence,
    pub rent_frequency: RentFrequency,
    /// Arrears expressed as months of rent at the monthly-equivalent rate.
    pub months_in_arrears: f64,
    pub eligible: bool,
}

impl Ground8Assessment {
    /// Assess from facts; `None` until rent and frequency are answered.
    pub fn from_facts(facts: &CaseFacts) -> Option<Self> {
        let rent = facts.rent_amount()?;
        let frequency = facts.rent_frequency()?;
        let schedule = ArrearsSchedule::from_facts(facts);
        Some(validate_ground8_eligibility(rent, frequency, &schedule))
    }

    pub fn shortfall(&self) -> Pence {
        Pence(self.threshold.saturating_sub(self.total_arrears).0.max(0))
    }
}

/// Statutory minimum unpaid rent for Ground 8: eight weeks' rent for weekly
/// and fortnightly tenancies, two months' rent for monthly ones, one quarter
/// for quarterly and three months' rent for yearly rent.
pub fn ground8_threshold(rent: Pence, frequency: RentFrequency) -> Pence {
    match frequency {
        RentFrequency::Weekly => rent.times(8),
        RentFrequency::Fortnightly => rent.times(4),
        RentFrequency::FourWeekly => rent.times(2),
        RentFrequency::Monthly => rent.times(2),
        RentFrequency::Quarterly => rent,
        RentFrequency::Yearly => Pence(rent.0.saturating_add(3) / 4),
    }
}

pub fn validate_ground8_eligibility(
    rent: Pence,
    frequency: RentFrequency,
    schedule: &ArrearsSchedule,
) -> Ground8Assessment {
    let total_arrears = schedule.total();
    let threshold = ground8_threshold(rent, frequency);
    let monthly = frequency.monthly_equivalent(rent);
    let months_in_arrears = if monthly.is_positive() {
        total_arrears.0 as f64 / monthly.0 as f64
    } else {
        0.0
    };

    Ground8Assessment {
        total_arrears,
        threshold,
        rent_amount: rent,
        rent_frequency: frequency,
        months_in_arrears,
        eligible: threshold.is_positive() && total_arrears >= threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facts_with_arrears(rent: f64, frequency: &str, owed: &[f64]) -> CaseFacts {
        let items: Vec<_> = owed
            .iter()
            .map(|amount| json!({ "amount_owed": amount }))
            .collect();
        CaseFacts::from_value(json!({
            "rent_amount": rent,
            "rent_frequency": frequency,
            "issues": { "rent_arrears": { "arrears_items": items } }
        }))
    }

    #[test]
    fn just_under_two_months_is_not_eligible() {
        let facts = facts_with_arrears(1000.0, "monthly", &[1000.0, 900.0]);
        let assessment = Ground8Assessment::from_facts(&facts).expect("rent answered");
        assert!(!assessment.eligible);
        assert_eq!(assessment.total_arrears, Pence(190_000));
        assert_eq!(assessment.shortfall(), Pence(10_000));
    }

    #[test]
    fn exactly_two_months_is_eligible() {
        let facts = facts_with_arrears(1000.0, "monthly", &[1000.0, 1000.0]);
        let assessment = Ground8Assessment::from_facts(&facts).expect("rent answered");
        assert!(assessment.eligible);
        assert!((assessment.months_in_arrears - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weekly_rent_needs_eight_weeks() {
        let seven_weeks = facts_with_arrears(200.0, "weekly", &[1400.0]);
        let eight_weeks = facts_with_arrears(200.0, "weekly", &[1600.0]);
        assert!(!Ground8Assessment::from_facts(&seven_weeks).expect("answered").eligible);
        assert!(Ground8Assessment::from_facts(&eight_weeks).expect("answered").eligible);
    }

    #[test]
    fn quarterly_and_yearly_thresholds() {
        assert_eq!(ground8_threshold(Pence(300_000), RentFrequency::Quarterly), Pence(300_000));
        assert_eq!(ground8_threshold(Pence(1_200_000), RentFrequency::Yearly), Pence(300_000));
        assert_eq!(ground8_threshold(Pence(i64::MAX), RentFrequency::Yearly), Pence(i64::MAX / 4));
    }

    #[test]
    fn enormous_rent_is_assessed_without_overflow() {
        let facts = facts_with_arrears(9.0e16, "weekly", &[100.0]);
        let assessment = Ground8Assessment::from_facts(&facts).expect("rent answered");
        assert!(!assessment.eligible);
        assert_eq!(assessment.threshold, Pence(i64::MAX));
    }

    #[test]
    fn missing_rent_defers_assessment() {
        let facts = CaseFacts::from_value(json!({ "rent_frequency": "monthly" }));
        assert!(Ground8Assessment::from_facts(&facts).is_none());
    }
}
