use serde::Serialize;

use crate::wizard::domain::{Jurisdiction, Pence, RentFrequency};

const ENGLAND_HIGH_RENT_THRESHOLD: Pence = Pence(5_000_000);

/// Maximum tenancy deposit permitted for the rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepositCap {
    pub maximum: Pence,
    pub basis: &'static str,
}

/// England caps deposits at five weeks' rent (six weeks once annual rent
/// reaches £50,000), Scotland at two months' rent. Wales has no cap.
pub fn deposit_cap(
    jurisdiction: Jurisdiction,
    rent: Pence,
    frequency: RentFrequency,
) -> Option<DepositCap> {
    if !rent.is_positive() {
        return None;
    }

    match jurisdiction {
        Jurisdiction::England => {
            let annual = frequency.annual(rent);
            let (weeks, basis) = if annual >= ENGLAND_HIGH_RENT_THRESHOLD {
                (6, "6 weeks' rent")
            } else {
                (5, "5 weeks' rent")
            };
            // rounded up to the penny
            let maximum = Pence(annual.0.saturating_mul(weeks).saturating_add(51) / 52);
            Some(DepositCap { maximum, basis })
        }
        Jurisdiction::Scotland => Some(DepositCap {
            maximum: frequency.monthly_equivalent(rent).times(2),
            basis: "2 months' rent",
        }),
        Jurisdiction::Wales => None,
    }
}
