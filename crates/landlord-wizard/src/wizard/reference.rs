//! Static lookup tables: possession grounds, deposit schemes, licensing options.

use serde::Serialize;

use super::domain::{normalize_token, Jurisdiction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundKind {
    Mandatory,
    Discretionary,
}

/// A statutory possession ground and the notice it requires.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GroundDefinition {
    pub code: &'static str,
    pub title: &'static str,
    pub kind: GroundKind,
    pub notice_days: u32,
    pub arrears_related: bool,
}

impl GroundDefinition {
    pub fn label(&self, jurisdiction: Jurisdiction) -> String {
        match jurisdiction {
            Jurisdiction::Wales => format!("Section {} ({})", self.code, self.title),
            _ => format!("Ground {} ({})", self.code.to_ascii_uppercase(), self.title),
        }
    }
}

const fn ground(
    code: &'static str,
    title: &'static str,
    kind: GroundKind,
    notice_days: u32,
    arrears_related: bool,
) -> GroundDefinition {
    GroundDefinition {
        code,
        title,
        kind,
        notice_days,
        arrears_related,
    }
}

use GroundKind::{Discretionary, Mandatory};

/// Housing Act 1988, Schedule 2.
pub const ENGLAND_GROUNDS: &[GroundDefinition] = &[
    ground("1", "Landlord requires the property as a home", Mandatory, 60, false),
    ground("2", "Mortgage lender requires possession", Mandatory, 60, false),
    ground("3", "Out-of-season holiday let", Mandatory, 14, false),
    ground("4", "Student let by an educational institution", Mandatory, 14, false),
    ground("5", "Required for a minister of religion", Mandatory, 60, false),
    ground("6", "Redevelopment of the property", Mandatory, 60, false),
    ground("7", "Death of the tenant", Mandatory, 60, false),
    ground("7a", "Serious anti-social behaviour", Mandatory, 28, false),
    ground("7b", "Tenant has no right to rent", Mandatory, 14, false),
    ground("8", "Serious rent arrears", Mandatory, 14, true),
    ground("9", "Suitable alternative accommodation", Discretionary, 60, false),
    ground("10", "Some rent arrears", Discretionary, 14, true),
    ground("11", "Persistent delay in paying rent", Discretionary, 14, true),
    ground("12", "Breach of tenancy obligation", Discretionary, 14, false),
    ground("13", "Deterioration of the property", Discretionary, 14, false),
    ground("14", "Nuisance or anti-social behaviour", Discretionary, 0, false),
    ground("14a", "Domestic violence", Discretionary, 14, false),
    ground("15", "Deterioration of furniture", Discretionary, 14, false),
    ground("16", "Former employee", Discretionary, 60, false),
    ground("17", "Tenancy obtained by false statement", Discretionary, 14, false),
];

/// Private Housing (Tenancies) (Scotland) Act 2016, Schedule 3. Every ground is
/// decided by the First-tier Tribunal on reasonableness.
pub const SCOTLAND_GROUNDS: &[GroundDefinition] = &[
    ground("1", "Landlord intends to sell", Discretionary, 84, false),
    ground("2", "Property to be sold by lender", Discretionary, 84, false),
    ground("3", "Landlord intends to refurbish", Discretionary, 84, false),
    ground("4", "Landlord intends to live in the property", Discretionary, 84, false),
    ground("5", "Family member intends to live in the property", Discretionary, 84, false),
    ground("6", "Landlord intends to use for non-residential purpose", Discretionary, 84, false),
    ground("7", "Property required for religious purpose", Discretionary, 84, false),
    ground("8", "Tenant no longer an employee", Discretionary, 84, false),
    ground("9", "Tenant no longer in need of supported accommodation", Discretionary, 84, false),
    ground("10", "Tenant not occupying the let property", Discretionary, 28, false),
    ground("11", "Breach of tenancy agreement", Discretionary, 28, false),
    ground("12", "Rent arrears", Discretionary, 28, true),
    ground("13", "Criminal behaviour", Discretionary, 28, false),
    ground("14", "Anti-social behaviour", Discretionary, 28, false),
    ground("15", "Association with a person with a relevant conviction", Discretionary, 28, false),
    ground("16", "Landlord has ceased to be registered", Discretionary, 84, false),
    ground("17", "HMO licence has been revoked", Discretionary, 84, false),
    ground("18", "Overcrowding statutory notice", Discretionary, 84, false),
];

/// Renting Homes (Wales) Act 2016 fault-based possession claims.
pub const WALES_GROUNDS: &[GroundDefinition] = &[
    ground("157", "Serious rent arrears", Mandatory, 14, true),
    ground("159", "Breach of occupation contract", Discretionary, 30, false),
    ground("161", "Anti-social behaviour", Discretionary, 0, false),
];

pub fn grounds_for(jurisdiction: Jurisdiction) -> &'static [GroundDefinition] {
    match jurisdiction {
        Jurisdiction::England => ENGLAND_GROUNDS,
        Jurisdiction::Wales => WALES_GROUNDS,
        Jurisdiction::Scotland => SCOTLAND_GROUNDS,
    }
}

/// Accepts `"Ground 8"`, `"ground_8"`, `"8"`, `"section_157"` and similar.
pub fn normalize_ground_code(raw: &str) -> String {
    let token = normalize_token(raw);
    let stripped = token
        .trim_start_matches("ground")
        .trim_start_matches("section")
        .trim_start_matches("s");
    stripped
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect()
}

pub fn find_ground(jurisdiction: Jurisdiction, raw: &str) -> Option<&'static GroundDefinition> {
    let code = normalize_ground_code(raw);
    grounds_for(jurisdiction)
        .iter()
        .find(|ground| ground.code == code)
}

/// Resolve selected grounds, separating the codes we do not recognise.
pub fn resolve_grounds(
    jurisdiction: Jurisdiction,
    selected: &[String],
) -> (Vec<&'static GroundDefinition>, Vec<String>) {
    let mut known: Vec<&'static GroundDefinition> = Vec::new();
    let mut unknown = Vec::new();
    for raw in selected {
        match find_ground(jurisdiction, raw) {
            Some(ground) => {
                if !known.iter().any(|existing| existing.code == ground.code) {
                    known.push(ground);
                }
            }
            None => unknown.push(raw.clone()),
        }
    }
    (known, unknown)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DepositScheme {
    pub code: &'static str,
    pub name: &'static str,
    pub jurisdictions: &'static [Jurisdiction],
}

const ENGLAND_AND_WALES: &[Jurisdiction] = &[Jurisdiction::England, Jurisdiction::Wales];
const SCOTLAND_ONLY: &[Jurisdiction] = &[Jurisdiction::Scotland];

pub const DEPOSIT_SCHEMES: &[DepositScheme] = &[
    DepositScheme {
        code: "dps",
        name: "Deposit Protection Service",
        jurisdictions: ENGLAND_AND_WALES,
    },
    DepositScheme {
        code: "mydeposits",
        name: "mydeposits",
        jurisdictions: ENGLAND_AND_WALES,
    },
    DepositScheme {
        code: "tds",
        name: "Tenancy Deposit Scheme",
        jurisdictions: ENGLAND_AND_WALES,
    },
    DepositScheme {
        code: "safedeposits_scotland",
        name: "SafeDeposits Scotland",
        jurisdictions: SCOTLAND_ONLY,
    },
    DepositScheme {
        code: "lps_scotland",
        name: "Letting Protection Service Scotland",
        jurisdictions: SCOTLAND_ONLY,
    },
    DepositScheme {
        code: "mydeposits_scotland",
        name: "mydeposits Scotland",
        jurisdictions: SCOTLAND_ONLY,
    },
];

/// Match a scheme by code or display name.
pub fn find_deposit_scheme(
    jurisdiction: Jurisdiction,
    raw: &str,
) -> Option<&'static DepositScheme> {
    let token = normalize_token(raw);
    DEPOSIT_SCHEMES.iter().find(|scheme| {
        scheme.jurisdictions.contains(&jurisdiction)
            && (scheme.code == token || normalize_token(scheme.name) == token)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LicensingOption {
    pub code: &'static str,
    pub label: &'static str,
    /// An unlicensed property that needs a licence cannot use no-fault possession.
    pub blocks_no_fault: bool,
}

pub const LICENSING_OPTIONS: &[LicensingOption] = &[
    LicensingOption {
        code: "not_required",
        label: "No licence required",
        blocks_no_fault: false,
    },
    LicensingOption {
        code: "licensed",
        label: "Licensed (HMO or selective licence held)",
        blocks_no_fault: false,
    },
    LicensingOption {
        code: "applied",
        label: "Licence applied for",
        blocks_no_fault: false,
    },
    LicensingOption {
        code: "unlicensed",
        label: "Licence required but not held",
        blocks_no_fault: true,
    },
];

pub fn find_licensing_option(raw: &str) -> Option<&'static LicensingOption> {
    let token = normalize_token(raw);
    LICENSING_OPTIONS.iter().find(|option| option.code == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scotland_has_eighteen_discretionary_grounds() {
        assert_eq!(SCOTLAND_GROUNDS.len(), 18);
        assert!(SCOTLAND_GROUNDS
            .iter()
            .all(|ground| ground.kind == GroundKind::Discretionary));
    }

    #[test]
    fn ground_codes_normalise_across_spellings() {
        for raw in ["Ground 8", "ground_8", "8", "GROUND-8"] {
            let ground = find_ground(Jurisdiction::England, raw).expect("ground 8 resolves");
            assert_eq!(ground.code, "8");
        }
        assert_eq!(
            find_ground(Jurisdiction::England, "Ground 14A").map(|g| g.code),
            Some("14a")
        );
        assert_eq!(
            find_ground(Jurisdiction::Wales, "section_157").map(|g| g.code),
            Some("157")
        );
    }

    #[test]
    fn resolve_grounds_reports_unknown_codes_and_dedupes() {
        let selected = vec![
            "ground_8".to_string(),
            "Ground 8".to_string(),
            "ground_99".to_string(),
        ];
        let (known, unknown) = resolve_grounds(Jurisdiction::England, &selected);
        assert_eq!(known.len(), 1);
        assert_eq!(unknown, vec!["ground_99".to_string()]);
    }

    #[test]
    fn deposit_schemes_are_jurisdiction_specific() {
        assert!(find_deposit_scheme(Jurisdiction::England, "Deposit Protection Service").is_some());
        assert!(find_deposit_scheme(Jurisdiction::Scotland, "dps").is_none());
        assert!(find_deposit_scheme(Jurisdiction::Scotland, "SafeDeposits Scotland").is_some());
    }
}
