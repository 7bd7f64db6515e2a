//! Applicability-domain checks on molecular weight.
//!
//! The models were trained on a limited weight range for each role. A structure
//! outside its range still gets a prediction; the status is advisory.

use std::fmt;

use addzyme_chem::{molecular_weight, standardize_smiles, Molecule, StandardizeConfig};
use addzyme_core::{AddzymeError, Result, Summarizable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DomainConfig;

/// Inclusive molecular weight range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainRange {
    pub min: f64,
    pub max: f64,
}

impl DomainRange {
    /// Inclusive test at the 0.001 g/mol precision the bounds are stated in.
    pub fn contains(&self, value: f64) -> bool {
        let value = (value * 1000.0).round() / 1000.0;
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    InDomain,
    OutOfDomain,
}

/// Which structure of the request is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Substrate,
    Additive,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::Substrate => "substrate",
            Role::Additive => "additive",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Substrate => f.write_str("Substrate"),
            Role::Additive => f.write_str("Additive"),
        }
    }
}

/// Outcome of checking one structure against its domain.
#[derive(Debug, Clone, Serialize)]
pub struct DomainReport {
    pub role: Role,
    pub input: String,
    pub canonical_smiles: String,
    pub molecular_weight: f64,
    pub range: DomainRange,
    pub status: DomainStatus,
    #[serde(skip)]
    pub molecule: Molecule,
}

impl DomainReport {
    pub fn in_domain(&self) -> bool {
        self.status == DomainStatus::InDomain
    }

    /// The advisory line shown to the user.
    pub fn message(&self) -> String {
        match self.status {
            DomainStatus::InDomain => format!("{} is in domain.", self.role),
            DomainStatus::OutOfDomain => format!(
                "{} is out of domain. Molecular weight of {} should be between {} and {}",
                self.role,
                self.role.label(),
                self.range.min,
                self.range.max
            ),
        }
    }
}

impl Summarizable for DomainReport {
    fn summary(&self) -> String {
        format!("{} ({}, MW {:.3})", self.message(), self.canonical_smiles, self.molecular_weight)
    }
}

/// Standardize `smiles`, compute its molecular weight and compare it to `range`.
///
/// Structures that cannot be parsed are a `Parse` error telling the user to
/// enter valid SMILES.
pub fn check_structure(
    role: Role,
    smiles: &str,
    range: DomainRange,
    standardize: &StandardizeConfig,
) -> Result<DomainReport> {
    let standardized = standardize_smiles(smiles, standardize).map_err(|e| {
        let detail = match e {
            AddzymeError::Parse(msg) => msg,
            other => other.to_string(),
        };
        AddzymeError::Parse(format!("Enter valid SMILES for the {}: {detail}", role.label()))
    })?;

    let mw = molecular_weight(&standardized.molecule);
    let status = if range.contains(mw) {
        DomainStatus::InDomain
    } else {
        DomainStatus::OutOfDomain
    };

    debug!(%role, smiles, canonical = %standardized.canonical, mw, "standardized structure");
    if status == DomainStatus::OutOfDomain {
        warn!(%role, mw, min = range.min, max = range.max, "structure outside applicability domain");
    }

    Ok(DomainReport {
        role,
        input: smiles.to_string(),
        canonical_smiles: standardized.canonical,
        molecular_weight: mw,
        range,
        status,
        molecule: standardized.molecule,
    })
}

/// One role's result in a standalone check, kept even when its SMILES is invalid.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoleCheck {
    Checked(DomainReport),
    Invalid { role: Role, input: String, message: String },
}

impl RoleCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, RoleCheck::Checked(_))
    }
}

impl Summarizable for RoleCheck {
    fn summary(&self) -> String {
        match self {
            RoleCheck::Checked(report) => report.summary(),
            RoleCheck::Invalid { message, .. } => message.clone(),
        }
    }
}

/// Check each given structure against its role's range.
///
/// A structure that fails to parse does not stop the others from being checked.
pub fn check_roles(inputs: &[(Role, &str)], domain: &DomainConfig, standardize: &StandardizeConfig) -> Vec<RoleCheck> {
    inputs
        .iter()
        .map(|&(role, smiles)| {
            let range = match role {
                Role::Substrate => domain.substrate,
                Role::Additive => domain.additive,
            };
            match check_structure(role, smiles, range, standardize) {
                Ok(report) => RoleCheck::Checked(report),
                Err(AddzymeError::Parse(message)) => RoleCheck::Invalid { role, input: smiles.to_string(), message },
                Err(e) => RoleCheck::Invalid { role, input: smiles.to_string(), message: e.to_string() },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBSTRATE: DomainRange = DomainRange { min: 120.063, max: 399.092 };
    const ADDITIVE: DomainRange = DomainRange { min: 28.010, max: 276.116 };

    fn check(role: Role, smiles: &str, range: DomainRange) -> DomainReport {
        check_structure(role, smiles, range, &StandardizeConfig::default()).unwrap()
    }

    #[test]
    fn range_is_inclusive() {
        assert!(SUBSTRATE.contains(120.063));
        assert!(SUBSTRATE.contains(399.092));
        assert!(!SUBSTRATE.contains(120.062));
        assert!(!SUBSTRATE.contains(f64::NAN));
        // 12.011 + 15.999 is 28.009999... in binary
        assert!(ADDITIVE.contains(12.011 + 15.999));
    }

    #[test]
    fn benzaldehyde_is_out_of_substrate_domain() {
        let report = check(Role::Substrate, "C1=CC=C(C=C1)C=O", SUBSTRATE);
        assert!((report.molecular_weight - 106.124).abs() < 1e-3);
        assert_eq!(report.status, DomainStatus::OutOfDomain);
        assert_eq!(
            report.message(),
            "Substrate is out of domain. Molecular weight of substrate should be between 120.063 and 399.092"
        );
    }

    #[test]
    fn nitrophenyl_acetate_is_in_substrate_domain() {
        let report = check(Role::Substrate, "CC(=O)Oc1ccc([N+](=O)[O-])cc1", SUBSTRATE);
        assert!(report.in_domain(), "mw={}", report.molecular_weight);
        assert_eq!(report.message(), "Substrate is in domain.");
    }

    #[test]
    fn carbon_monoxide_sits_on_additive_lower_bound() {
        let report = check(Role::Additive, "[C-]#[O+]", ADDITIVE);
        assert!(report.in_domain(), "mw={}", report.molecular_weight);
        assert_eq!(report.message(), "Additive is in domain.");
        assert!(report.summary().ends_with("MW 28.010)"), "{}", report.summary());
    }

    #[test]
    fn roles_are_checked_independently() {
        let smiles = "CCCCCCCCCCCCCCCCCC(=O)O"; // stearic acid, 284.5
        assert!(check(Role::Substrate, smiles, SUBSTRATE).in_domain());
        let additive = check(Role::Additive, smiles, ADDITIVE);
        assert!(!additive.in_domain());
        assert!(additive.message().starts_with("Additive is out of domain."));
    }

    #[test]
    fn invalid_smiles_asks_for_valid_input() {
        let err = check_structure(Role::Additive, "C1CC(", ADDITIVE, &StandardizeConfig::default()).unwrap_err();
        assert!(matches!(err, AddzymeError::Parse(_)));
        assert!(err.to_string().contains("Enter valid SMILES"), "{err}");
    }

    #[test]
    fn invalid_smiles_message_has_one_prefix() {
        let err = check_structure(Role::Additive, "C1CC(", ADDITIVE, &StandardizeConfig::default()).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("parse error: Enter valid SMILES for the additive: "), "{text}");
        assert_eq!(text.matches("parse error").count(), 1, "{text}");
    }

    #[test]
    fn mercuric_chloride_is_in_additive_domain() {
        let report = check(Role::Additive, "Cl[Hg]Cl", ADDITIVE);
        assert!((report.molecular_weight - 271.496).abs() < 1e-3, "mw={}", report.molecular_weight);
        assert!(report.in_domain());
        assert!(report.canonical_smiles.contains("[Hg]"));
    }

    #[test]
    fn acetate_keeps_its_charge() {
        let report = check(Role::Additive, "CC(=O)[O-]", ADDITIVE);
        assert!((report.molecular_weight - 59.044).abs() < 1e-3, "mw={}", report.molecular_weight);
        assert!(report.in_domain());
    }

    #[test]
    fn invalid_substrate_does_not_hide_additive() {
        let domain = DomainConfig { substrate: SUBSTRATE, additive: ADDITIVE };
        let checks = check_roles(
            &[(Role::Substrate, "C1CC("), (Role::Additive, "CCO")],
            &domain,
            &StandardizeConfig::default(),
        );
        assert_eq!(checks.len(), 2);
        assert!(!checks[0].is_valid());
        assert!(checks[0].summary().starts_with("Enter valid SMILES for the substrate: "), "{}", checks[0].summary());
        assert!(checks[1].is_valid());
        assert!(checks[1].summary().starts_with("Additive is in domain."));

        let json = serde_json::to_value(&checks).unwrap();
        assert_eq!(json[0]["outcome"], "invalid");
        assert_eq!(json[0]["role"], "substrate");
        assert_eq!(json[1]["outcome"], "checked");
        assert_eq!(json[1]["status"], "in_domain");
    }

    #[test]
    fn report_serializes_without_graph() {
        let report = check(Role::Additive, "CCO", ADDITIVE);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["role"], "additive");
        assert_eq!(json["status"], "in_domain");
        assert_eq!(json["canonical_smiles"], "CCO");
        assert!(json.get("molecule").is_none());
    }
}
