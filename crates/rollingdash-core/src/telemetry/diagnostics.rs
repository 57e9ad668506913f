//! Diagnostic trouble codes
//!
//! Static catalog of the OBD-II codes the simulator can raise, and the
//! per-snapshot diagnostics value.

use serde::{Deserialize, Serialize};

/// Sentinel shown when a snapshot carries no trouble codes
pub const NO_ISSUES: &str = "No issues";

/// A catalogued trouble code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TroubleCode {
    /// OBD-II code, e.g. `P0420`
    pub code: &'static str,
    /// Human-readable meaning
    pub description: &'static str,
}

/// Codes the simulator picks from
pub const TROUBLE_CODES: &[TroubleCode] = &[
    TroubleCode {
        code: "P0420",
        description: "Catalyst System Efficiency Below Threshold (Bank 1)",
    },
    TroubleCode {
        code: "P0171",
        description: "System Too Lean (Bank 1)",
    },
    TroubleCode {
        code: "P0300",
        description: "Random/Multiple Cylinder Misfire Detected",
    },
    TroubleCode {
        code: "P0301",
        description: "Cylinder 1 Misfire Detected",
    },
    TroubleCode {
        code: "P0128",
        description: "Coolant Thermostat Below Regulating Temperature",
    },
    TroubleCode {
        code: "P0442",
        description: "Evaporative Emission System Leak Detected (Small Leak)",
    },
    TroubleCode {
        code: "P0455",
        description: "Evaporative Emission System Leak Detected (Large Leak)",
    },
    TroubleCode {
        code: "P0507",
        description: "Idle Air Control System RPM Higher Than Expected",
    },
];

/// Look up the human-readable description of a code (case-insensitive)
pub fn describe(code: &str) -> Option<&'static str> {
    let code = code.trim();
    TROUBLE_CODES
        .iter()
        .find(|tc| tc.code.eq_ignore_ascii_case(code))
        .map(|tc| tc.description)
}

/// Diagnostics attached to a snapshot.
///
/// Serialized as a list of strings: the trouble codes, or `["No issues"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum Diagnostics {
    /// Nothing to report
    #[default]
    NoIssues,
    /// Active trouble codes
    Codes(Vec<String>),
}

impl Diagnostics {
    /// Build from raw identifiers. Blank entries and the sentinel are dropped;
    /// nothing left means no issues.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes: Vec<String> = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(NO_ISSUES))
            .collect();

        if codes.is_empty() {
            Diagnostics::NoIssues
        } else {
            Diagnostics::Codes(codes)
        }
    }

    /// Whether any trouble code is present
    pub fn has_issues(&self) -> bool {
        matches!(self, Diagnostics::Codes(_))
    }

    /// Trouble codes, empty when there are no issues
    pub fn codes(&self) -> &[String] {
        match self {
            Diagnostics::NoIssues => &[],
            Diagnostics::Codes(codes) => codes,
        }
    }

    /// Display lines: one per code with its description, or the sentinel
    pub fn display_lines(&self) -> Vec<String> {
        match self {
            Diagnostics::NoIssues => vec![NO_ISSUES.to_string()],
            Diagnostics::Codes(codes) => codes
                .iter()
                .map(|code| match describe(code) {
                    Some(desc) => format!("{code}: {desc}"),
                    None => code.clone(),
                })
                .collect(),
        }
    }
}

impl From<Vec<String>> for Diagnostics {
    fn from(codes: Vec<String>) -> Self {
        Diagnostics::from_codes(codes)
    }
}

impl From<Diagnostics> for Vec<String> {
    fn from(diag: Diagnostics) -> Self {
        match diag {
            Diagnostics::NoIssues => vec![NO_ISSUES.to_string()],
            Diagnostics::Codes(codes) => codes,
        }
    }
}
