//! Training method tag

use crate::core::{OcsvmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One-class formulation used for training and scoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Schölkopf et al.: separating hyperplane with offset rho
    #[default]
    Scholkopf,
    /// Tax and Duin: minimum enclosing hypersphere with squared radius r²
    TaxAndDuin,
}

impl Method {
    /// Box bound c handed to the solver for regularization parameter `nu`
    pub fn box_bound(&self, nu: f64) -> f64 {
        match self {
            Method::Scholkopf => 1.0,
            Method::TaxAndDuin => nu,
        }
    }

    /// Whether the initial coefficients are normalized to sum to 1
    pub fn normalizes_alphas(&self) -> bool {
        matches!(self, Method::TaxAndDuin)
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Method::Scholkopf => "scholkopf",
            Method::TaxAndDuin => "tax-and-duin",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = OcsvmError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|ch| if ch == ' ' || ch == '_' { '-' } else { ch })
            .collect();
        match normalized.as_str() {
            "scholkopf" | "schölkopf" => Ok(Method::Scholkopf),
            "tax-and-duin" | "taxandduin" | "tax-duin" => Ok(Method::TaxAndDuin),
            _ => Err(OcsvmError::InvalidMethod(s.to_string())),
        }
    }
}
