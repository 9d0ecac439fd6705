use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Three-valued filter toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriState {
    /// Keep only rows where the property holds.
    #[serde(rename = "include")]
    Include,
    /// Keep only rows where the property does not hold.
    #[serde(rename = "exclude")]
    Exclude,
    /// No constraint.
    #[default]
    #[serde(rename = "")]
    Neutral,
}

impl TriState {
    /// Required value of a boolean property, if any.
    pub fn required(self) -> Option<bool> {
        match self {
            TriState::Include => Some(true),
            TriState::Exclude => Some(false),
            TriState::Neutral => None,
        }
    }

    /// Whether a boolean property satisfies this toggle.
    pub fn admits(self, value: bool) -> bool {
        self.required().is_none_or(|required| required == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TriState::Include => "include",
            TriState::Exclude => "exclude",
            TriState::Neutral => "",
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "include" => Ok(TriState::Include),
            "exclude" => Ok(TriState::Exclude),
            "" => Ok(TriState::Neutral),
            other => Err(format!("invalid toggle value: {:?}", other)),
        }
    }
}

/// Non-neutral modes of the unsatisfied axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsatisfiedMode {
    /// Only violators.
    Include,
    /// Only compliant, exempt or negligible-download sessions.
    Exclude,
}

/// Summary of a session's standing under the hit-and-run policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Hit-and-run evaluation is turned off.
    NotTracked,
    Immune,
    /// Already recorded as a hit-and-run.
    HitRun,
    /// Warned ahead of a hit-and-run.
    Prewarned,
    /// Currently violating the seeding requirement.
    Unsatisfied,
    Satisfied,
}
