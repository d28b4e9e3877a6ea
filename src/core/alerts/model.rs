// Alert model types: severities, filters and the alert record itself.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for an alert. Issued monotonically and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(u64);

impl AlertId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for AlertId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AlertId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// Urgency of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// Lower-case label used on badges and in the console
    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Get all severities, in draw order for random generation
    pub fn all() -> &'static [Severity] {
        &[Self::Critical, Self::Warning, Self::Info]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which severities the active/resolved views currently show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertFilter {
    #[default]
    All,
    Critical,
    Warning,
    Info,
}

impl AlertFilter {
    pub fn matches(&self, severity: Severity) -> bool {
        match self {
            Self::All => true,
            Self::Critical => severity == Severity::Critical,
            Self::Warning => severity == Severity::Warning,
            Self::Info => severity == Severity::Info,
        }
    }
}

impl From<Severity> for AlertFilter {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Self::Critical,
            Severity::Warning => Self::Warning,
            Severity::Info => Self::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}', expected all, critical, warning or info")]
pub struct ParseFilterError(String);

impl FromStr for AlertFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "critical" => Ok(Self::Critical),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}

/// A detected traffic-system condition.
///
/// Everything except `resolved` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Intersection or site label
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        !self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_id_parses_and_displays() {
        let id: AlertId = "42".parse().unwrap();
        assert_eq!(id, AlertId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<AlertId>().is_err());
    }

    #[test]
    fn test_filter_matches() {
        assert!(AlertFilter::All.matches(Severity::Info));
        assert!(AlertFilter::Critical.matches(Severity::Critical));
        assert!(!AlertFilter::Critical.matches(Severity::Warning));
        assert_eq!(AlertFilter::from(Severity::Warning), AlertFilter::Warning);
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("Critical".parse::<AlertFilter>(), Ok(AlertFilter::Critical));
        assert_eq!(" all ".parse::<AlertFilter>(), Ok(AlertFilter::All));
        assert!("urgent".parse::<AlertFilter>().is_err());
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        assert_eq!(Severity::all().len(), 3);
    }
}
