//! Common types used across the compliance registry

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ComplianceError;

/// Canonical timestamp layout: whole seconds, UTC, `Z` suffix
const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Lifecycle status of a compliance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    /// Record is in force
    Active,
    /// Record was withdrawn by an administrator
    Revoked,
}

impl ComplianceStatus {
    /// Wire representation used in canonical payloads and API bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Active => "active",
            ComplianceStatus::Revoked => "revoked",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceStatus {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ComplianceStatus::Active),
            "revoked" => Ok(ComplianceStatus::Revoked),
            other => Err(ComplianceError::UnknownStatus(other.to_string())),
        }
    }
}

/// Issuance instant of a claim, normalized to UTC at whole-second precision
///
/// Naive timestamps are taken to already be UTC; timestamps carrying an
/// offset are converted. Both routes land on the same value, so a record read
/// back from a store that drops the offset still canonicalizes identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IssuedAt(DateTime<Utc>);

impl IssuedAt {
    /// Normalize a UTC timestamp
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at.trunc_subsecs(0))
    }

    /// Current time, truncated to the second
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// The normalized timestamp
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub fn to_canonical_string(&self) -> String {
        self.0.format(CANONICAL_TIMESTAMP_FORMAT).to_string()
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for IssuedAt {
    fn from(at: DateTime<Tz>) -> Self {
        Self::new(at.with_timezone(&Utc))
    }
}

impl From<NaiveDateTime> for IssuedAt {
    fn from(naive: NaiveDateTime) -> Self {
        Self::new(naive.and_utc())
    }
}

impl fmt::Display for IssuedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

/// The tuple a signature attests to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceClaim {
    pub domain_name: String,
    pub status: ComplianceStatus,
    pub compliance_level: String,
    pub issued_at: IssuedAt,
}

impl ComplianceClaim {
    /// Create a claim with an explicit status
    pub fn new(
        domain_name: impl Into<String>,
        status: ComplianceStatus,
        compliance_level: impl Into<String>,
        issued_at: impl Into<IssuedAt>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            status,
            compliance_level: compliance_level.into(),
            issued_at: issued_at.into(),
        }
    }

    /// Create the claim that gets signed at issuance
    ///
    /// Issuance claims are always `active`. Revoking a record later does not
    /// re-sign it, so verifiers must rebuild this same claim.
    pub fn issuance(
        domain_name: impl Into<String>,
        compliance_level: impl Into<String>,
        issued_at: impl Into<IssuedAt>,
    ) -> Self {
        Self::new(domain_name, ComplianceStatus::Active, compliance_level, issued_at)
    }
}
