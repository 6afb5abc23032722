//! Report lifecycle state.
//!
//! ```text
//! Pending ──→ Verified ──→ Resolved
//!    │            │
//!    └────────────┴──→ Rejected (terminal)
//! ```
//!
//! A report only ever moves forward. `Rejected` is terminal and forfeits
//! every point the report earned, including points awarded before rejection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lifecycle state of a delay report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Submitted, awaiting community confirmation
    #[default]
    Pending,
    /// Confirmed by the community or an operator
    Verified,
    /// The delay is over
    Resolved,
    /// Judged false or spam
    Rejected,
}

impl ReportStatus {
    /// All states, in lifecycle order.
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::Pending,
        ReportStatus::Verified,
        ReportStatus::Resolved,
        ReportStatus::Rejected,
    ];

    /// Wire name of this state.
    pub const fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Verified => "verified",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Rejected => "rejected",
        }
    }

    /// Parse a wire name, clamping anything unrecognised to `Pending`.
    ///
    /// Report snapshots read their status through this, so an unknown state
    /// still yields a usable report and a baseline award.
    pub fn parse_or_pending(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Rejected | ReportStatus::Resolved)
    }

    /// Whether moving from `self` to `next` is a legal forward step.
    ///
    /// Staying in the same state is not a transition.
    pub const fn can_transition_to(self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, next),
            (Pending, Verified)
                | (Pending, Resolved)
                | (Pending, Rejected)
                | (Verified, Resolved)
                | (Verified, Rejected)
        )
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "verified" => Ok(ReportStatus::Verified),
            "resolved" => Ok(ReportStatus::Resolved),
            "rejected" => Ok(ReportStatus::Rejected),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}
