//! Report models shared by the ledger, reward policy and live channel.
//!
//! # Core Types
//!
//! - [`DelayReport`] - Snapshot of a single user-submitted delay observation
//! - [`ReportStatus`] - Lifecycle state (pending, verified, resolved, rejected)
//!
//! # Supporting Types
//!
//! - [`Location`] - Where the delay was observed
//! - [`TransportType`], [`Severity`], [`DelayCategory`] - Report classification
//! - [`ReportAuthor`] - Display info for the submitting user

mod report;
mod status;

pub use report::{DelayCategory, DelayReport, Location, ReportAuthor, ReportId, Severity, TransportType};
pub use status::ReportStatus;
