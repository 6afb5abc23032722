//! DelayWatch Core
//!
//! Community scoring for crowd-sourced transit-delay reports.
//!
//! # Components
//!
//! - **Ledger**: toggle-style vote aggregation per report, with
//!   reconciliation against authoritative counters
//! - **Rewards**: points for report lifecycle events and helpful votes,
//!   levels and badges derived from cumulative totals
//! - **Models**: report snapshots as exchanged with the reporting API
//!
//! Everything in this crate is synchronous and side-effect free. Network
//! submission and persistence belong to the caller.

pub mod error;
pub mod ledger;
pub mod models;
pub mod rewards;

pub use error::{Error, Result};
pub use ledger::{apply_vote, ScoreLedger, VoteKind, VoteState, VoteStats, VoteTransition};
pub use models::{
    DelayCategory, DelayReport, Location, ReportAuthor, ReportId, ReportStatus, Severity,
    TransportType,
};
pub use rewards::{
    badges, compute_level, compute_report_points, compute_vote_points, format_points,
    vote_points_delta, Badge, PointsAward, UserLevel, UserStats,
};
