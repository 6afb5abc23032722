//! Point awards for reports and votes.
//!
//! Report rules, applied in order:
//!
//! 1. 1 base point for submitting
//! 2. 1 point per upvote, unbounded
//! 3. 2 bonus points for the first reporter of an incident
//! 4. +1 base point if the report is verified
//! 5. Rejection forfeits everything, however many upvotes it had
//!
//! Inputs are clamped rather than rejected: a negative upvote count counts
//! as zero. Every function here is total.

use serde::{Deserialize, Serialize};

use crate::ledger::{VoteKind, VoteTransition};
use crate::models::ReportStatus;

/// Points for submitting a report at all.
pub const BASE_POINTS: u32 = 1;

/// Extra base point once a report is verified.
pub const VERIFIED_BONUS: u32 = 1;

/// Bonus for being the first to report an incident.
pub const FIRST_REPORTER_BONUS: u32 = 2;

/// Reward for a vote that agrees with the eventual consensus.
pub const HELPFUL_VOTE_POINTS: f64 = 0.5;

/// Breakdown of the points a single report is worth to its author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsAward {
    pub base_points: u32,
    pub upvote_bonus: u32,
    pub first_reporter_bonus: u32,
    pub total: u32,
}

impl PointsAward {
    /// Change to apply to a running total when a report's award moves from
    /// `previous` to `self`. Negative after a rejection.
    ///
    /// Same unit as [`vote_points_delta`], so report and vote rewards add
    /// into one total that [`compute_level`](crate::rewards::compute_level)
    /// accepts.
    pub fn delta_from(&self, previous: &PointsAward) -> f64 {
        f64::from(self.total) - f64::from(previous.total)
    }
}

/// Compute what a report is worth in its current lifecycle state.
///
/// `is_verified` and the `Verified` state must both hold for the
/// verification bonus.
///
/// ```
/// use delaywatch_core::{compute_report_points, ReportStatus};
///
/// let award = compute_report_points(ReportStatus::Pending, true, 0, false);
/// assert_eq!(award.total, 3);
///
/// let award = compute_report_points(ReportStatus::Rejected, true, 100, true);
/// assert_eq!(award.total, 0);
/// ```
pub fn compute_report_points(
    status: ReportStatus,
    is_first_reporter: bool,
    upvote_count: i64,
    is_verified: bool,
) -> PointsAward {
    if status == ReportStatus::Rejected {
        return PointsAward::default();
    }

    let mut base_points = BASE_POINTS;
    let upvote_bonus = upvote_count.clamp(0, i64::from(u32::MAX)) as u32;
    let first_reporter_bonus = if is_first_reporter { FIRST_REPORTER_BONUS } else { 0 };

    if is_verified && status == ReportStatus::Verified {
        base_points += VERIFIED_BONUS;
    }

    PointsAward {
        base_points,
        upvote_bonus,
        first_reporter_bonus,
        total: base_points
            .saturating_add(upvote_bonus)
            .saturating_add(first_reporter_bonus),
    }
}

/// Reward for casting `vote` on a report.
///
/// A vote is "helpful" when it agrees with where the report ends up:
/// upvoting a report that is already verified, or downvoting one that is
/// not. `report_was_verified` is the status observed when the vote is cast,
/// before any effect the vote itself might have on verification.
pub fn compute_vote_points(vote: VoteKind, report_was_verified: bool) -> f64 {
    match (vote, report_was_verified) {
        (VoteKind::Upvote, true) | (VoteKind::Downvote, false) => HELPFUL_VOTE_POINTS,
        _ => 0.0,
    }
}

/// Change to a voter's running total caused by a vote transition.
///
/// Retracting a vote takes back whatever casting it earned, so toggling a
/// vote repeatedly nets nothing.
pub fn vote_points_delta(transition: VoteTransition, report_was_verified: bool) -> f64 {
    match transition {
        VoteTransition::Cast(kind) => compute_vote_points(kind, report_was_verified),
        VoteTransition::Retract(kind) => -compute_vote_points(kind, report_was_verified),
        VoteTransition::Switch { from, to } => {
            compute_vote_points(to, report_was_verified)
                - compute_vote_points(from, report_was_verified)
        }
    }
}
