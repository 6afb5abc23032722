//! Points and leveling rules.
//!
//! All functions here are pure and total: any input yields a usable,
//! non-negative result. Callers compute an award whenever a report changes
//! lifecycle state and apply the difference to the author's running total.

mod badges;
mod level;
mod points;

pub use badges::{badges, format_points, Badge, UserStats};
pub use level::{compute_level, LevelTier, UserLevel, LEVEL_TIERS, MAX_LEVEL};
pub use points::{
    compute_report_points, compute_vote_points, vote_points_delta, PointsAward, BASE_POINTS,
    FIRST_REPORTER_BONUS, HELPFUL_VOTE_POINTS, VERIFIED_BONUS,
};
