//! Achievement badges and point formatting.

use serde::{Deserialize, Serialize};

/// Activity counters a badge decision is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_reports: u32,
    pub verified_reports: u32,
    pub total_upvotes: u32,
    pub helpful_votes: u32,
    pub consecutive_days: u32,
}

impl UserStats {
    /// Share of reports that ended up verified, `0.0` with no reports.
    pub fn accuracy(&self) -> f64 {
        if self.total_reports == 0 {
            return 0.0;
        }
        f64::from(self.verified_reports) / f64::from(self.total_reports)
    }
}

/// An achievement shown on a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    FirstReporter,
    RegularReporter,
    SuperReporter,
    AccurateReporter,
    PrecisionExpert,
    CommunityFavorite,
    HelpfulVoter,
    WeeklyWarrior,
    MonthlyMaster,
}

impl Badge {
    pub const fn title(self) -> &'static str {
        match self {
            Badge::FirstReporter => "First Reporter",
            Badge::RegularReporter => "Regular Reporter",
            Badge::SuperReporter => "Super Reporter",
            Badge::AccurateReporter => "Accurate Reporter",
            Badge::PrecisionExpert => "Precision Expert",
            Badge::CommunityFavorite => "Community Favorite",
            Badge::HelpfulVoter => "Helpful Voter",
            Badge::WeeklyWarrior => "Weekly Warrior",
            Badge::MonthlyMaster => "Monthly Master",
        }
    }
}

/// Badges earned for the given activity, in display order.
pub fn badges(stats: &UserStats) -> Vec<Badge> {
    let accuracy = stats.accuracy();
    let rules = [
        (Badge::FirstReporter, stats.total_reports >= 1),
        (Badge::RegularReporter, stats.total_reports >= 10),
        (Badge::SuperReporter, stats.total_reports >= 50),
        (Badge::AccurateReporter, accuracy >= 0.8 && stats.total_reports >= 5),
        (Badge::PrecisionExpert, accuracy >= 0.95 && stats.total_reports >= 10),
        (Badge::CommunityFavorite, stats.total_upvotes >= 25),
        (Badge::HelpfulVoter, stats.helpful_votes >= 50),
        (Badge::WeeklyWarrior, stats.consecutive_days >= 7),
        (Badge::MonthlyMaster, stats.consecutive_days >= 30),
    ];

    rules
        .into_iter()
        .filter_map(|(badge, earned)| earned.then_some(badge))
        .collect()
}

/// Render a point total for display.
///
/// Whole totals are floored; totals below one (e.g. a single helpful vote)
/// keep one decimal.
pub fn format_points(points: f64) -> String {
    if points.is_nan() || points <= 0.0 {
        return "0".to_string();
    }
    if points < 1.0 {
        return format!("{points:.1}");
    }
    format!("{}", points.floor() as u64)
}
