//! User levels derived from cumulative points.
//!
//! Levels are never stored. Each tier starts at a fixed floor; a total
//! belongs to the highest tier whose floor it has reached.

use serde::Serialize;

/// One rung of the level ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTier {
    pub level: u8,
    pub title: &'static str,
    /// Inclusive lower bound in points
    pub min_points: u32,
}

/// Level ladder in ascending order. The last tier is unbounded.
pub const LEVEL_TIERS: [LevelTier; 6] = [
    LevelTier { level: 1, title: "New Reporter", min_points: 0 },
    LevelTier { level: 2, title: "Active Reporter", min_points: 10 },
    LevelTier { level: 3, title: "Trusted Reporter", min_points: 25 },
    LevelTier { level: 4, title: "Expert Reporter", min_points: 50 },
    LevelTier { level: 5, title: "Community Leader", min_points: 100 },
    LevelTier { level: 6, title: "Transit Guardian", min_points: 200 },
];

/// Highest level number.
pub const MAX_LEVEL: u8 = LEVEL_TIERS[LEVEL_TIERS.len() - 1].level;

/// A user's standing on the level ladder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLevel {
    pub level: u8,
    pub title: &'static str,
    /// Floor of the next tier, or `None` at the top
    pub next_level_threshold: Option<u32>,
    /// Progress from this tier's floor to the next, in `[0, 100]`
    pub progress_percent: f64,
}

impl UserLevel {
    pub fn is_max(&self) -> bool {
        self.next_level_threshold.is_none()
    }

    /// Points still needed to reach the next tier from `total_points`.
    pub fn points_to_next(&self, total_points: f64) -> Option<f64> {
        let total = sanitize(total_points);
        self.next_level_threshold
            .map(|next| (f64::from(next) - total).max(0.0))
    }
}

/// Derive a user's level from their cumulative point total.
///
/// Negative and NaN totals count as zero.
///
/// ```
/// use delaywatch_core::compute_level;
///
/// let lvl = compute_level(0.0);
/// assert_eq!((lvl.level, lvl.progress_percent), (1, 0.0));
///
/// let lvl = compute_level(200.0);
/// assert_eq!((lvl.level, lvl.progress_percent, lvl.next_level_threshold), (6, 100.0, None));
/// ```
pub fn compute_level(total_points: f64) -> UserLevel {
    let total = sanitize(total_points);

    let index = LEVEL_TIERS
        .iter()
        .rposition(|tier| total >= f64::from(tier.min_points))
        .unwrap_or(0);
    let current = LEVEL_TIERS[index];
    let next = LEVEL_TIERS.get(index + 1);

    let progress_percent = match next {
        Some(next) => {
            let floor = f64::from(current.min_points);
            let span = f64::from(next.min_points) - floor;
            ((total - floor) / span * 100.0).clamp(0.0, 100.0)
        }
        None => 100.0,
    };

    UserLevel {
        level: current.level,
        title: current.title,
        next_level_threshold: next.map(|tier| tier.min_points),
        progress_percent,
    }
}

fn sanitize(points: f64) -> f64 {
    if points.is_nan() {
        0.0
    } else {
        points.max(0.0)
    }
}
