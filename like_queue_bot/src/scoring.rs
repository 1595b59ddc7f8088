//! All the arithmetic behind points and levels. Nothing in here touches the
//! database; [`Database`](crate::database::Database) feeds these the current
//! numbers and stores whatever comes out.
//!
//! Points and levels stop at [`i64::MAX`] instead of overflowing.

use std::fmt::Display;

/// Likes within a day needed for each step of the streak bonus.
pub const STREAK_STEP: i64 = 5;
/// Points per step of the streak bonus.
pub const STREAK_STEP_BONUS: i64 = 15;
/// Level-up bonus is this times the new level.
pub const LEVEL_UP_BONUS_FACTOR: i64 = 10;

/// The level someone with this many points should be at.
///
/// A threshold below 1 is treated as 1.
#[must_use]
pub fn level_for_points(points: i64, level_threshold: i64) -> i64 {
    points
        .div_euclid(level_threshold.max(1))
        .saturating_add(1)
        .max(1)
}

/// Bonus for reaching `new_level`. Nothing for level 1.
#[must_use]
pub fn level_up_bonus(new_level: i64) -> i64 {
    if new_level > 1 {
        new_level.saturating_mul(LEVEL_UP_BONUS_FACTOR)
    } else {
        0
    }
}

/// Bonus for having given `likes_in_window` likes within the last 24 hours.
///
/// Only pays out on exact multiples of [`STREAK_STEP`], so it is paid once
/// per qualifying like and not on the likes in between.
#[must_use]
pub fn streak_bonus(likes_in_window: i64) -> i64 {
    if likes_in_window > 0 && likes_in_window % STREAK_STEP == 0 {
        likes_in_window / STREAK_STEP * STREAK_STEP_BONUS
    } else {
        0
    }
}

/// Recompute the level for a new amount of points.
///
/// Returns the level to store and whether it went up. Levels never go
/// down here, even if the threshold was raised since.
#[must_use]
pub fn raise_level(points: i64, level: i64, level_threshold: i64) -> (i64, bool) {
    let computed = level_for_points(points, level_threshold);
    if computed > level {
        (computed, true)
    } else {
        (level, false)
    }
}

/// Result of handing out points for a like or a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    /// Points after the award, level-up bonus included.
    pub points: i64,
    pub level: i64,
    pub level_up: bool,
    pub level_bonus: i64,
}

/// Give `amount` points to someone at `points` and `level`.
///
/// If that makes them level up past level 1, they also get the level-up
/// bonus. The bonus itself doesn't count towards another level-up.
#[must_use]
pub fn award(points: i64, level: i64, amount: i64, level_threshold: i64) -> Award {
    let points = points.saturating_add(amount);
    let (level, level_up) = raise_level(points, level, level_threshold);
    let level_bonus = if level_up { level_up_bonus(level) } else { 0 };

    Award {
        points: points.saturating_add(level_bonus),
        level,
        level_up,
        level_bonus,
    }
}

/// How many more likes are needed before a submission is allowed, or
/// [`None`] if it's allowed already.
#[must_use]
pub fn submission_shortfall(likes_given: i64, likes_required: i64) -> Option<i64> {
    if likes_given >= likes_required {
        None
    } else {
        Some(likes_required - likes_given)
    }
}

/// Activity over the last 24 hours, in percent.
#[must_use]
pub fn activity_score(likes_today: i64, videos_today: i64) -> i64 {
    likes_today
        .saturating_mul(20)
        .saturating_add(videos_today.saturating_mul(30))
        .min(100)
}

/// Points still missing until the next level.
#[must_use]
pub fn points_to_next_level(points: i64, level: i64, level_threshold: i64) -> i64 {
    level
        .saturating_mul(level_threshold)
        .saturating_sub(points)
        .max(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    ActiveLiker,
    SuperLiker,
    ContentMaker,
    Veteran,
    OnFire,
}

impl Achievement {
    /// Everything earned with these stats, in display order.
    #[must_use]
    pub fn earned(
        likes_given: i64,
        videos_submitted: i64,
        level: i64,
        activity_score: i64,
    ) -> Vec<Achievement> {
        let mut output = vec![];
        if likes_given >= 10 {
            output.push(Achievement::ActiveLiker);
        }
        if likes_given >= 50 {
            output.push(Achievement::SuperLiker);
        }
        if videos_submitted >= 5 {
            output.push(Achievement::ContentMaker);
        }
        if level >= 5 {
            output.push(Achievement::Veteran);
        }
        if activity_score >= 80 {
            output.push(Achievement::OnFire);
        }
        output
    }
}

impl Display for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Achievement::ActiveLiker => "🌟 Active liker",
            Achievement::SuperLiker => "🌟🌟 Super liker",
            Achievement::ContentMaker => "📹 Content maker",
            Achievement::Veteran => "👑 Veteran",
            Achievement::OnFire => "🔥 On fire",
        })
    }
}
