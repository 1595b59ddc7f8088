use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};
use teloxide::types::{User, UserId};

use crate::{
    scoring::{self, Achievement, Award},
    settings::Settings,
};

/// Telegram user IDs are [`u64`], but SQLite only knows [`i64`].
/// Real IDs fit into either.
#[allow(clippy::cast_possible_wrap)]
pub(super) fn user_to_db(id: UserId) -> i64 {
    id.0 as i64
}

#[allow(clippy::cast_sign_loss)]
pub(super) fn user_from_db(id: i64) -> UserId {
    UserId(id as u64)
}

/// `@username` if there is one, full name otherwise.
#[must_use]
pub fn display_name(username: Option<&str>, first_name: &str, last_name: Option<&str>) -> String {
    if let Some(username) = username {
        return format!("@{username}");
    }

    let mut name = first_name.to_string();
    if let Some(last_name) = last_name {
        if !name.is_empty() {
            name.push(' ');
        }
        name.push_str(last_name);
    }

    name
}

/// Name and ID of someone talking to the bot, as of their latest message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile<'a> {
    pub id: UserId,
    pub username: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
}

impl<'a> From<&'a User> for Profile<'a> {
    fn from(user: &'a User) -> Self {
        Profile {
            id: user.id,
            username: user.username.as_deref(),
            first_name: &user.first_name,
            last_name: user.last_name.as_deref(),
        }
    }
}

#[allow(dead_code)] // Intentionally allow unused fields here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub likes_given: i64,
    pub videos_submitted: i64,
    pub points: i64,
    pub level: i64,
    pub is_admin: bool,
    pub joined_date: DateTime<Utc>,
    pub last_action: DateTime<Utc>,
}

impl UserInfo {
    /// Columns this expects, in order.
    pub(super) const COLUMNS: &'static str = "user_id, username, first_name, last_name, \
        likes_given, videos_submitted, points, level, is_admin, joined_date, last_action";

    pub(super) fn from_sqlite_row(row: SqliteRow) -> UserInfo {
        UserInfo {
            id: user_from_db(row.get(0)),
            username: row.get(1),
            first_name: row.get(2),
            last_name: row.get(3),
            likes_given: row.get(4),
            videos_submitted: row.get(5),
            points: row.get(6),
            level: row.get(7),
            is_admin: row.get(8),
            joined_date: row.get(9),
            last_action: row.get(10),
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(
            self.username.as_deref(),
            &self.first_name,
            self.last_name.as_deref(),
        )
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub id: i64,
    pub user_id: UserId,
    pub url: String,
    pub submission_time: DateTime<Utc>,
    pub status: String,
    pub likes_count: i64,
}

/// One line of the queue, as seen by a specific user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub video: VideoInfo,
    /// Display name of whoever submitted the video.
    pub submitter: String,
    /// Whether the user looking at the queue has liked this video.
    pub liked: bool,
}

impl QueueEntry {
    pub(super) fn from_sqlite_row(row: SqliteRow) -> QueueEntry {
        let username: Option<String> = row.get("username");
        let first_name: String = row.get("first_name");
        let last_name: Option<String> = row.get("last_name");

        QueueEntry {
            video: VideoInfo {
                id: row.get("id"),
                user_id: user_from_db(row.get("user_id")),
                url: row.get("url"),
                submission_time: row.get("submission_time"),
                status: row.get("status"),
                likes_count: row.get("likes_count"),
            },
            submitter: display_name(username.as_deref(), &first_name, last_name.as_deref()),
            liked: row.get("liked"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeReport {
    pub video_id: i64,
    pub award: Award,
    /// Extra points for a streak of likes within a day, or 0.
    pub streak_bonus: i64,
}

impl LikeReport {
    /// Points the user ends up with, all bonuses included.
    #[must_use]
    pub fn total_points(&self) -> i64 {
        self.award.points.saturating_add(self.streak_bonus)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked(LikeReport),
    VideoNotFound,
    OwnVideo,
    AlreadyLiked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPointsOutcome {
    Added(Award),
    NoSuchUser,
    /// The user's points would go past what can be stored.
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { video_id: i64, award: Award },
    /// The user has to like this many more videos first.
    NotEnoughLikes { shortfall: i64 },
}

/// Everything `/status` shows about a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub user: UserInfo,
    /// 1 for the user with the most points. Users with equal points share a rank.
    pub rank: i64,
    pub total_users: i64,
    /// Likes given within the last 24 hours.
    pub likes_today: i64,
    /// Videos submitted within the last 24 hours.
    pub videos_today: i64,
    pub settings: Settings,
}

impl StatusInfo {
    #[must_use]
    pub fn activity_score(&self) -> i64 {
        scoring::activity_score(self.likes_today, self.videos_today)
    }

    #[must_use]
    pub fn points_to_next_level(&self) -> i64 {
        scoring::points_to_next_level(
            self.user.points,
            self.user.level,
            self.settings.level_threshold,
        )
    }

    #[must_use]
    pub fn submission_shortfall(&self) -> Option<i64> {
        scoring::submission_shortfall(self.user.likes_given, self.settings.likes_required)
    }

    #[must_use]
    pub fn achievements(&self) -> Vec<Achievement> {
        Achievement::earned(
            self.user.likes_given,
            self.user.videos_submitted,
            self.user.level,
            self.activity_score(),
        )
    }
}

/// Totals for the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotStats {
    pub users: i64,
    pub videos: i64,
    pub likes: i64,
    pub total_points: i64,
    /// Users that did anything within the last 24 hours.
    pub active_users: i64,
    pub new_videos: i64,
    pub new_likes: i64,
    pub settings: Settings,
}
