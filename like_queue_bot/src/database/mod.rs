mod types;

use std::str::FromStr;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Executor, Row, Sqlite, SqliteExecutor,
};
use teloxide::types::UserId;
use tokio::sync::{Mutex, MutexGuard};

pub use types::{display_name, AddPointsOutcome, BotStats, LikeOutcome, Profile, SubmitOutcome};
use types::{user_from_db, user_to_db, LikeReport, QueueEntry, StatusInfo, UserInfo};

use crate::{
    scoring::{self, Award},
    settings::{SettingKey, Settings},
    spam_guard::window_allows,
    Error,
};

type Pool = sqlx::Pool<Sqlite>;

/// Length of the window that streaks and "today" statistics look at.
fn one_day() -> TimeDelta {
    TimeDelta::days(1)
}

/// Timestamps are stored with whole seconds only, so that every one of them
/// has the same text format and comparing them as text in SQL compares them
/// by time.
fn stamp(time: DateTime<Utc>) -> DateTime<Utc> {
    time.trunc_subsecs(0)
}

async fn load_settings<'e>(executor: impl SqliteExecutor<'e>) -> Result<Settings, Error> {
    let rows = sqlx::query("SELECT key, value FROM settings;")
        .map(|row: SqliteRow| (row.get::<String, _>(0), row.get::<String, _>(1)))
        .fetch_all(executor)
        .await?;

    Settings::from_rows(rows)
}

pub struct Database {
    pool: Pool,
    /// Held by everything that writes, for the whole of its transaction.
    /// Checks like "has this user liked this video already" and the writes
    /// depending on them can't interleave this way.
    write_lock: Mutex<()>,
}

impl Database {
    pub async fn new(url: &str) -> Result<Self, Error> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(32)
            .connect_with(
                SqliteConnectOptions::from_str(url)?
                    .pragma("cache_size", "-32768")
                    .busy_timeout(std::time::Duration::from_secs(600))
                    .foreign_keys(true),
            )
            .await?;

        Self::init(pool).await
    }

    /// A fresh database that lives in memory. Every connection to an
    /// in-memory SQLite database gets a database of its own, hence the one
    /// connection that never gets closed.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
            .await?;

        Self::init(pool).await
    }

    async fn init(pool: Pool) -> Result<Self, Error> {
        // USERS:
        // user_id (key, i64 because sqlite doesn't support u64)
        // username, first_name, last_name (as of their latest message)
        // likes_given, videos_submitted, points, level (counters)
        // is_admin (0 for no, 1 for yes)
        // joined_date, last_action (date+time in UTC in RFC3339 format)
        pool.execute(sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY NOT NULL,
                username TEXT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NULL,
                likes_given INTEGER NOT NULL DEFAULT 0,
                videos_submitted INTEGER NOT NULL DEFAULT 0,
                points INTEGER NOT NULL DEFAULT 0,
                level INTEGER NOT NULL DEFAULT 1,
                is_admin INTEGER NOT NULL DEFAULT 0,
                joined_date TEXT NOT NULL,
                last_action TEXT NOT NULL
            ) STRICT;",
        ))
        .await?;

        // VIDEOS:
        // id (key, never reused)
        // user_id (who submitted it)
        // url (string)
        // submission_time (date+time in UTC in RFC3339 format)
        // status (only ever "pending" for now)
        // likes_count (amount of rows in likes for this video)
        pool.execute(sqlx::query(
            "CREATE TABLE IF NOT EXISTS videos (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                user_id INTEGER NOT NULL REFERENCES users(user_id),
                url TEXT NOT NULL,
                submission_time TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                likes_count INTEGER NOT NULL DEFAULT 0
            ) STRICT;",
        ))
        .await?;

        // LIKES:
        // id (key)
        // user_id (who liked), video_id (what they liked); unique together
        // like_time (date+time in UTC in RFC3339 format)
        pool.execute(sqlx::query(
            "CREATE TABLE IF NOT EXISTS likes (
                id INTEGER PRIMARY KEY NOT NULL,
                user_id INTEGER NOT NULL REFERENCES users(user_id),
                video_id INTEGER NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
                like_time TEXT NOT NULL,
                UNIQUE (user_id, video_id)
            ) STRICT;",
        ))
        .await?;

        // SETTINGS:
        // key (key, string), value (number as a string)
        pool.execute(sqlx::query(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            ) STRICT;",
        ))
        .await?;

        // SPAM_PROTECTION:
        // user_id, command (key together)
        // timestamp (last use of the command, or when a block runs out;
        //            date+time in UTC in RFC3339 format)
        pool.execute(sqlx::query(
            "CREATE TABLE IF NOT EXISTS spam_protection (
                user_id INTEGER NOT NULL,
                command TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                PRIMARY KEY (user_id, command)
            ) STRICT;",
        ))
        .await?;

        pool.execute(sqlx::query(
            "CREATE INDEX IF NOT EXISTS likes_user_time ON likes(user_id, like_time);",
        ))
        .await?;
        pool.execute(sqlx::query(
            "CREATE INDEX IF NOT EXISTS likes_video ON likes(video_id);",
        ))
        .await?;
        pool.execute(sqlx::query(
            "CREATE INDEX IF NOT EXISTS videos_queue ON videos(submission_time, id);",
        ))
        .await?;
        pool.execute(sqlx::query(
            "CREATE INDEX IF NOT EXISTS videos_user ON videos(user_id, submission_time);",
        ))
        .await?;

        // Defaults go in once. Whatever an admin changed stays.
        for key in SettingKey::ALL {
            sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT DO NOTHING;")
                .bind(key.as_str())
                .bind(key.default_value().to_string())
                .execute(&pool)
                .await?;
        }

        Ok(Database {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub async fn settings(&self) -> Result<Settings, Error> {
        load_settings(&self.pool).await
    }

    /// Overwrite a setting. The value isn't checked here, see
    /// [`SettingKey::validate`].
    pub async fn set_setting(&self, key: SettingKey, value: i64) -> Result<(), Error> {
        let _lock = self.lock().await;
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT DO UPDATE SET value=excluded.value;",
        )
        .bind(key.as_str())
        .bind(value.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Add the user if they're new, or refresh their name if not.
    /// Either way, mark them as active at `now`.
    pub async fn register_user(
        &self,
        profile: &Profile<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let _lock = self.lock().await;
        let now = stamp(now);
        sqlx::query(
            "INSERT INTO users (user_id, username, first_name, last_name, joined_date, last_action)
                VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO
                UPDATE SET
                    username=excluded.username,
                    first_name=excluded.first_name,
                    last_name=excluded.last_name,
                    last_action=excluded.last_action;",
        )
        .bind(user_to_db(profile.id))
        .bind(profile.username)
        .bind(profile.first_name)
        .bind(profile.last_name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_user(&self, user: UserId) -> Result<Option<UserInfo>, Error> {
        let query = format!("SELECT {} FROM users WHERE user_id=?;", UserInfo::COLUMNS);
        Ok(sqlx::query(&query)
            .bind(user_to_db(user))
            .map(UserInfo::from_sqlite_row)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn all_user_ids(&self) -> Result<Vec<UserId>, Error> {
        Ok(sqlx::query("SELECT user_id FROM users ORDER BY user_id;")
            .map(|row: SqliteRow| user_from_db(row.get(0)))
            .fetch_all(&self.pool)
            .await?)
    }

    /// Whether the user has the admin flag in the database. Admins from the
    /// configuration file don't necessarily have it, see [`crate::app::App::is_admin`].
    pub async fn is_admin(&self, user: UserId) -> Result<bool, Error> {
        Ok(sqlx::query("SELECT is_admin FROM users WHERE user_id=?;")
            .bind(user_to_db(user))
            .map(|row: SqliteRow| row.get::<bool, _>(0))
            .fetch_optional(&self.pool)
            .await?
            .unwrap_or(false))
    }

    /// Returns `false` if there's no such user.
    pub async fn set_admin(&self, user: UserId, is_admin: bool) -> Result<bool, Error> {
        let _lock = self.lock().await;
        let affected = sqlx::query("UPDATE users SET is_admin=? WHERE user_id=?;")
            .bind(is_admin)
            .bind(user_to_db(user))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    /// When the user last used this command, or until when they're blocked
    /// from using it.
    #[cfg(test)]
    pub async fn last_command_time(
        &self,
        user: UserId,
        command: &str,
    ) -> Result<Option<DateTime<Utc>>, Error> {
        Self::command_time(&self.pool, user, command).await
    }

    async fn command_time<'e>(
        executor: impl SqliteExecutor<'e>,
        user: UserId,
        command: &str,
    ) -> Result<Option<DateTime<Utc>>, Error> {
        Ok(
            sqlx::query("SELECT timestamp FROM spam_protection WHERE user_id=? AND command=?;")
                .bind(user_to_db(user))
                .bind(command)
                .map(|row: SqliteRow| row.get(0))
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Remember that the user used `command` at `now`, unless they already
    /// did within the spam timeout or are blocked from it.
    ///
    /// Returns `false` if the use was rejected. Rejected uses aren't
    /// remembered, so they don't restart the timeout.
    pub async fn admit_command(
        &self,
        user: UserId,
        command: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let _lock = self.lock().await;
        let now = stamp(now);

        let mut tx = self.pool.begin().await?;
        let settings = load_settings(&mut *tx).await?;
        let last = Self::command_time(&mut *tx, user, command).await?;

        if !window_allows(last, now, settings.spam_timeout) {
            return Ok(false);
        }

        Self::upsert_command_time(&mut *tx, user, command, now).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Make all of `commands` unusable for the user until `until`.
    pub async fn block_user(
        &self,
        user: UserId,
        commands: &[&str],
        until: DateTime<Utc>,
    ) -> Result<(), Error> {
        let _lock = self.lock().await;
        let until = stamp(until);
        let mut tx = self.pool.begin().await?;
        for command in commands {
            Self::upsert_command_time(&mut *tx, user, command, until).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn upsert_command_time<'e>(
        executor: impl SqliteExecutor<'e>,
        user: UserId,
        command: &str,
        time: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO spam_protection (user_id, command, timestamp) VALUES (?, ?, ?)
            ON CONFLICT DO UPDATE SET timestamp=excluded.timestamp;",
        )
        .bind(user_to_db(user))
        .bind(command)
        .bind(time)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// How many more videos the user has to like before they may submit
    /// one, or [`None`] if they may submit now.
    pub async fn submission_shortfall(&self, user: UserId) -> Result<Option<i64>, Error> {
        let settings = self.settings().await?;
        let likes_given: i64 = sqlx::query("SELECT likes_given FROM users WHERE user_id=?;")
            .bind(user_to_db(user))
            .map(|row: SqliteRow| row.get(0))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::UnknownUser(user))?;

        Ok(scoring::submission_shortfall(
            likes_given,
            settings.likes_required,
        ))
    }

    /// Record that `user` liked the video `video_id`, and hand out points
    /// for it.
    pub async fn record_like(
        &self,
        user: UserId,
        video_id: i64,
        now: DateTime<Utc>,
    ) -> Result<LikeOutcome, Error> {
        let _lock = self.lock().await;
        let now = stamp(now);
        let user_db = user_to_db(user);

        let mut tx = self.pool.begin().await?;
        let settings = load_settings(&mut *tx).await?;

        let Some(owner): Option<i64> = sqlx::query("SELECT user_id FROM videos WHERE id=?;")
            .bind(video_id)
            .map(|row: SqliteRow| row.get(0))
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(LikeOutcome::VideoNotFound);
        };

        if owner == user_db {
            return Ok(LikeOutcome::OwnVideo);
        }

        let (points, level): (i64, i64) =
            sqlx::query("SELECT points, level FROM users WHERE user_id=?;")
                .bind(user_db)
                .map(|row: SqliteRow| (row.get(0), row.get(1)))
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(Error::UnknownUser(user))?;

        let inserted = sqlx::query(
            "INSERT INTO likes (user_id, video_id, like_time) VALUES (?, ?, ?)
            ON CONFLICT (user_id, video_id) DO NOTHING;",
        )
        .bind(user_db)
        .bind(video_id)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Ok(LikeOutcome::AlreadyLiked);
        }

        sqlx::query("UPDATE videos SET likes_count=likes_count+1 WHERE id=?;")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;

        let award = scoring::award(
            points,
            level,
            settings.points_per_like,
            settings.level_threshold,
        );

        // Includes the like we just added.
        let likes_in_window: i64 =
            sqlx::query("SELECT COUNT(*) FROM likes WHERE user_id=? AND like_time > ?;")
                .bind(user_db)
                .bind(now - one_day())
                .fetch_one(&mut *tx)
                .await?
                .get(0);
        let streak_bonus = scoring::streak_bonus(likes_in_window);

        let report = LikeReport {
            video_id,
            award,
            streak_bonus,
        };

        sqlx::query(
            "UPDATE users SET
                likes_given=likes_given+1,
                points=?,
                level=?
            WHERE user_id=?;",
        )
        .bind(report.total_points())
        .bind(award.level)
        .bind(user_db)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LikeOutcome::Liked(report))
    }

    /// Add a video to the queue, if the user liked enough videos to be
    /// allowed to, and hand out points for it.
    pub async fn record_submission(
        &self,
        user: UserId,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, Error> {
        let _lock = self.lock().await;
        let now = stamp(now);
        let user_db = user_to_db(user);

        let mut tx = self.pool.begin().await?;
        let settings = load_settings(&mut *tx).await?;

        let (likes_given, points, level): (i64, i64, i64) =
            sqlx::query("SELECT likes_given, points, level FROM users WHERE user_id=?;")
                .bind(user_db)
                .map(|row: SqliteRow| (row.get(0), row.get(1), row.get(2)))
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(Error::UnknownUser(user))?;

        if let Some(shortfall) = scoring::submission_shortfall(likes_given, settings.likes_required)
        {
            return Ok(SubmitOutcome::NotEnoughLikes { shortfall });
        }

        let video_id = sqlx::query(
            "INSERT INTO videos (user_id, url, submission_time, status, likes_count)
            VALUES (?, ?, ?, 'pending', 0);",
        )
        .bind(user_db)
        .bind(url)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let award = scoring::award(
            points,
            level,
            settings.points_per_submission,
            settings.level_threshold,
        );

        sqlx::query(
            "UPDATE users SET
                videos_submitted=videos_submitted+1,
                points=?,
                level=?
            WHERE user_id=?;",
        )
        .bind(award.points)
        .bind(award.level)
        .bind(user_db)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SubmitOutcome::Submitted { video_id, award })
    }

    /// A page of the queue, oldest submissions first.
    pub async fn get_queue(
        &self,
        viewer: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QueueEntry>, Error> {
        Ok(sqlx::query(
            "SELECT
                videos.id,
                videos.user_id,
                videos.url,
                videos.submission_time,
                videos.status,
                videos.likes_count,
                users.username,
                users.first_name,
                users.last_name,
                EXISTS (
                    SELECT 1 FROM likes
                    WHERE likes.video_id=videos.id AND likes.user_id=?
                ) AS liked
            FROM videos
            JOIN users ON users.user_id=videos.user_id
            ORDER BY videos.submission_time, videos.id
            LIMIT ? OFFSET ?;",
        )
        .bind(user_to_db(viewer))
        .bind(limit)
        .bind(offset)
        .map(QueueEntry::from_sqlite_row)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn count_videos(&self) -> Result<i64, Error> {
        Ok(sqlx::query("SELECT COUNT(*) FROM videos;")
            .fetch_one(&self.pool)
            .await?
            .get(0))
    }

    /// Users with the most points. Whoever joined first wins a tie.
    pub async fn leaderboard(&self, limit: i64) -> Result<Vec<UserInfo>, Error> {
        let query = format!(
            "SELECT {} FROM users ORDER BY points DESC, joined_date, user_id LIMIT ?;",
            UserInfo::COLUMNS
        );
        Ok(sqlx::query(&query)
            .bind(limit)
            .map(UserInfo::from_sqlite_row)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Run a `SELECT COUNT(*)`, binding `binds` and then `since` if there is one.
    async fn count(
        &self,
        query: &str,
        binds: &[i64],
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, Error> {
        let mut query = sqlx::query(query);
        for bind in binds {
            query = query.bind(*bind);
        }
        if let Some(since) = since {
            query = query.bind(stamp(since));
        }
        Ok(query.fetch_one(&self.pool).await?.get(0))
    }

    pub async fn status(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusInfo>, Error> {
        let Some(user) = self.get_user(user).await? else {
            return Ok(None);
        };
        let since = Some(now - one_day());
        let user_db = user_to_db(user.id);

        let rank = 1 + self
            .count("SELECT COUNT(*) FROM users WHERE points > ?;", &[user.points], None)
            .await?;
        let total_users = self.count("SELECT COUNT(*) FROM users;", &[], None).await?;
        let likes_today = self
            .count(
                "SELECT COUNT(*) FROM likes WHERE user_id=? AND like_time > ?;",
                &[user_db],
                since,
            )
            .await?;
        let videos_today = self
            .count(
                "SELECT COUNT(*) FROM videos WHERE user_id=? AND submission_time > ?;",
                &[user_db],
                since,
            )
            .await?;

        Ok(Some(StatusInfo {
            user,
            rank,
            total_users,
            likes_today,
            videos_today,
            settings: self.settings().await?,
        }))
    }

    pub async fn stats(&self, now: DateTime<Utc>) -> Result<BotStats, Error> {
        let since = Some(now - one_day());
        Ok(BotStats {
            users: self.count("SELECT COUNT(*) FROM users;", &[], None).await?,
            videos: self.count_videos().await?,
            likes: self.count("SELECT COUNT(*) FROM likes;", &[], None).await?,
            total_points: self
                .count("SELECT COALESCE(SUM(points), 0) FROM users;", &[], None)
                .await?,
            active_users: self
                .count("SELECT COUNT(*) FROM users WHERE last_action > ?;", &[], since)
                .await?,
            new_videos: self
                .count("SELECT COUNT(*) FROM videos WHERE submission_time > ?;", &[], since)
                .await?,
            new_likes: self
                .count("SELECT COUNT(*) FROM likes WHERE like_time > ?;", &[], since)
                .await?,
            settings: self.settings().await?,
        })
    }

    /// Remove a video and all likes it got. Returns `false` if there's no
    /// such video.
    ///
    /// Points and counters of users that liked it stay as they are.
    pub async fn delete_video(&self, video_id: i64) -> Result<bool, Error> {
        let _lock = self.lock().await;
        let affected = sqlx::query("DELETE FROM videos WHERE id=?;")
            .bind(video_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    /// Remove every video and every like. Returns how many videos there were.
    pub async fn clear_queue(&self) -> Result<u64, Error> {
        let _lock = self.lock().await;
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM likes;").execute(&mut *tx).await?;
        let videos = sqlx::query("DELETE FROM videos;")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(videos)
    }

    /// Set the user's like counter back to 0, so they have to like videos
    /// again before submitting. Returns `false` if there's no such user.
    pub async fn reset_likes(&self, user: UserId) -> Result<bool, Error> {
        let _lock = self.lock().await;
        let affected = sqlx::query("UPDATE users SET likes_given=0 WHERE user_id=?;")
            .bind(user_to_db(user))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    /// Give the user `amount` points, possibly leveling them up, but without
    /// any level-up bonus.
    pub async fn add_points(&self, user: UserId, amount: i64) -> Result<AddPointsOutcome, Error> {
        let _lock = self.lock().await;
        let user_db = user_to_db(user);

        let mut tx = self.pool.begin().await?;
        let settings = load_settings(&mut *tx).await?;

        let Some((points, level)): Option<(i64, i64)> =
            sqlx::query("SELECT points, level FROM users WHERE user_id=?;")
                .bind(user_db)
                .map(|row: SqliteRow| (row.get(0), row.get(1)))
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(AddPointsOutcome::NoSuchUser);
        };

        let Some(points) = points.checked_add(amount) else {
            return Ok(AddPointsOutcome::OutOfRange);
        };
        let (level, level_up) = scoring::raise_level(points, level, settings.level_threshold);

        sqlx::query("UPDATE users SET points=?, level=? WHERE user_id=?;")
            .bind(points)
            .bind(level)
            .bind(user_db)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(AddPointsOutcome::Added(Award {
            points,
            level,
            level_up,
            level_bonus: 0,
        }))
    }

    /// Overwrite the user's level, up or down. Points stay as they are.
    /// Returns `false` if there's no such user.
    pub async fn set_level(&self, user: UserId, level: i64) -> Result<bool, Error> {
        let _lock = self.lock().await;
        let affected = sqlx::query("UPDATE users SET level=? WHERE user_id=?;")
            .bind(level)
            .bind(user_to_db(user))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}
