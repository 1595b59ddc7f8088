use std::{fmt::Display, str::FromStr};

use crate::Error;

/// Names of the runtime-tunable settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// How many videos one has to like before submitting their own.
    LikesRequired,
    PointsPerLike,
    PointsPerSubmission,
    /// How many points make up one level.
    LevelThreshold,
    /// Minimum amount of seconds between two uses of the same command.
    SpamTimeout,
}

/// The largest number an admin may type in for a setting, a point amount or a level.
pub const MAX_INPUT: i64 = i32::MAX as i64;

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::LikesRequired,
        SettingKey::PointsPerLike,
        SettingKey::PointsPerSubmission,
        SettingKey::LevelThreshold,
        SettingKey::SpamTimeout,
    ];

    /// Key of this setting in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::LikesRequired => "likes_required",
            SettingKey::PointsPerLike => "points_per_like",
            SettingKey::PointsPerSubmission => "points_per_submission",
            SettingKey::LevelThreshold => "level_threshold",
            SettingKey::SpamTimeout => "spam_timeout",
        }
    }

    /// Value this setting gets when the database is first created.
    #[must_use]
    pub fn default_value(self) -> i64 {
        match self {
            SettingKey::LikesRequired => 3,
            SettingKey::PointsPerLike => 5,
            SettingKey::PointsPerSubmission => 10,
            SettingKey::LevelThreshold => 50,
            SettingKey::SpamTimeout => 5,
        }
    }

    /// Smallest value an admin may set.
    #[must_use]
    pub fn minimum(self) -> i64 {
        match self {
            // Zero would make every level infinitely small.
            SettingKey::LevelThreshold => 1,
            _ => 0,
        }
    }

    /// Human readable name, for buttons and replies.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            SettingKey::LikesRequired => "Likes required to submit",
            SettingKey::PointsPerLike => "Points per like",
            SettingKey::PointsPerSubmission => "Points per video",
            SettingKey::LevelThreshold => "Points per level",
            SettingKey::SpamTimeout => "Spam timeout (seconds)",
        }
    }

    /// Parse and check a value an admin typed in for this setting.
    ///
    /// # Errors
    ///
    /// Returns a message to show to the admin if the value is not acceptable.
    pub fn validate(self, input: &str) -> Result<i64, String> {
        let Ok(value) = input.trim().parse::<i64>() else {
            return Err("Please send a whole number.".to_string());
        };

        if value < self.minimum() {
            return Err(format!(
                "{} can't be less than {}.",
                self.title(),
                self.minimum()
            ));
        }

        if value > MAX_INPUT {
            return Err(format!("{} can't be more than {MAX_INPUT}.", self.title()));
        }

        Ok(value)
    }
}

impl Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or(())
    }
}

/// Snapshot of all settings, read once per operation and handed down to
/// whatever needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub likes_required: i64,
    pub points_per_like: i64,
    pub points_per_submission: i64,
    pub level_threshold: i64,
    pub spam_timeout: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            likes_required: SettingKey::LikesRequired.default_value(),
            points_per_like: SettingKey::PointsPerLike.default_value(),
            points_per_submission: SettingKey::PointsPerSubmission.default_value(),
            level_threshold: SettingKey::LevelThreshold.default_value(),
            spam_timeout: SettingKey::SpamTimeout.default_value(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn get(&self, key: SettingKey) -> i64 {
        match key {
            SettingKey::LikesRequired => self.likes_required,
            SettingKey::PointsPerLike => self.points_per_like,
            SettingKey::PointsPerSubmission => self.points_per_submission,
            SettingKey::LevelThreshold => self.level_threshold,
            SettingKey::SpamTimeout => self.spam_timeout,
        }
    }

    fn slot(&mut self, key: SettingKey) -> &mut i64 {
        match key {
            SettingKey::LikesRequired => &mut self.likes_required,
            SettingKey::PointsPerLike => &mut self.points_per_like,
            SettingKey::PointsPerSubmission => &mut self.points_per_submission,
            SettingKey::LevelThreshold => &mut self.level_threshold,
            SettingKey::SpamTimeout => &mut self.spam_timeout,
        }
    }

    /// Build settings out of raw `(key, value)` rows of the settings table.
    /// Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Errors if any setting is missing or isn't a number. Nothing is
    /// defaulted here, since the defaults are seeded when the database is created.
    pub fn from_rows<K, V>(rows: impl IntoIterator<Item = (K, V)>) -> Result<Self, Error>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Settings::default();
        let mut seen = [false; SettingKey::ALL.len()];

        for (key, value) in rows {
            let Ok(key) = key.as_ref().parse::<SettingKey>() else {
                continue;
            };
            let value = value.as_ref();
            let parsed = value
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::MalformedSetting {
                    key,
                    value: value.to_string(),
                })?;
            *settings.slot(key) = parsed;

            if let Some(index) = SettingKey::ALL.iter().position(|x| *x == key) {
                seen[index] = true;
            }
        }

        if let Some(index) = seen.iter().position(|x| !x) {
            return Err(Error::MissingSetting(SettingKey::ALL[index]));
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_rows() -> Vec<(&'static str, String)> {
        SettingKey::ALL
            .iter()
            .map(|key| (key.as_str(), key.default_value().to_string()))
            .collect()
    }

    #[test]
    fn parses_all_rows() {
        let settings = Settings::from_rows(default_rows()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.likes_required, 3);
        assert_eq!(settings.points_per_like, 5);
        assert_eq!(settings.points_per_submission, 10);
        assert_eq!(settings.level_threshold, 50);
        assert_eq!(settings.spam_timeout, 5);
    }

    #[test]
    fn missing_setting_fails_loudly() {
        let rows = default_rows()
            .into_iter()
            .filter(|(key, _)| *key != "level_threshold");
        assert!(matches!(
            Settings::from_rows(rows),
            Err(Error::MissingSetting(SettingKey::LevelThreshold))
        ));
    }

    #[test]
    fn malformed_setting_fails_loudly() {
        let mut rows = default_rows();
        rows[0].1 = "three".to_string();
        assert!(matches!(
            Settings::from_rows(rows),
            Err(Error::MalformedSetting { key: SettingKey::LikesRequired, .. })
        ));
    }

    #[test]
    fn admin_input_validation() {
        assert_eq!(SettingKey::LikesRequired.validate(" 0 "), Ok(0));
        assert!(SettingKey::LikesRequired.validate("-1").is_err());
        assert!(SettingKey::LevelThreshold.validate("0").is_err());
        assert_eq!(SettingKey::LevelThreshold.validate("1"), Ok(1));
        assert!(SettingKey::SpamTimeout.validate("five").is_err());
        assert_eq!(
            SettingKey::PointsPerLike.validate("2147483647"),
            Ok(2_147_483_647)
        );
        assert!(SettingKey::PointsPerLike.validate("2147483648").is_err());
        assert!(SettingKey::SpamTimeout
            .validate("99999999999999999999")
            .is_err());
    }

    #[test]
    fn key_names() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>(), Ok(key));
        }
        assert!("nonsense".parse::<SettingKey>().is_err());
    }
}
