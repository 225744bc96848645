// crates/boxscore-core/src/types.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of scoring periods carried per team: four quarters plus up to four overtimes.
pub const PERIODS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonType {
    Regular,
    Playoff,
    Preseason,
}

impl SeasonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonType::Regular => "Regular",
            SeasonType::Playoff => "Playoff",
            SeasonType::Preseason => "Preseason",
        }
    }
}

impl FromStr for SeasonType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Regular" => Ok(SeasonType::Regular),
            "Playoff" => Ok(SeasonType::Playoff),
            "Preseason" => Ok(SeasonType::Preseason),
            other => Err(ValidationError::UnknownValue {
                field: "season_type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Home,
    Away,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Home => "Home",
            Location::Away => "Away",
        }
    }
}

impl FromStr for Location {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Home" => Ok(Location::Home),
            "Away" => Ok(Location::Away),
            other => Err(ValidationError::UnknownValue {
                field: "location",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::Win => "Win",
            GameResult::Loss => "Loss",
        }
    }
}

impl FromStr for GameResult {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Win" => Ok(GameResult::Win),
            "Loss" => Ok(GameResult::Loss),
            other => Err(ValidationError::UnknownValue {
                field: "result",
                value: other.to_string(),
            }),
        }
    }
}

/// Identity of one team within a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamInfo {
    pub abbr: String,
    pub conference: String,
    pub division: String,
    pub location: Location,
    pub result: GameResult,
    pub days_off: u16,
}

/// Counting stats for one team or one player in one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatLine {
    pub minutes: u16,
    pub points: u16,
    pub assists: u16,
    pub turnovers: u16,
    pub steals: u16,
    pub blocks: u16,
    pub personal_fouls: u16,
    pub field_goal_attempts: u16,
    pub field_goal_made: u16,
    pub three_point_attempts: u16,
    pub three_point_made: u16,
    pub free_throw_attempts: u16,
    pub free_throw_made: u16,
    pub rebounds_offense: u16,
    pub rebounds_defense: u16,
}

impl StatLine {
    pub fn rebounds_total(&self) -> i32 {
        i32::from(self.rebounds_offense) + i32::from(self.rebounds_defense)
    }

    pub fn two_point_attempts(&self) -> u16 {
        self.field_goal_attempts
            .saturating_sub(self.three_point_attempts)
    }

    pub fn two_point_made(&self) -> u16 {
        self.field_goal_made.saturating_sub(self.three_point_made)
    }

    /// Checks the shooting and playing-time invariants the calculation engine relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.minutes == 0 {
            return Err(ValidationError::ZeroMinutes);
        }

        let shooting = [
            ("field goal", self.field_goal_made, self.field_goal_attempts),
            ("three point", self.three_point_made, self.three_point_attempts),
            ("free throw", self.free_throw_made, self.free_throw_attempts),
        ];
        for (category, made, attempts) in shooting {
            if made > attempts {
                return Err(ValidationError::MadeExceedsAttempts {
                    category,
                    made,
                    attempts,
                });
            }
        }

        if self.three_point_attempts > self.field_goal_attempts {
            return Err(ValidationError::ThreePointExceedsFieldGoal {
                field: "attempts",
                three_point: self.three_point_attempts,
                field_goal: self.field_goal_attempts,
            });
        }
        if self.three_point_made > self.field_goal_made {
            return Err(ValidationError::ThreePointExceedsFieldGoal {
                field: "made",
                three_point: self.three_point_made,
                field_goal: self.field_goal_made,
            });
        }

        Ok(())
    }
}

/// One team's half of a paired box score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSide {
    pub info: TeamInfo,
    pub stats: StatLine,
    pub period_points: [u16; PERIODS],
}

/// Natural key used to report a row: game, team, opponent and, for player and
/// official rows, the person the row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowKey {
    pub game_date_time: NaiveDateTime,
    pub team: String,
    pub opponent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} vs {}",
            self.game_date_time.format("%Y-%m-%dT%H:%M"),
            self.team,
            self.opponent
        )?;
        if let Some(subject) = &self.subject {
            write!(f, " ({subject})")?;
        }
        Ok(())
    }
}

/// Converts a stored `SMALLINT` count into the engine's unsigned domain.
pub fn count(field: &'static str, value: i16) -> Result<u16, ValidationError> {
    u16::try_from(value).map_err(|_| ValidationError::NegativeCount {
        field,
        value: i64::from(value),
    })
}
