use chrono::NaiveDateTime;
use once_cell::sync::Lazy;

use super::BoxScore;
use crate::calculations::player::{player_metrics, PlayerMetrics};
use crate::error::RowError;
use crate::output::{prefixed, FieldValue, OutputRecord};
use crate::types::{RowKey, SeasonType, StatLine, TeamInfo};

const INFO_COLUMNS: [&str; 6] = [
    "abbr",
    "conference",
    "division",
    "location",
    "result",
    "days_off",
];

const STAT_COLUMNS: [&str; 15] = [
    "minutes",
    "points",
    "assists",
    "turnovers",
    "steals",
    "blocks",
    "personal_fouls",
    "field_goal_attempts",
    "field_goal_made",
    "three_point_attempts",
    "three_point_made",
    "free_throw_attempts",
    "free_throw_made",
    "rebounds_offense",
    "rebounds_defense",
];

const METRIC_COLUMNS: [&str; 13] = [
    "field_goal_pct",
    "two_point_attempts",
    "two_point_made",
    "two_point_pct",
    "three_point_pct",
    "free_throw_pct",
    "rebounds_total",
    "true_shooting_pct",
    "effective_field_goal_pct",
    "points_per_shot",
    "floor_impact_counter",
    "floor_impact_counter_per40",
    "assist_to_turnover_ratio",
];

/// One player's line in one game, with both teams' identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPlayerBoxScore {
    pub game_date_time: NaiveDateTime,
    pub season_type: SeasonType,
    pub player_last_name: String,
    pub player_first_name: String,
    pub team: TeamInfo,
    pub opponent: TeamInfo,
    pub stats: StatLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerBoxScore {
    pub raw: RawPlayerBoxScore,
    pub metrics: PlayerMetrics,
}

impl BoxScore for RawPlayerBoxScore {
    type Enriched = PlayerBoxScore;

    fn key(&self) -> RowKey {
        RowKey {
            game_date_time: self.game_date_time,
            team: self.team.abbr.clone(),
            opponent: self.opponent.abbr.clone(),
            subject: Some(format!(
                "{} {}",
                self.player_first_name, self.player_last_name
            )),
        }
    }

    fn enrich(self) -> Result<PlayerBoxScore, RowError> {
        self.stats.validate().map_err(RowError::validation(None))?;
        let metrics = player_metrics(&self.stats).map_err(RowError::calculation(None))?;
        Ok(PlayerBoxScore { raw: self, metrics })
    }
}

static PLAYER_COLUMNS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "game_date_time",
        "season_type",
        "player_last_name",
        "player_first_name",
    ]
    .iter()
    .map(|name| name.to_string())
    .chain(prefixed("team", &INFO_COLUMNS))
    .chain(prefixed("opponent", &INFO_COLUMNS))
    .chain(STAT_COLUMNS.iter().map(|name| name.to_string()))
    .chain(METRIC_COLUMNS.iter().map(|name| name.to_string()))
    .collect()
});

fn push_info(values: &mut Vec<FieldValue>, info: &TeamInfo) {
    values.extend([
        FieldValue::from(info.abbr.as_str()),
        FieldValue::from(info.conference.as_str()),
        FieldValue::from(info.division.as_str()),
        FieldValue::from(info.location.as_str()),
        FieldValue::from(info.result.as_str()),
        FieldValue::from(info.days_off),
    ]);
}

impl OutputRecord for PlayerBoxScore {
    const TABLE: &'static str = "player_box_score";
    const EXTRACT_FILE: &'static str = "playerBoxScore.csv";

    fn columns() -> &'static [String] {
        PLAYER_COLUMNS.as_slice()
    }

    fn values(&self) -> Vec<FieldValue> {
        let raw = &self.raw;
        let stats = &raw.stats;
        let shooting = &self.metrics.shooting;

        let mut values = Vec::with_capacity(PLAYER_COLUMNS.len());
        values.extend([
            FieldValue::from(raw.game_date_time),
            FieldValue::from(raw.season_type.as_str()),
            FieldValue::from(raw.player_last_name.as_str()),
            FieldValue::from(raw.player_first_name.as_str()),
        ]);
        push_info(&mut values, &raw.team);
        push_info(&mut values, &raw.opponent);
        values.extend([
            FieldValue::from(stats.minutes),
            FieldValue::from(stats.points),
            FieldValue::from(stats.assists),
            FieldValue::from(stats.turnovers),
            FieldValue::from(stats.steals),
            FieldValue::from(stats.blocks),
            FieldValue::from(stats.personal_fouls),
            FieldValue::from(stats.field_goal_attempts),
            FieldValue::from(stats.field_goal_made),
            FieldValue::from(stats.three_point_attempts),
            FieldValue::from(stats.three_point_made),
            FieldValue::from(stats.free_throw_attempts),
            FieldValue::from(stats.free_throw_made),
            FieldValue::from(stats.rebounds_offense),
            FieldValue::from(stats.rebounds_defense),
            FieldValue::from(shooting.field_goal_pct),
            FieldValue::from(shooting.two_point_attempts),
            FieldValue::from(shooting.two_point_made),
            FieldValue::from(shooting.two_point_pct),
            FieldValue::from(shooting.three_point_pct),
            FieldValue::from(shooting.free_throw_pct),
            FieldValue::from(shooting.rebounds_total),
            FieldValue::from(self.metrics.true_shooting_pct),
            FieldValue::from(self.metrics.effective_field_goal_pct),
            FieldValue::from(self.metrics.points_per_shot),
            FieldValue::from(self.metrics.floor_impact_counter),
            FieldValue::from(self.metrics.floor_impact_counter_per40),
            FieldValue::from(self.metrics.assist_to_turnover_ratio),
        ]);
        values
    }
}
