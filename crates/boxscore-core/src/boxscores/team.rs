use chrono::NaiveDateTime;
use once_cell::sync::Lazy;

use super::BoxScore;
use crate::calculations::team::{team_game_metrics, GameMetrics, SideMetrics, TeamGameMetrics};
use crate::error::{RowError, Side};
use crate::output::{prefixed, FieldValue, OutputRecord};
use crate::types::{RowKey, SeasonType, TeamSide};

pub(crate) const SIDE_RAW_COLUMNS: [&str; 29] = [
    "abbr",
    "conference",
    "division",
    "location",
    "result",
    "minutes",
    "days_off",
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
    "points_q1",
    "points_q2",
    "points_q3",
    "points_q4",
    "points_q5",
    "points_q6",
    "points_q7",
    "points_q8",
];

pub(crate) const SIDE_METRIC_COLUMNS: [&str; 27] = [
    "field_goal_pct",
    "two_point_attempts",
    "two_point_made",
    "two_point_pct",
    "three_point_pct",
    "free_throw_pct",
    "rebounds_total",
    "true_shooting_pct",
    "effective_field_goal_pct",
    "offensive_rebound_pct",
    "defensive_rebound_pct",
    "total_rebound_pct",
    "assisted_field_goal_pct",
    "turnover_pct",
    "steal_pct",
    "block_pct",
    "block_rate",
    "points_per_shot",
    "floor_impact_counter",
    "floor_impact_counter_per40",
    "offensive_rating",
    "defensive_rating",
    "efficiency_differential",
    "play_pct",
    "assist_rate",
    "assist_to_turnover_ratio",
    "steal_to_turnover_ratio",
];

pub(crate) const GAME_METRIC_COLUMNS: [&str; 8] = [
    "possessions",
    "pace",
    "pythagorean_winning_pct_13_91",
    "pythagorean_wins_13_91",
    "pythagorean_losses_13_91",
    "pythagorean_winning_pct_16_5",
    "pythagorean_wins_16_5",
    "pythagorean_losses_16_5",
];

/// One team's box score paired with its opponent's for the same game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTeamBoxScore {
    pub game_date_time: NaiveDateTime,
    pub season_type: SeasonType,
    pub team: TeamSide,
    pub opponent: TeamSide,
}

impl RawTeamBoxScore {
    /// The same game seen from the opponent's bench.
    pub fn swapped(&self) -> Self {
        Self {
            game_date_time: self.game_date_time,
            season_type: self.season_type,
            team: self.opponent.clone(),
            opponent: self.team.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), RowError> {
        self.team
            .stats
            .validate()
            .map_err(RowError::validation(Some(Side::Team)))?;
        self.opponent
            .stats
            .validate()
            .map_err(RowError::validation(Some(Side::Opponent)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamBoxScore {
    pub raw: RawTeamBoxScore,
    pub metrics: TeamGameMetrics,
}

impl BoxScore for RawTeamBoxScore {
    type Enriched = TeamBoxScore;

    fn key(&self) -> RowKey {
        RowKey {
            game_date_time: self.game_date_time,
            team: self.team.info.abbr.clone(),
            opponent: self.opponent.info.abbr.clone(),
            subject: None,
        }
    }

    fn enrich(self) -> Result<TeamBoxScore, RowError> {
        self.validate()?;
        let metrics = team_game_metrics(&self.team.stats, &self.opponent.stats)?;
        Ok(TeamBoxScore { raw: self, metrics })
    }
}

/// Columns after the game identity: both sides' raw and derived blocks, then the
/// game-level metrics.
pub(crate) fn matchup_columns() -> impl Iterator<Item = String> {
    prefixed("team", &SIDE_RAW_COLUMNS)
        .chain(prefixed("team", &SIDE_METRIC_COLUMNS))
        .chain(prefixed("opponent", &SIDE_RAW_COLUMNS))
        .chain(prefixed("opponent", &SIDE_METRIC_COLUMNS))
        .chain(GAME_METRIC_COLUMNS.iter().map(|name| name.to_string()))
}

pub(crate) fn push_matchup_values(values: &mut Vec<FieldValue>, row: &TeamBoxScore) {
    push_side_raw(values, &row.raw.team);
    push_side_metrics(values, &row.metrics.team);
    push_side_raw(values, &row.raw.opponent);
    push_side_metrics(values, &row.metrics.opponent);
    push_game_metrics(values, &row.metrics.game);
}

fn push_side_raw(values: &mut Vec<FieldValue>, side: &TeamSide) {
    let info = &side.info;
    let stats = &side.stats;
    values.extend([
        FieldValue::from(info.abbr.as_str()),
        FieldValue::from(info.conference.as_str()),
        FieldValue::from(info.division.as_str()),
        FieldValue::from(info.location.as_str()),
        FieldValue::from(info.result.as_str()),
        FieldValue::from(stats.minutes),
        FieldValue::from(info.days_off),
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
    ]);
    values.extend(side.period_points.iter().copied().map(FieldValue::from));
}

fn push_side_metrics(values: &mut Vec<FieldValue>, metrics: &SideMetrics) {
    let shooting = &metrics.shooting;
    values.extend([
        FieldValue::from(shooting.field_goal_pct),
        FieldValue::from(shooting.two_point_attempts),
        FieldValue::from(shooting.two_point_made),
        FieldValue::from(shooting.two_point_pct),
        FieldValue::from(shooting.three_point_pct),
        FieldValue::from(shooting.free_throw_pct),
        FieldValue::from(shooting.rebounds_total),
        FieldValue::from(metrics.true_shooting_pct),
        FieldValue::from(metrics.effective_field_goal_pct),
        FieldValue::from(metrics.offensive_rebound_pct),
        FieldValue::from(metrics.defensive_rebound_pct),
        FieldValue::from(metrics.total_rebound_pct),
        FieldValue::from(metrics.assisted_field_goal_pct),
        FieldValue::from(metrics.turnover_pct),
        FieldValue::from(metrics.steal_pct),
        FieldValue::from(metrics.block_pct),
        FieldValue::from(metrics.block_rate),
        FieldValue::from(metrics.points_per_shot),
        FieldValue::from(metrics.floor_impact_counter),
        FieldValue::from(metrics.floor_impact_counter_per40),
        FieldValue::from(metrics.offensive_rating),
        FieldValue::from(metrics.defensive_rating),
        FieldValue::from(metrics.efficiency_differential),
        FieldValue::from(metrics.play_pct),
        FieldValue::from(metrics.assist_rate),
        FieldValue::from(metrics.assist_to_turnover_ratio),
        FieldValue::from(metrics.steal_to_turnover_ratio),
    ]);
}

fn push_game_metrics(values: &mut Vec<FieldValue>, game: &GameMetrics) {
    values.extend([
        FieldValue::from(game.possessions),
        FieldValue::from(game.pace),
        FieldValue::from(game.pythagorean_13_91.winning_pct),
        FieldValue::from(game.pythagorean_13_91.wins),
        FieldValue::from(game.pythagorean_13_91.losses),
        FieldValue::from(game.pythagorean_16_5.winning_pct),
        FieldValue::from(game.pythagorean_16_5.wins),
        FieldValue::from(game.pythagorean_16_5.losses),
    ]);
}

static TEAM_COLUMNS: Lazy<Vec<String>> = Lazy::new(|| {
    ["game_date_time", "season_type"]
        .iter()
        .map(|name| name.to_string())
        .chain(matchup_columns())
        .collect()
});

impl OutputRecord for TeamBoxScore {
    const TABLE: &'static str = "team_box_score";
    const EXTRACT_FILE: &'static str = "teamBoxScore_Extract.txt";

    fn columns() -> &'static [String] {
        TEAM_COLUMNS.as_slice()
    }

    fn values(&self) -> Vec<FieldValue> {
        let mut values = Vec::with_capacity(TEAM_COLUMNS.len());
        values.push(FieldValue::from(self.raw.game_date_time));
        values.push(FieldValue::from(self.raw.season_type.as_str()));
        push_matchup_values(&mut values, self);
        values
    }
}
