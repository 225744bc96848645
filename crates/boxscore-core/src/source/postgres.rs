//! Reads completed games from the upstream statistics database.
//!
//! Each query pairs a team's box score with its opponent's for the same game and pages
//! through the date window in ascending game order with `LIMIT`/`OFFSET`.

use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use super::{Fetched, RowSource, SourceError};
use crate::boxscores::{BoxScore, RawOfficialBoxScore, RawPlayerBoxScore, RawTeamBoxScore};
use crate::config::DateWindow;
use crate::error::{RowError, RowFailure, Side, ValidationError};
use crate::types::{count, RowKey, StatLine, TeamInfo, TeamSide, PERIODS};

/// Box score columns shared by team and player lines, as named upstream.
const STAT_FIELDS: [&str; 15] = [
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

/// Select list for one side of the pairing, aliased `<prefix>_<field>`.
fn side_select(team: &str, box_score: &str, prefix: &str) -> String {
    let mut columns = vec![
        format!("{team}.abbr AS {prefix}_abbr"),
        format!("{team}.conference AS {prefix}_conference"),
        format!("{team}.division AS {prefix}_division"),
        format!("{box_score}.location AS {prefix}_location"),
        format!("{box_score}.result AS {prefix}_result"),
        format!("{box_score}.days_off AS {prefix}_days_off"),
    ];
    columns.extend(
        STAT_FIELDS
            .iter()
            .map(|field| format!("{box_score}.{field} AS {prefix}_{field}")),
    );
    columns.extend((1..=PERIODS).map(|period| {
        format!("{box_score}.points_period{period} AS {prefix}_points_q{period}")
    }));
    columns.join(", ")
}

const GAME_PAIRING: &str = "FROM game \
     INNER JOIN box_score AS bs_team ON game.id = bs_team.game_id \
     INNER JOIN team AS team ON team.id = bs_team.team_id \
     INNER JOIN box_score AS bs_oppt ON game.id = bs_oppt.game_id \
     INNER JOIN team AS oppt ON oppt.id = bs_oppt.team_id";

const COMPLETED_IN_WINDOW: &str = "WHERE game.game_date_time BETWEEN $1 AND $2 \
     AND game.status = 'Completed' \
     AND team.abbr <> oppt.abbr";

static TEAM_QUERY: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT game.game_date_time, game.season_type, {}, {} {GAME_PAIRING} {COMPLETED_IN_WINDOW} \
         ORDER BY game.game_date_time ASC, bs_team.id ASC \
         LIMIT $3 OFFSET $4",
        side_select("team", "bs_team", "team"),
        side_select("oppt", "bs_oppt", "opponent"),
    )
});

static OFFICIAL_QUERY: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT game.game_date_time, game.season_type, \
         official.last_name AS official_last_name, official.first_name AS official_first_name, \
         {}, {} {GAME_PAIRING} \
         INNER JOIN game_official ON game.id = game_official.game_id \
         INNER JOIN official ON official.id = game_official.official_id \
         {COMPLETED_IN_WINDOW} \
         ORDER BY game.game_date_time ASC, bs_team.id ASC, official.id ASC \
         LIMIT $3 OFFSET $4",
        side_select("team", "bs_team", "team"),
        side_select("oppt", "bs_oppt", "opponent"),
    )
});

static PLAYER_QUERY: Lazy<String> = Lazy::new(|| {
    let stats = STAT_FIELDS
        .iter()
        .map(|field| format!("bs_player.{field} AS {field}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT game.game_date_time, game.season_type, \
         player.last_name AS player_last_name, player.first_name AS player_first_name, \
         team.abbr AS team_abbr, team.conference AS team_conference, team.division AS team_division, \
         bs_team.location AS team_location, bs_team.result AS team_result, bs_team.days_off AS team_days_off, \
         oppt.abbr AS opponent_abbr, oppt.conference AS opponent_conference, oppt.division AS opponent_division, \
         bs_oppt.location AS opponent_location, bs_oppt.result AS opponent_result, bs_oppt.days_off AS opponent_days_off, \
         {stats} {GAME_PAIRING} \
         INNER JOIN box_score_player AS bs_player ON bs_player.box_score_id = bs_team.id \
         INNER JOIN player ON player.id = bs_player.player_id \
         {COMPLETED_IN_WINDOW} \
         AND bs_player.minutes > 0 \
         ORDER BY game.game_date_time ASC, bs_team.id ASC, bs_player.id ASC \
         LIMIT $3 OFFSET $4"
    )
});

/// Failures while decoding one upstream row.
enum DecodeError {
    Sql(sqlx::Error),
    Invalid(Option<Side>, ValidationError),
}

impl From<sqlx::Error> for DecodeError {
    fn from(err: sqlx::Error) -> Self {
        DecodeError::Sql(err)
    }
}

impl From<ValidationError> for DecodeError {
    fn from(err: ValidationError) -> Self {
        DecodeError::Invalid(None, err)
    }
}

impl DecodeError {
    fn on_side(self, side: Side) -> Self {
        match self {
            DecodeError::Invalid(None, err) => DecodeError::Invalid(Some(side), err),
            other => other,
        }
    }
}

fn small_count(row: &PgRow, column: &str, field: &'static str) -> Result<u16, DecodeError> {
    let value: i16 = row.try_get(column)?;
    Ok(count(field, value)?)
}

fn parsed<T>(row: &PgRow, column: &str) -> Result<T, DecodeError>
where
    T: FromStr<Err = ValidationError>,
{
    let text: String = row.try_get(column)?;
    Ok(text.parse()?)
}

fn stat_line(row: &PgRow, prefix: Option<&str>) -> Result<StatLine, DecodeError> {
    let column = |field: &str| match prefix {
        Some(prefix) => format!("{prefix}_{field}"),
        None => field.to_string(),
    };
    let mut values = [0u16; STAT_FIELDS.len()];
    for (slot, field) in values.iter_mut().zip(STAT_FIELDS) {
        *slot = small_count(row, &column(field), field)?;
    }
    let [
        minutes,
        points,
        assists,
        turnovers,
        steals,
        blocks,
        personal_fouls,
        field_goal_attempts,
        field_goal_made,
        three_point_attempts,
        three_point_made,
        free_throw_attempts,
        free_throw_made,
        rebounds_offense,
        rebounds_defense,
    ] = values;

    Ok(StatLine {
        minutes,
        points,
        assists,
        turnovers,
        steals,
        blocks,
        personal_fouls,
        field_goal_attempts,
        field_goal_made,
        three_point_attempts,
        three_point_made,
        free_throw_attempts,
        free_throw_made,
        rebounds_offense,
        rebounds_defense,
    })
}

fn team_info(row: &PgRow, prefix: &str) -> Result<TeamInfo, DecodeError> {
    Ok(TeamInfo {
        abbr: row.try_get(format!("{prefix}_abbr").as_str())?,
        conference: row.try_get(format!("{prefix}_conference").as_str())?,
        division: row.try_get(format!("{prefix}_division").as_str())?,
        location: parsed(row, &format!("{prefix}_location"))?,
        result: parsed(row, &format!("{prefix}_result"))?,
        days_off: small_count(row, &format!("{prefix}_days_off"), "days_off")?,
    })
}

fn team_side(row: &PgRow, prefix: &str) -> Result<TeamSide, DecodeError> {
    let mut period_points = [0u16; PERIODS];
    for (index, points) in period_points.iter_mut().enumerate() {
        *points = small_count(
            row,
            &format!("{prefix}_points_q{}", index + 1),
            "points_period",
        )?;
    }

    Ok(TeamSide {
        info: team_info(row, prefix)?,
        stats: stat_line(row, Some(prefix))?,
        period_points,
    })
}

fn paired_game(row: &PgRow) -> Result<RawTeamBoxScore, DecodeError> {
    Ok(RawTeamBoxScore {
        game_date_time: row.try_get("game_date_time")?,
        season_type: parsed(row, "season_type")?,
        team: team_side(row, "team").map_err(|err| err.on_side(Side::Team))?,
        opponent: team_side(row, "opponent").map_err(|err| err.on_side(Side::Opponent))?,
    })
}

/// Key columns are decoded separately so a row with bad counts can still be reported.
fn row_key(row: &PgRow, subject: Option<String>) -> Result<RowKey, sqlx::Error> {
    let game_date_time: NaiveDateTime = row.try_get("game_date_time")?;
    Ok(RowKey {
        game_date_time,
        team: row.try_get("team_abbr")?,
        opponent: row.try_get("opponent_abbr")?,
        subject,
    })
}

fn settle<R>(
    decoded: Result<R, DecodeError>,
    key: impl FnOnce() -> Result<RowKey, sqlx::Error>,
) -> Result<Fetched<R>, sqlx::Error> {
    match decoded {
        Ok(row) => Ok(Ok(row)),
        Err(DecodeError::Sql(err)) => Err(err),
        Err(DecodeError::Invalid(side, source)) => Ok(Err(RowFailure {
            key: key()?,
            error: RowError::Validation { side, source },
        })),
    }
}

/// A row shape that can be read from the upstream database.
pub trait PgMapped: BoxScore {
    fn query() -> &'static str;

    fn from_pg_row(row: &PgRow) -> Result<Fetched<Self>, sqlx::Error>;
}

impl PgMapped for RawTeamBoxScore {
    fn query() -> &'static str {
        TEAM_QUERY.as_str()
    }

    fn from_pg_row(row: &PgRow) -> Result<Fetched<Self>, sqlx::Error> {
        settle(paired_game(row), || row_key(row, None))
    }
}

impl PgMapped for RawOfficialBoxScore {
    fn query() -> &'static str {
        OFFICIAL_QUERY.as_str()
    }

    fn from_pg_row(row: &PgRow) -> Result<Fetched<Self>, sqlx::Error> {
        let official_last_name: String = row.try_get("official_last_name")?;
        let official_first_name: String = row.try_get("official_first_name")?;
        let subject = format!("{official_first_name} {official_last_name}");

        let decoded = paired_game(row).map(|game| RawOfficialBoxScore {
            official_last_name,
            official_first_name,
            game,
        });
        settle(decoded, || row_key(row, Some(subject)))
    }
}

impl PgMapped for RawPlayerBoxScore {
    fn query() -> &'static str {
        PLAYER_QUERY.as_str()
    }

    fn from_pg_row(row: &PgRow) -> Result<Fetched<Self>, sqlx::Error> {
        let player_last_name: String = row.try_get("player_last_name")?;
        let player_first_name: String = row.try_get("player_first_name")?;
        let subject = format!("{player_first_name} {player_last_name}");

        let decoded = (|| -> Result<RawPlayerBoxScore, DecodeError> {
            Ok(RawPlayerBoxScore {
                game_date_time: row.try_get("game_date_time")?,
                season_type: parsed(row, "season_type")?,
                player_last_name,
                player_first_name,
                team: team_info(row, "team").map_err(|err| err.on_side(Side::Team))?,
                opponent: team_info(row, "opponent").map_err(|err| err.on_side(Side::Opponent))?,
                stats: stat_line(row, None)?,
            })
        })();
        settle(decoded, || row_key(row, Some(subject)))
    }
}

/// Pages through one aggregate kind's query for a date window.
pub struct PgRowSource<R> {
    pool: PgPool,
    window: DateWindow,
    offset: i64,
    _row: PhantomData<fn() -> R>,
}

impl<R> PgRowSource<R> {
    pub fn new(pool: PgPool, window: DateWindow) -> Self {
        Self {
            pool,
            window,
            offset: 0,
            _row: PhantomData,
        }
    }
}

#[async_trait]
impl<R> RowSource for PgRowSource<R>
where
    R: PgMapped,
{
    type Row = R;

    async fn next_chunk(&mut self, limit: usize) -> Result<Vec<Fetched<R>>, SourceError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(R::query())
            .bind(self.window.start())
            .bind(self.window.end())
            .bind(limit)
            .bind(self.offset)
            .fetch_all(&self.pool)
            .await?;

        self.offset += rows.len() as i64;
        debug!(fetched = rows.len(), offset = self.offset, "Fetched rows");

        rows.iter()
            .map(|row| R::from_pg_row(row).map_err(SourceError::from))
            .collect()
    }
}
