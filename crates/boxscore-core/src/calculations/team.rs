//! Team-versus-opponent formulas. Every function is symmetric: call it with the roles
//! swapped to get the opponent's value.

use rust_decimal::{Decimal, MathematicalOps};

use super::{
    assist_to_turnover_ratio, dec, effective_field_goal_pct, floor_impact_counter,
    floor_impact_counter_per40, free_throw_factor, points_per_shot, quotient, ratio, round4,
    shooting_splits, true_shooting_pct, turnover_pct, ShootingSplits,
};
use crate::error::{CalcError, RowError, Side};
use crate::types::StatLine;

/// Player-minutes in a regulation game: 48 minutes × 5 players.
const REGULATION_PLAYER_MINUTES: u16 = 240;
const PLAYERS_ON_FLOOR: u16 = 5;
const SEASON_GAMES: u16 = 82;

fn offensive_rebound_weight() -> Decimal {
    Decimal::new(107, 2)
}

fn free_throw_possession_weight() -> Decimal {
    Decimal::new(4, 1)
}

/// Fixed exponents for the two Pythagorean projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PythagoreanExponent {
    /// 13.91
    Morey,
    /// 16.5
    Hollinger,
}

impl PythagoreanExponent {
    pub fn value(&self) -> Decimal {
        match self {
            PythagoreanExponent::Morey => Decimal::new(1391, 2),
            PythagoreanExponent::Hollinger => Decimal::new(165, 1),
        }
    }
}

/// One side's possession estimate:
/// FGA − round4(ORB / (ORB + OppDRB)) × (FGA − FGM) × 1.07 + TOV + 0.4 × FTA.
pub fn possession_estimate(side: &StatLine, opponent: &StatLine) -> Result<Decimal, CalcError> {
    let offensive_share = ratio(
        "possessions",
        dec(side.rebounds_offense),
        dec(side.rebounds_offense) + dec(opponent.rebounds_defense),
    )?;
    let misses = dec(side.field_goal_attempts) - dec(side.field_goal_made);

    Ok(dec(side.field_goal_attempts)
        - offensive_share * misses * offensive_rebound_weight()
        + dec(side.turnovers)
        + free_throw_possession_weight() * dec(side.free_throw_attempts))
}

/// Mean of both sides' possession estimates.
pub fn possessions(team: &StatLine, opponent: &StatLine) -> Result<Decimal, CalcError> {
    let total = possession_estimate(team, opponent)? + possession_estimate(opponent, team)?;
    ratio("possessions", total, Decimal::TWO)
}

/// Possessions normalized to a 48-minute, five-player game.
pub fn pace(possessions: Decimal, team_minutes: u16) -> Result<Decimal, CalcError> {
    ratio(
        "pace",
        possessions * dec(REGULATION_PLAYER_MINUTES),
        dec(team_minutes),
    )
}

pub fn offensive_rebound_pct(
    rebounds_offense: u16,
    opponent_rebounds_defense: u16,
) -> Result<Decimal, CalcError> {
    ratio(
        "offensive_rebound_pct",
        dec(rebounds_offense) * Decimal::ONE_HUNDRED,
        dec(rebounds_offense) + dec(opponent_rebounds_defense),
    )
}

pub fn defensive_rebound_pct(
    rebounds_defense: u16,
    opponent_rebounds_offense: u16,
) -> Result<Decimal, CalcError> {
    ratio(
        "defensive_rebound_pct",
        dec(rebounds_defense) * Decimal::ONE_HUNDRED,
        dec(rebounds_defense) + dec(opponent_rebounds_offense),
    )
}

pub fn total_rebound_pct(side: &StatLine, opponent: &StatLine) -> Result<Decimal, CalcError> {
    let own = Decimal::from(side.rebounds_total());
    let theirs = Decimal::from(opponent.rebounds_total());
    ratio("total_rebound_pct", own * Decimal::ONE_HUNDRED, own + theirs)
}

pub fn assisted_field_goal_pct(assists: u16, field_goal_made: u16) -> Result<Decimal, CalcError> {
    ratio(
        "assisted_field_goal_pct",
        dec(assists),
        dec(field_goal_made),
    )
}

pub fn steal_pct(steals: u16, possessions: Decimal) -> Result<Decimal, CalcError> {
    ratio("steal_pct", dec(steals) * Decimal::ONE_HUNDRED, possessions)
}

pub fn block_pct(blocks: u16, possessions: Decimal) -> Result<Decimal, CalcError> {
    ratio("block_pct", dec(blocks) * Decimal::ONE_HUNDRED, possessions)
}

/// 100 × BLK / (FGA − 3PA).
pub fn block_rate(
    blocks: u16,
    field_goal_attempts: u16,
    three_point_attempts: u16,
) -> Result<Decimal, CalcError> {
    ratio(
        "block_rate",
        dec(blocks) * Decimal::ONE_HUNDRED,
        dec(field_goal_attempts) - dec(three_point_attempts),
    )
}

/// Points scored (or allowed) per 100 possessions.
pub fn rating(
    metric: &'static str,
    points: u16,
    possessions: Decimal,
) -> Result<Decimal, CalcError> {
    ratio(metric, dec(points) * Decimal::ONE_HUNDRED, possessions)
}

/// FGM / (FGA − ORB + TOV).
pub fn play_pct(stats: &StatLine) -> Result<Decimal, CalcError> {
    let plays = dec(stats.field_goal_attempts) - dec(stats.rebounds_offense) + dec(stats.turnovers);
    ratio("play_pct", dec(stats.field_goal_made), plays)
}

/// 100 × AST / (FGA + 0.44 × FTA + AST + TOV).
pub fn assist_rate(stats: &StatLine) -> Result<Decimal, CalcError> {
    let plays = dec(stats.field_goal_attempts)
        + dec(stats.free_throw_attempts) * free_throw_factor()
        + dec(stats.assists)
        + dec(stats.turnovers);
    ratio(
        "assist_rate",
        dec(stats.assists) * Decimal::ONE_HUNDRED,
        plays,
    )
}

pub fn steal_to_turnover_ratio(steals: u16, turnovers: u16) -> Result<Decimal, CalcError> {
    ratio("steal_to_turnover_ratio", dec(steals), dec(turnovers))
}

/// Projected winning percentage with its 82-game win/loss split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pythagorean {
    pub winning_pct: Decimal,
    pub wins: Decimal,
    pub losses: Decimal,
}

/// PF^e / (PF^e + PA^e), evaluated as 1 / (1 + (PA/PF)^e) so the powers stay in range.
///
/// A power beyond `Decimal` range saturates: a lopsided win projects 1.0000, a lopsided
/// loss 0.0000.
pub fn pythagorean(
    exponent: PythagoreanExponent,
    points_for: u16,
    points_against: u16,
) -> Result<Pythagorean, CalcError> {
    let metric = match exponent {
        PythagoreanExponent::Morey => "pythagorean_winning_pct_13_91",
        PythagoreanExponent::Hollinger => "pythagorean_winning_pct_16_5",
    };

    let against_ratio = quotient(metric, dec(points_against), dec(points_for))?;
    let powered = if against_ratio.is_zero() {
        Some(Decimal::ZERO)
    } else {
        against_ratio.checked_powd(exponent.value())
    };

    let winning_pct = match powered.and_then(|p| Decimal::ONE.checked_add(p)) {
        Some(denominator) => ratio(metric, Decimal::ONE, denominator)?,
        None if against_ratio < Decimal::ONE => round4(Decimal::ONE),
        None => round4(Decimal::ZERO),
    };
    let wins = round4(winning_pct * dec(SEASON_GAMES));
    let losses = round4(dec(SEASON_GAMES) - wins);

    Ok(Pythagorean {
        winning_pct,
        wins,
        losses,
    })
}

/// Derived metrics for one side of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideMetrics {
    pub shooting: ShootingSplits,
    pub true_shooting_pct: Decimal,
    pub effective_field_goal_pct: Decimal,
    pub offensive_rebound_pct: Decimal,
    pub defensive_rebound_pct: Decimal,
    pub total_rebound_pct: Decimal,
    pub assisted_field_goal_pct: Decimal,
    pub turnover_pct: Decimal,
    pub steal_pct: Decimal,
    pub block_pct: Decimal,
    pub block_rate: Decimal,
    pub points_per_shot: Decimal,
    pub floor_impact_counter: Decimal,
    pub floor_impact_counter_per40: Decimal,
    pub offensive_rating: Decimal,
    pub defensive_rating: Decimal,
    pub efficiency_differential: Decimal,
    pub play_pct: Decimal,
    pub assist_rate: Decimal,
    pub assist_to_turnover_ratio: Decimal,
    pub steal_to_turnover_ratio: Decimal,
}

pub fn side_metrics(
    side: &StatLine,
    opponent: &StatLine,
    possessions: Decimal,
) -> Result<SideMetrics, CalcError> {
    let fic = floor_impact_counter(side);
    let offensive_rating = rating("offensive_rating", side.points, possessions)?;
    let defensive_rating = rating("defensive_rating", opponent.points, possessions)?;

    Ok(SideMetrics {
        shooting: shooting_splits(side)?,
        true_shooting_pct: true_shooting_pct(
            side.points,
            side.field_goal_attempts,
            side.free_throw_attempts,
        )?,
        effective_field_goal_pct: effective_field_goal_pct(
            side.field_goal_made,
            side.three_point_made,
            side.field_goal_attempts,
        )?,
        offensive_rebound_pct: offensive_rebound_pct(
            side.rebounds_offense,
            opponent.rebounds_defense,
        )?,
        defensive_rebound_pct: defensive_rebound_pct(
            side.rebounds_defense,
            opponent.rebounds_offense,
        )?,
        total_rebound_pct: total_rebound_pct(side, opponent)?,
        assisted_field_goal_pct: assisted_field_goal_pct(side.assists, side.field_goal_made)?,
        turnover_pct: turnover_pct(
            side.turnovers,
            side.field_goal_attempts,
            side.free_throw_attempts,
        )?,
        steal_pct: steal_pct(side.steals, possessions)?,
        block_pct: block_pct(side.blocks, possessions)?,
        block_rate: block_rate(
            side.blocks,
            side.field_goal_attempts,
            side.three_point_attempts,
        )?,
        points_per_shot: points_per_shot(side.points, side.field_goal_attempts)?,
        floor_impact_counter: fic,
        floor_impact_counter_per40: floor_impact_counter_per40(
            fic,
            side.minutes,
            PLAYERS_ON_FLOOR,
        )?,
        offensive_rating,
        defensive_rating,
        efficiency_differential: round4(offensive_rating - defensive_rating),
        play_pct: play_pct(side)?,
        assist_rate: assist_rate(side)?,
        assist_to_turnover_ratio: assist_to_turnover_ratio(side.assists, side.turnovers)?,
        steal_to_turnover_ratio: steal_to_turnover_ratio(side.steals, side.turnovers)?,
    })
}

/// Game-level values shared by both sides, seen from the team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameMetrics {
    pub possessions: Decimal,
    pub pace: Decimal,
    pub pythagorean_13_91: Pythagorean,
    pub pythagorean_16_5: Pythagorean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamGameMetrics {
    pub team: SideMetrics,
    pub opponent: SideMetrics,
    pub game: GameMetrics,
}

/// Computes every derived metric of a paired team box score. Inputs are expected to have
/// passed [`StatLine::validate`].
pub fn team_game_metrics(
    team: &StatLine,
    opponent: &StatLine,
) -> Result<TeamGameMetrics, RowError> {
    let possessions = possessions(team, opponent).map_err(RowError::calculation(None))?;

    let team_metrics = side_metrics(team, opponent, possessions)
        .map_err(RowError::calculation(Some(Side::Team)))?;
    let opponent_metrics = side_metrics(opponent, team, possessions)
        .map_err(RowError::calculation(Some(Side::Opponent)))?;

    let game = game_metrics(team, opponent, possessions).map_err(RowError::calculation(None))?;

    Ok(TeamGameMetrics {
        team: team_metrics,
        opponent: opponent_metrics,
        game,
    })
}

fn game_metrics(
    team: &StatLine,
    opponent: &StatLine,
    possessions: Decimal,
) -> Result<GameMetrics, CalcError> {
    Ok(GameMetrics {
        possessions,
        pace: pace(possessions, team.minutes)?,
        pythagorean_13_91: pythagorean(
            PythagoreanExponent::Morey,
            team.points,
            opponent.points,
        )?,
        pythagorean_16_5: pythagorean(
            PythagoreanExponent::Hollinger,
            team.points,
            opponent.points,
        )?,
    })
}
