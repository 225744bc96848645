//! Fixed-precision box-score formulas.
//!
//! All arithmetic runs on [`Decimal`]. Every division is rounded to [`SCALE`] fractional
//! digits with half-up rounding (ties away from zero), and every published value is
//! carried at exactly [`SCALE`] digits so report output never drifts between platforms.
//!
//! A zero denominator is never coerced into a value: the formula returns a
//! [`CalcError`] naming the metric.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CalcError;
use crate::types::StatLine;

pub mod player;
pub mod team;

pub const SCALE: u32 = 4;

/// Rounds half-up to [`SCALE`] digits and pads shorter values, so `21` becomes `21.0000`.
pub fn round4(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SCALE);
    rounded
}

/// Unrounded, checked division.
pub(crate) fn quotient(
    metric: &'static str,
    numerator: Decimal,
    denominator: Decimal,
) -> Result<Decimal, CalcError> {
    if denominator.is_zero() {
        return Err(CalcError::zero_denominator(metric));
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| CalcError::overflow(metric))
}

/// Checked division rounded to [`SCALE`] digits.
pub(crate) fn ratio(
    metric: &'static str,
    numerator: Decimal,
    denominator: Decimal,
) -> Result<Decimal, CalcError> {
    quotient(metric, numerator, denominator).map(round4)
}

pub(crate) fn dec(value: u16) -> Decimal {
    Decimal::from(value)
}

/// 0.44: share of free-throw attempts that end a possession.
pub(crate) fn free_throw_factor() -> Decimal {
    Decimal::new(44, 2)
}

fn require_field_goal_attempts(metric: &'static str, attempts: u16) -> Result<(), CalcError> {
    // Undefined without field-goal attempts, even when free throws or turnovers keep the
    // denominator positive.
    if attempts == 0 {
        Err(CalcError::zero_denominator(metric))
    } else {
        Ok(())
    }
}

/// Made / attempts.
pub fn percentage(metric: &'static str, made: u16, attempts: u16) -> Result<Decimal, CalcError> {
    ratio(metric, dec(made), dec(attempts))
}

/// Points / (2 × (FGA + 0.44 × FTA)).
pub fn true_shooting_pct(
    points: u16,
    field_goal_attempts: u16,
    free_throw_attempts: u16,
) -> Result<Decimal, CalcError> {
    const METRIC: &str = "true_shooting_pct";
    require_field_goal_attempts(METRIC, field_goal_attempts)?;
    let shots = dec(field_goal_attempts) + dec(free_throw_attempts) * free_throw_factor();
    ratio(METRIC, dec(points), shots * Decimal::TWO)
}

/// (FGM + 0.5 × 3PM) / FGA.
pub fn effective_field_goal_pct(
    field_goal_made: u16,
    three_point_made: u16,
    field_goal_attempts: u16,
) -> Result<Decimal, CalcError> {
    let weighted = dec(field_goal_made) + dec(three_point_made) * Decimal::new(5, 1);
    ratio("effective_field_goal_pct", weighted, dec(field_goal_attempts))
}

/// 100 × TOV / (FGA + 0.44 × FTA + TOV).
pub fn turnover_pct(
    turnovers: u16,
    field_goal_attempts: u16,
    free_throw_attempts: u16,
) -> Result<Decimal, CalcError> {
    const METRIC: &str = "turnover_pct";
    require_field_goal_attempts(METRIC, field_goal_attempts)?;
    let plays = dec(field_goal_attempts)
        + dec(free_throw_attempts) * free_throw_factor()
        + dec(turnovers);
    ratio(METRIC, dec(turnovers) * Decimal::ONE_HUNDRED, plays)
}

/// Points / FGA.
pub fn points_per_shot(points: u16, field_goal_attempts: u16) -> Result<Decimal, CalcError> {
    ratio("points_per_shot", dec(points), dec(field_goal_attempts))
}

/// PTS + ORB + 0.75·DRB + AST + STL + BLK − 0.75·FGA − 0.375·FTA − TOV − 0.5·PF.
pub fn floor_impact_counter(stats: &StatLine) -> Decimal {
    let three_quarters = Decimal::new(75, 2);
    let positive = dec(stats.points)
        + dec(stats.rebounds_offense)
        + dec(stats.rebounds_defense) * three_quarters
        + dec(stats.assists)
        + dec(stats.steals)
        + dec(stats.blocks);
    let negative = dec(stats.field_goal_attempts) * three_quarters
        + dec(stats.free_throw_attempts) * Decimal::new(375, 3)
        + dec(stats.turnovers)
        + dec(stats.personal_fouls) * Decimal::new(5, 1);
    round4(positive - negative)
}

/// Floor impact counter scaled to 40 minutes of one player slot. `slots` is the number of
/// players sharing `minutes` (five for a team line, one for a player line).
pub fn floor_impact_counter_per40(
    floor_impact_counter: Decimal,
    minutes: u16,
    slots: u16,
) -> Result<Decimal, CalcError> {
    let scaled = floor_impact_counter * Decimal::from(40) * dec(slots);
    ratio("floor_impact_counter_per40", scaled, dec(minutes))
}

/// AST / TOV.
pub fn assist_to_turnover_ratio(assists: u16, turnovers: u16) -> Result<Decimal, CalcError> {
    ratio("assist_to_turnover_ratio", dec(assists), dec(turnovers))
}

/// Attempt/made splits shared by team and player lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShootingSplits {
    pub field_goal_pct: Decimal,
    pub two_point_attempts: u16,
    pub two_point_made: u16,
    pub two_point_pct: Decimal,
    pub three_point_pct: Decimal,
    pub free_throw_pct: Decimal,
    pub rebounds_total: i32,
}

pub fn shooting_splits(stats: &StatLine) -> Result<ShootingSplits, CalcError> {
    let two_point_attempts = stats.two_point_attempts();
    let two_point_made = stats.two_point_made();

    Ok(ShootingSplits {
        field_goal_pct: percentage(
            "field_goal_pct",
            stats.field_goal_made,
            stats.field_goal_attempts,
        )?,
        two_point_attempts,
        two_point_made,
        two_point_pct: percentage("two_point_pct", two_point_made, two_point_attempts)?,
        three_point_pct: percentage(
            "three_point_pct",
            stats.three_point_made,
            stats.three_point_attempts,
        )?,
        free_throw_pct: percentage(
            "free_throw_pct",
            stats.free_throw_made,
            stats.free_throw_attempts,
        )?,
        rebounds_total: stats.rebounds_total(),
    })
}
