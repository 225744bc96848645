use rust_decimal::Decimal;

use super::{
    assist_to_turnover_ratio, effective_field_goal_pct, floor_impact_counter,
    floor_impact_counter_per40, points_per_shot, shooting_splits, true_shooting_pct,
    ShootingSplits,
};
use crate::error::CalcError;
use crate::types::StatLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMetrics {
    pub shooting: ShootingSplits,
    pub true_shooting_pct: Decimal,
    pub effective_field_goal_pct: Decimal,
    pub points_per_shot: Decimal,
    pub floor_impact_counter: Decimal,
    pub floor_impact_counter_per40: Decimal,
    pub assist_to_turnover_ratio: Decimal,
}

pub fn player_metrics(stats: &StatLine) -> Result<PlayerMetrics, CalcError> {
    let fic = floor_impact_counter(stats);

    Ok(PlayerMetrics {
        shooting: shooting_splits(stats)?,
        true_shooting_pct: true_shooting_pct(
            stats.points,
            stats.field_goal_attempts,
            stats.free_throw_attempts,
        )?,
        effective_field_goal_pct: effective_field_goal_pct(
            stats.field_goal_made,
            stats.three_point_made,
            stats.field_goal_attempts,
        )?,
        points_per_shot: points_per_shot(stats.points, stats.field_goal_attempts)?,
        floor_impact_counter: fic,
        floor_impact_counter_per40: floor_impact_counter_per40(fic, stats.minutes, 1)?,
        assist_to_turnover_ratio: assist_to_turnover_ratio(stats.assists, stats.turnovers)?,
    })
}
