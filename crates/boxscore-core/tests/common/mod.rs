#![allow(dead_code)]

use boxscore_core::types::{GameResult, Location, SeasonType, StatLine, TeamInfo, TeamSide};
use boxscore_core::{RawOfficialBoxScore, RawPlayerBoxScore, RawTeamBoxScore};
use chrono::{NaiveDate, NaiveDateTime};

pub fn tipoff(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 10, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid fixture timestamp")
}

pub fn team_stats() -> StatLine {
    StatLine {
        minutes: 240,
        points: 99,
        assists: 20,
        turnovers: 21,
        steals: 7,
        blocks: 5,
        personal_fouls: 18,
        field_goal_attempts: 79,
        field_goal_made: 36,
        three_point_attempts: 15,
        three_point_made: 8,
        free_throw_attempts: 22,
        free_throw_made: 15,
        rebounds_offense: 8,
        rebounds_defense: 36,
    }
}

pub fn opponent_stats() -> StatLine {
    StatLine {
        minutes: 240,
        points: 104,
        assists: 25,
        turnovers: 25,
        steals: 9,
        blocks: 4,
        personal_fouls: 20,
        field_goal_attempts: 79,
        field_goal_made: 43,
        three_point_attempts: 20,
        three_point_made: 7,
        free_throw_attempts: 12,
        free_throw_made: 11,
        rebounds_offense: 10,
        rebounds_defense: 30,
    }
}

fn info(abbr: &str, location: Location, result: GameResult) -> TeamInfo {
    TeamInfo {
        abbr: abbr.to_string(),
        conference: "East".to_string(),
        division: "Atlantic".to_string(),
        location,
        result,
        days_off: 1,
    }
}

pub fn home_info() -> TeamInfo {
    info("BOS", Location::Home, GameResult::Loss)
}

pub fn away_info() -> TeamInfo {
    info("BKN", Location::Away, GameResult::Win)
}

pub fn team_game(game_date_time: NaiveDateTime) -> RawTeamBoxScore {
    RawTeamBoxScore {
        game_date_time,
        season_type: SeasonType::Regular,
        team: TeamSide {
            info: home_info(),
            stats: team_stats(),
            period_points: [25, 24, 26, 24, 0, 0, 0, 0],
        },
        opponent: TeamSide {
            info: away_info(),
            stats: opponent_stats(),
            period_points: [30, 22, 27, 25, 0, 0, 0, 0],
        },
    }
}

/// A game whose opponent turned the ball over zero times, so the opponent's
/// assist-to-turnover ratio has no denominator.
pub fn broken_team_game(game_date_time: NaiveDateTime) -> RawTeamBoxScore {
    let mut game = team_game(game_date_time);
    game.opponent.stats.turnovers = 0;
    game
}

pub fn official_game(game_date_time: NaiveDateTime) -> RawOfficialBoxScore {
    RawOfficialBoxScore {
        official_last_name: "Foster".to_string(),
        official_first_name: "Scott".to_string(),
        game: team_game(game_date_time),
    }
}

pub fn player_stats() -> StatLine {
    StatLine {
        minutes: 36,
        points: 95,
        assists: 6,
        turnovers: 3,
        steals: 2,
        blocks: 1,
        personal_fouls: 2,
        field_goal_attempts: 84,
        field_goal_made: 36,
        three_point_attempts: 15,
        three_point_made: 8,
        free_throw_attempts: 22,
        free_throw_made: 15,
        rebounds_offense: 8,
        rebounds_defense: 36,
    }
}

pub fn player_game(game_date_time: NaiveDateTime) -> RawPlayerBoxScore {
    RawPlayerBoxScore {
        game_date_time,
        season_type: SeasonType::Regular,
        player_last_name: "Thomas".to_string(),
        player_first_name: "Isaiah".to_string(),
        team: home_info(),
        opponent: away_info(),
        stats: player_stats(),
    }
}
