use once_cell::sync::Lazy;

use super::team::{matchup_columns, push_matchup_values, RawTeamBoxScore, TeamBoxScore};
use super::BoxScore;
use crate::calculations::team::team_game_metrics;
use crate::error::RowError;
use crate::output::{FieldValue, OutputRecord};
use crate::types::RowKey;

/// A paired team box score attributed to one of the game's officials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOfficialBoxScore {
    pub official_last_name: String,
    pub official_first_name: String,
    pub game: RawTeamBoxScore,
}

impl RawOfficialBoxScore {
    fn official_name(&self) -> String {
        format!("{} {}", self.official_first_name, self.official_last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficialBoxScore {
    pub official_last_name: String,
    pub official_first_name: String,
    pub game: TeamBoxScore,
}

impl BoxScore for RawOfficialBoxScore {
    type Enriched = OfficialBoxScore;

    fn key(&self) -> RowKey {
        RowKey {
            subject: Some(self.official_name()),
            ..self.game.key()
        }
    }

    fn enrich(self) -> Result<OfficialBoxScore, RowError> {
        self.game.validate()?;
        let metrics = team_game_metrics(&self.game.team.stats, &self.game.opponent.stats)?;
        Ok(OfficialBoxScore {
            official_last_name: self.official_last_name,
            official_first_name: self.official_first_name,
            game: TeamBoxScore {
                raw: self.game,
                metrics,
            },
        })
    }
}

static OFFICIAL_COLUMNS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "game_date_time",
        "season_type",
        "official_last_name",
        "official_first_name",
    ]
    .iter()
    .map(|name| name.to_string())
    .chain(matchup_columns())
    .collect()
});

impl OutputRecord for OfficialBoxScore {
    const TABLE: &'static str = "official_box_score";
    const EXTRACT_FILE: &'static str = "officialBoxScore.csv";

    fn columns() -> &'static [String] {
        OFFICIAL_COLUMNS.as_slice()
    }

    fn values(&self) -> Vec<FieldValue> {
        let mut values = Vec::with_capacity(OFFICIAL_COLUMNS.len());
        values.push(FieldValue::from(self.game.raw.game_date_time));
        values.push(FieldValue::from(self.game.raw.season_type.as_str()));
        values.push(FieldValue::from(self.official_last_name.as_str()));
        values.push(FieldValue::from(self.official_first_name.as_str()));
        push_matchup_values(&mut values, &self.game);
        values
    }
}
