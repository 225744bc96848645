mod common;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use boxscore_core::config::DateWindow;
use boxscore_core::error::RowError;
use boxscore_core::sink::{BoxScoreSink, SinkError};
use boxscore_core::source::MemoryRowSource;
use boxscore_core::{
    AggregateKind, ErrorPolicy, OutputRecord, Pipeline, PipelineError, PipelineState,
    RawTeamBoxScore, RowFailure, RunConfig, TeamBoxScore, ValidationError, WriterConfig,
};
use chrono::NaiveDate;
use tokio::runtime::Runtime;

use common::{broken_team_game, official_game, player_game, team_game, tipoff};

/// Records delivered chunks and can be told to reject a given chunk.
#[derive(Clone, Default)]
struct RecordingSink {
    chunks: Arc<Mutex<Vec<Vec<String>>>>,
    fail_on_chunk: Option<usize>,
    finished: Arc<Mutex<bool>>,
}

impl RecordingSink {
    fn failing_on(chunk: usize) -> Self {
        Self {
            fail_on_chunk: Some(chunk),
            ..Self::default()
        }
    }

    fn delivered(&self) -> Vec<Vec<String>> {
        self.chunks.lock().unwrap().clone()
    }
}

#[async_trait]
impl<R: OutputRecord + Sync> BoxScoreSink<R> for RecordingSink {
    async fn write_chunk(&mut self, rows: &[R]) -> Result<(), SinkError> {
        let mut chunks = self.chunks.lock().unwrap();
        if self.fail_on_chunk == Some(chunks.len() + 1) {
            return Err(SinkError::Io {
                path: "unreachable".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        chunks.push(
            rows.iter()
                .map(|row| {
                    row.values()
                        .iter()
                        .take(4)
                        .map(|value| value.to_field())
                        .collect::<Vec<_>>()
                        .join("|")
                })
                .collect(),
        );
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        *self.finished.lock().unwrap() = true;
        Ok(())
    }
}

fn run_config(kind: AggregateKind, chunk_size: usize, policy: ErrorPolicy) -> RunConfig {
    let day = NaiveDate::from_ymd_opt(2016, 10, 26).unwrap();
    let window = DateWindow::new(day, day.succ_opt().unwrap()).unwrap();
    RunConfig::new(kind, window, WriterConfig::Database)
        .with_chunk_size(chunk_size)
        .unwrap()
        .with_error_policy(policy)
}

fn games(count: u32) -> Vec<RawTeamBoxScore> {
    (0..count).map(|hour| team_game(tipoff(26, hour))).collect()
}

#[test]
fn delivers_every_row_in_read_order() -> Result<()> {
    let sink = RecordingSink::default();
    let config = run_config(AggregateKind::Team, 2, ErrorPolicy::FailFast);
    let pipeline = Pipeline::new(
        config,
        MemoryRowSource::new(games(5)),
        Box::new(sink.clone()),
    );
    assert_eq!(pipeline.state(), PipelineState::Idle);

    let summary = Runtime::new()?.block_on(pipeline.run())?;

    assert_eq!(summary.state, PipelineState::Completed);
    assert_eq!(summary.rows_read, 5);
    assert_eq!(summary.rows_written, 5);
    assert_eq!(summary.chunks_written, 3);
    assert!(summary.row_failures.is_empty());
    assert!(*sink.finished.lock().unwrap());

    let delivered = sink.delivered();
    assert_eq!(
        delivered.iter().map(Vec::len).collect::<Vec<_>>(),
        vec![2, 2, 1]
    );
    let timestamps: Vec<String> = delivered
        .concat()
        .iter()
        .map(|line| line.split('|').next().unwrap_or_default().to_string())
        .collect();
    let mut sorted = timestamps.clone();
    sorted.sort();
    assert_eq!(timestamps, sorted);
    Ok(())
}

#[test]
fn empty_window_completes_without_writing() -> Result<()> {
    let sink = RecordingSink::default();
    let config = run_config(AggregateKind::Team, 20, ErrorPolicy::FailFast);
    let pipeline = Pipeline::new(
        config,
        MemoryRowSource::<RawTeamBoxScore>::new(Vec::new()),
        Box::new(sink.clone()),
    );

    let summary = Runtime::new()?.block_on(pipeline.run())?;
    assert_eq!(summary.state, PipelineState::Completed);
    assert_eq!(summary.rows_written, 0);
    assert!(sink.delivered().is_empty());
    Ok(())
}

#[test]
fn fail_fast_stops_before_the_failing_chunk_is_delivered() -> Result<()> {
    let sink = RecordingSink::default();
    let mut rows = games(3);
    rows.push(broken_team_game(tipoff(26, 3)));
    rows.extend((4..6).map(|hour| team_game(tipoff(26, hour))));

    let config = run_config(AggregateKind::Team, 2, ErrorPolicy::FailFast);
    let pipeline = Pipeline::new(config, MemoryRowSource::new(rows), Box::new(sink.clone()));

    let failure = Runtime::new()?
        .block_on(pipeline.run())
        .expect_err("broken row must fail the run");

    match &failure.source {
        PipelineError::Row(RowFailure { key, error }) => {
            assert_eq!(key.team, "BOS");
            assert_eq!(key.opponent, "BKN");
            assert_eq!(key.game_date_time, tipoff(26, 3));
            assert_eq!(error.metric(), Some("assist_to_turnover_ratio"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(failure.summary.state, PipelineState::Failed);
    // Only the first chunk made it out; the chunk holding the bad row did not.
    assert_eq!(sink.delivered().len(), 1);
    assert_eq!(failure.summary.rows_written, 2);
    assert_eq!(failure.summary.row_failures.len(), 1);
    assert!(!*sink.finished.lock().unwrap());
    Ok(())
}

#[test]
fn best_effort_delivers_healthy_rows_and_still_fails() -> Result<()> {
    let sink = RecordingSink::default();
    let mut rows = games(3);
    rows.insert(1, broken_team_game(tipoff(26, 1)));

    let config = run_config(AggregateKind::Team, 2, ErrorPolicy::BestEffort);
    let pipeline = Pipeline::new(config, MemoryRowSource::new(rows), Box::new(sink.clone()));

    let failure = Runtime::new()?
        .block_on(pipeline.run())
        .expect_err("rejected rows must surface as a failed run");

    assert!(matches!(
        failure.source,
        PipelineError::RowsRejected { count: 1 }
    ));
    assert_eq!(failure.summary.state, PipelineState::Failed);
    assert_eq!(failure.summary.rows_read, 4);
    assert_eq!(failure.summary.rows_written, 3);
    assert_eq!(failure.summary.row_failures[0].metric, Some("assist_to_turnover_ratio"));
    assert_eq!(
        sink.delivered().iter().map(Vec::len).collect::<Vec<_>>(),
        vec![1, 2]
    );
    Ok(())
}

#[test]
fn rejected_source_rows_follow_the_error_policy() -> Result<()> {
    let sink = RecordingSink::default();
    let bad = RowFailure {
        key: boxscore_core::types::RowKey {
            game_date_time: tipoff(26, 2),
            team: "BOS".to_string(),
            opponent: "BKN".to_string(),
            subject: None,
        },
        error: RowError::Validation {
            side: None,
            source: ValidationError::NegativeCount {
                field: "steals",
                value: -2,
            },
        },
    };
    let source = MemoryRowSource::from_fetched(vec![
        Ok(team_game(tipoff(26, 1))),
        Err(bad),
        Ok(team_game(tipoff(26, 3))),
    ]);

    let config = run_config(AggregateKind::Team, 20, ErrorPolicy::BestEffort);
    let failure = Runtime::new()?
        .block_on(Pipeline::new(config, source, Box::new(sink.clone())).run())
        .expect_err("rejected rows fail the run");

    assert_eq!(failure.summary.rows_written, 2);
    assert_eq!(failure.summary.row_failures[0].metric, None);
    assert_eq!(sink.delivered().concat().len(), 2);
    Ok(())
}

#[test]
fn delivery_failure_aborts_without_retry() -> Result<()> {
    let sink = RecordingSink::failing_on(2);
    let config = run_config(AggregateKind::Team, 2, ErrorPolicy::FailFast);
    let pipeline = Pipeline::new(
        config,
        MemoryRowSource::new(games(6)),
        Box::new(sink.clone()),
    );

    let failure = Runtime::new()?
        .block_on(pipeline.run())
        .expect_err("sink failure must fail the run");

    assert!(matches!(
        failure.source,
        PipelineError::Delivery { chunk: 2, .. }
    ));
    assert_eq!(failure.summary.state, PipelineState::Failed);
    assert_eq!(failure.summary.rows_read, 4);
    assert_eq!(failure.summary.rows_written, 2);
    assert_eq!(sink.delivered().len(), 1);
    Ok(())
}

#[test]
fn official_and_player_rows_share_the_coordinator() -> Result<()> {
    let rt = Runtime::new()?;

    let official_sink = RecordingSink::default();
    let summary = rt.block_on(
        Pipeline::new(
            run_config(AggregateKind::Official, 20, ErrorPolicy::FailFast),
            MemoryRowSource::new(vec![official_game(tipoff(26, 19))]),
            Box::new(official_sink.clone()),
        )
        .run(),
    )?;
    assert_eq!(summary.kind, AggregateKind::Official);
    assert_eq!(summary.rows_written, 1);
    assert_eq!(
        official_sink.delivered()[0][0],
        "2016-10-26T19:00:00|Regular|Foster|Scott"
    );

    let player_sink = RecordingSink::default();
    let summary = rt.block_on(
        Pipeline::new(
            run_config(AggregateKind::Player, 20, ErrorPolicy::FailFast),
            MemoryRowSource::new(vec![player_game(tipoff(26, 19))]),
            Box::new(player_sink.clone()),
        )
        .run(),
    )?;
    assert_eq!(summary.rows_written, 1);
    assert_eq!(
        player_sink.delivered()[0][0],
        "2016-10-26T19:00:00|Regular|Thomas|Isaiah"
    );
    Ok(())
}

#[test]
fn players_without_three_point_attempts_are_reported_and_excluded() -> Result<()> {
    let sink = RecordingSink::default();
    let mut bench = player_game(tipoff(26, 19));
    bench.player_last_name = "Rozier".to_string();
    bench.player_first_name = "Terry".to_string();
    bench.stats.three_point_attempts = 0;
    bench.stats.three_point_made = 0;

    let source = MemoryRowSource::new(vec![player_game(tipoff(26, 19)), bench]);
    let config = run_config(AggregateKind::Player, 20, ErrorPolicy::BestEffort);
    let failure = Runtime::new()?
        .block_on(Pipeline::new(config, source, Box::new(sink.clone())).run())
        .expect_err("an excluded player still fails the run");

    assert!(matches!(
        failure.source,
        PipelineError::RowsRejected { count: 1 }
    ));
    assert_eq!(failure.summary.rows_read, 2);
    assert_eq!(failure.summary.rows_written, 1);

    let report = &failure.summary.row_failures[0];
    assert_eq!(report.key.subject.as_deref(), Some("Terry Rozier"));
    assert_eq!(report.metric, Some("three_point_pct"));
    assert_eq!(
        sink.delivered(),
        vec![vec!["2016-10-26T19:00:00|Regular|Thomas|Isaiah".to_string()]]
    );
    Ok(())
}

#[test]
fn summary_serializes_state_and_failures() -> Result<()> {
    let config = run_config(AggregateKind::Team, 20, ErrorPolicy::BestEffort);
    let failure = Runtime::new()?
        .block_on(
            Pipeline::new(
                config,
                MemoryRowSource::new(vec![broken_team_game(tipoff(26, 20))]),
                Box::new(RecordingSink::default()),
            )
            .run(),
        )
        .expect_err("broken row");

    let json = serde_json::to_value(&failure.summary)?;
    assert_eq!(json["state"]["phase"], "failed");
    assert_eq!(json["kind"], "team");
    assert_eq!(json["destination"], "database");
    assert_eq!(json["row_failures"][0]["team"], "BOS");
    assert_eq!(json["row_failures"][0]["side"], "opponent");
    assert_eq!(json["row_failures"][0]["metric"], "assist_to_turnover_ratio");
    Ok(())
}

#[test]
fn enriched_team_rows_match_the_column_layout() {
    let row: TeamBoxScore = boxscore_core::BoxScore::enrich(team_game(tipoff(26, 19))).unwrap();
    assert_eq!(row.values().len(), TeamBoxScore::columns().len());
    assert_eq!(TeamBoxScore::columns().len(), 122);
}
