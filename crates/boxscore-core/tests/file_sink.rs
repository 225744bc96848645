mod common;

use anyhow::Result;
use boxscore_core::config::DateWindow;
use boxscore_core::source::MemoryRowSource;
use boxscore_core::{
    AggregateKind, BoxScore, BoxScoreSink, FileSink, OfficialBoxScore, OutputRecord, Pipeline,
    PlayerBoxScore, RunConfig, TeamBoxScore, WriterConfig,
};
use chrono::NaiveDate;
use tokio::runtime::Runtime;

use common::{official_game, player_game, team_game, tipoff};

#[test]
fn extract_lines_are_headerless_and_column_aligned() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;

    let rows = vec![
        team_game(tipoff(26, 19)).enrich()?,
        team_game(tipoff(26, 20)).swapped().enrich()?,
    ];
    rt.block_on(async {
        let mut sink = FileSink::in_dir::<TeamBoxScore>(dir.path()).await?;
        sink.write_chunk(&rows[..1]).await?;
        sink.write_chunk(&rows[1..]).await?;
        BoxScoreSink::<TeamBoxScore>::finish(&mut sink).await
    })?;

    let content = std::fs::read_to_string(dir.path().join("teamBoxScore_Extract.txt"))?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_eq!(line.split(',').count(), TeamBoxScore::columns().len());
    }

    let first: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(first[0], "2016-10-26T19:00:00");
    assert_eq!(first[1], "Regular");
    assert_eq!(first[2], "BOS");
    let possessions = TeamBoxScore::columns()
        .iter()
        .position(|column| column == "possessions")
        .expect("possessions column");
    assert_eq!(first[possessions], "99.7703");

    let second: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(second[2], "BKN");
    Ok(())
}

#[test]
fn creating_the_sink_replaces_a_previous_extract() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("officialBoxScore.csv");
    std::fs::create_dir_all(path.parent().unwrap())?;
    std::fs::write(&path, "stale line from an earlier run\n")?;

    let row = official_game(tipoff(26, 19)).enrich()?;
    Runtime::new()?.block_on(async {
        let mut sink = FileSink::create(&path).await?;
        sink.write_chunk(std::slice::from_ref(&row)).await
    })?;

    let content = std::fs::read_to_string(&path)?;
    assert!(!content.contains("stale"));
    assert_eq!(content.lines().count(), 1);
    assert!(content.starts_with("2016-10-26T19:00:00,Regular,Foster,Scott,BOS,"));
    assert_eq!(
        content.trim_end().split(',').count(),
        OfficialBoxScore::columns().len()
    );
    Ok(())
}

#[test]
fn pipeline_writes_player_extract_to_the_configured_directory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let day = NaiveDate::from_ymd_opt(2016, 10, 26).unwrap();
    let config = RunConfig::new(
        AggregateKind::Player,
        DateWindow::new(day, day)?,
        WriterConfig::File {
            extract_dir: dir.path().to_path_buf(),
        },
    );

    let rows = (18..21).map(|hour| player_game(tipoff(26, hour)));
    let summary = Runtime::new()?.block_on(async {
        let sink = FileSink::in_dir::<PlayerBoxScore>(dir.path()).await?;
        let pipeline = Pipeline::new(config, MemoryRowSource::new(rows), Box::new(sink));
        anyhow::Ok(pipeline.run().await?)
    })?;

    assert_eq!(summary.rows_written, 3);
    let content = std::fs::read_to_string(dir.path().join(PlayerBoxScore::EXTRACT_FILE))?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("2016-10-26T18:00:00,Regular,Thomas,Isaiah,BOS,"));
    assert!(lines[2].starts_with("2016-10-26T20:00:00,"));
    for line in lines {
        assert_eq!(line.split(',').count(), PlayerBoxScore::columns().len());
    }
    Ok(())
}

#[test]
fn column_layouts_have_expected_widths() {
    assert_eq!(TeamBoxScore::columns().len(), 122);
    assert_eq!(OfficialBoxScore::columns().len(), 124);
    assert_eq!(PlayerBoxScore::columns().len(), 44);
    assert_eq!(&OfficialBoxScore::columns()[4..], &TeamBoxScore::columns()[2..]);
}
