use std::process::{Command, Output};

use anyhow::Result;

fn boxscore(args: &[&str]) -> Result<Output> {
    let dir = tempfile::tempdir()?;
    let output = Command::new(env!("CARGO_BIN_EXE_boxscore"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("BOXSCORE_SOURCE_DATABASE_URL")
        .env_remove("BOXSCORE_TARGET_DATABASE_URL")
        .env_remove("DATABASE_URL")
        .output()?;
    Ok(output)
}

#[test]
fn invalid_date_exits_non_zero() -> Result<()> {
    let output = boxscore(&[
        "aggregate",
        "team",
        "--from",
        "2016-13-01",
        "--to",
        "2016-10-27",
    ])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("2016-13-01"));
    Ok(())
}

#[test]
fn unknown_destination_exits_non_zero() -> Result<()> {
    let output = boxscore(&[
        "aggregate",
        "team",
        "--from",
        "2016-10-26",
        "--to",
        "2016-10-27",
        "--destination",
        "ftp",
    ])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ftp"));
    Ok(())
}

#[test]
fn inverted_window_exits_non_zero_before_connecting() -> Result<()> {
    let output = boxscore(&[
        "aggregate",
        "player",
        "--from",
        "2016-10-27",
        "--to",
        "2016-10-26",
    ])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("inverted"), "{stderr}");
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn missing_dates_exit_non_zero() -> Result<()> {
    let output = boxscore(&["aggregate", "official"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("from_date"));
    Ok(())
}

#[test]
fn file_destination_without_directory_exits_non_zero() -> Result<()> {
    let output = boxscore(&[
        "aggregate",
        "team",
        "--from",
        "2016-10-26",
        "--to",
        "2016-10-26",
        "--destination",
        "file",
    ])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("extract directory"));
    Ok(())
}
