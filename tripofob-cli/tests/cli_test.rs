use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use tempfile::{tempdir, TempDir};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn create_test_files(dir: &TempDir, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        let file_path = dir.path().join(name);
        let mut file = File::create(file_path)?;
        writeln!(file, "{}", content)?;
    }
    Ok(())
}

fn tripofob(dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("tripofob")?;
    cmd.current_dir(dir.path()).args([
        "--no-progress",
        "--no-color",
        "--log-file",
        dir.path().join("test.log").to_str().unwrap(),
    ]);
    Ok(cmd)
}

#[test]
fn test_search_prints_matches() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[
            ("file1.txt", "Hello world\nTODO: Fix this\nGoodbye"),
            ("file2.txt", "Another todo here\nSome text"),
            ("file3.txt", "Nothing to see"),
        ],
    )?;

    tripofob(&dir)?
        .args(["-p", "TODO", "-e", "txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 matches in 2 files"))
        .stdout(predicate::str::contains("file1.txt"))
        .stdout(predicate::str::contains("Hello world TODO: Fix this Goodbye"));
    Ok(())
}

#[test]
fn test_stats_only() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("notes.txt", "alpha beta alpha")])?;

    tripofob(&dir)?
        .args(["-p", "alpha", "--stats", "-e", "txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 matches in 1 files"))
        .stdout(predicate::str::contains("notes.txt").not());
    Ok(())
}

#[test]
fn test_no_results() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("notes.txt", "nothing here")])?;

    tripofob(&dir)?
        .args(["-p", "absent", "-e", "txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found"));
    Ok(())
}

#[test]
fn test_invalid_regex_fails() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("notes.txt", "(")])?;

    tripofob(&dir)?
        .args(["-p", "(unclosed", "--regex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pattern"));
    Ok(())
}

#[test]
fn test_missing_root_fails() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing");

    tripofob(&dir)?
        .args(["-p", "x", "-d", missing.to_str().unwrap()])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_export_writes_json() -> Result<()> {
    let dir = tempdir()?;
    let out = dir.path().join("out");
    fs::create_dir(&out)?;
    create_test_files(&dir, &[("report.txt", "invoice 42 overdue")])?;

    tripofob(&dir)?
        .args(["-p", "invoice", "-e", "txt", "--export", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Results saved to"));

    let exported: Vec<_> = fs::read_dir(&out)?.collect::<std::io::Result<_>>()?;
    assert_eq!(exported.len(), 1);
    let name = exported[0].file_name().to_string_lossy().into_owned();
    assert!(name.starts_with("search_results_") && name.ends_with(".json"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(exported[0].path())?)?;
    assert_eq!(json["metadata"]["pattern"], "invoice");
    assert_eq!(json["metadata"]["total_files"], 1);
    assert_eq!(json["results"][0]["type"], "text");
    assert_eq!(json["results"][0]["matches"][0]["match"], "invoice");
    Ok(())
}

#[test]
fn test_spreadsheet_search() -> Result<()> {
    let dir = tempdir()?;
    let mut zip = ZipWriter::new(File::create(dir.path().join("book.xlsx"))?);
    zip.start_file("xl/worksheets/sheet1.xml", SimpleFileOptions::default())?;
    zip.write_all(
        b"<worksheet><sheetData><row r=\"1\"><c><v>7</v></c><c><v>42</v></c></row></sheetData></worksheet>",
    )?;
    zip.finish()?;

    tripofob(&dir)?
        .args(["-p", "42", "-c", "spreadsheets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("book.xlsx"))
        .stdout(predicate::str::contains("Found in cell"))
        .stdout(predicate::str::contains("Found 1 matches in 1 files"));
    Ok(())
}

#[test]
fn test_list_categories() -> Result<()> {
    let dir = tempdir()?;

    tripofob(&dir)?
        .arg("--list-categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("Spreadsheets"))
        .stdout(predicate::str::contains(".xlsx"))
        .stdout(predicate::str::contains("All types"));
    Ok(())
}

#[test]
fn test_pattern_required() -> Result<()> {
    let dir = tempdir()?;
    tripofob(&dir)?.assert().failure();
    Ok(())
}

#[test]
fn test_literal_flag_overrides_regex_config() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join(".tripofob.yaml"), "mode: regex\ncontext_chars: 2\n")?;
    create_test_files(&dir, &[("code.txt", "call a.b(c now")])?;

    // The configured regex mode rejects the pattern
    tripofob(&dir)?
        .args(["-p", "a.b(c", "-e", "txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pattern"));

    tripofob(&dir)?
        .args(["-p", "a.b(c", "-e", "txt", "--literal", "--context", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 matches in 1 files"))
        .stdout(predicate::str::contains("call a.b(c now"));
    Ok(())
}

#[test]
fn test_regex_and_literal_conflict() -> Result<()> {
    let dir = tempdir()?;
    tripofob(&dir)?
        .args(["-p", "x", "--regex", "--literal"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_unknown_encoding_rejected() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("notes.txt", "needle")])?;

    tripofob(&dir)?
        .args(["-p", "needle", "--encoding", "lossless"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lossless"));

    tripofob(&dir)?
        .args(["-p", "needle", "-e", "txt", "--encoding", "skip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 matches in 1 files"));
    Ok(())
}

#[test]
fn test_config_failure_is_logged() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing.yaml");

    tripofob(&dir)?
        .args(["-p", "x", "--config", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));

    let log = fs::read_to_string(dir.path().join("test.log"))?;
    assert!(log.contains("Critical error"));
    assert!(log.contains("Failed to load configuration"));
    Ok(())
}
