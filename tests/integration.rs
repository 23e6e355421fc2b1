use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn spx_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("spx");
    path
}

const SAMPLE_CSV: &str = "\
Organisation Name,Town/City,County,Type & Rating,Route
Acme Widgets Ltd,London,Greater London,Worker (A rating),Skilled Worker
ACME WIDGETS LTD,Manchester,,Worker (A rating),Skilled Worker
Acme Widgets Ltd,London,Greater London,Worker (A rating),Global Business Mobility: Senior or Specialist Worker
Zzoomm Plc,Henley-on-Thames,Oxfordshire,Worker (A rating),Skilled Worker
The A Company Ltd,Leeds,West Yorkshire,Worker (A rating),Skilled Worker
,Nowhere,,Worker (A rating),Skilled Worker
";

// Expected from the sample: 6 rows read, 1 skipped (no name), 3
// organisations. Entries: Acme (ACME, WIDGETS) 3, Zzoomm (ZZOOMM, PLC) 3,
// The A Company Ltd (all stop words) 1 canonical only. Total 7.

fn setup_test_env() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let csv_path = root.join("sponsors.csv");
    fs::write(&csv_path, SAMPLE_CSV).unwrap();

    let config_content = format!(
        r#"[store]
path = "{}/data/spx.sqlite"
table = "sponsor_entries"

[ingest]
batch_size = 25
concurrency = 5
"#,
        root.display()
    );

    let config_path = config_dir.join("spx.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path, csv_path)
}

fn stat_value(stats: &str, label: &str) -> String {
    stats
        .lines()
        .find_map(|line| line.trim_start().strip_prefix(label))
        .map(|rest| rest.trim().to_string())
        .unwrap_or_default()
}

fn run_spx(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = spx_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run spx binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_table() {
    let (_tmp, config_path, _csv) = setup_test_env();

    let (stdout, stderr, success) = run_spx(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path, _csv) = setup_test_env();

    let (_, _, success1) = run_spx(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_spx(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_seed_counts() {
    let (_tmp, config_path, csv) = setup_test_env();

    run_spx(&config_path, &["init"]);
    let (stdout, stderr, success) = run_spx(&config_path, &["seed", csv.to_str().unwrap()]);
    assert!(success, "seed failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("rows read: 6"));
    assert!(stdout.contains("rows skipped: 1"));
    assert!(stdout.contains("organisations: 3"));
    assert!(stdout.contains("entries built: 7"));
    assert!(stdout.contains("entries written: 7"));
    assert!(stdout.contains("duplicates skipped: 0"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_seed_dry_run_writes_nothing() {
    let (_tmp, config_path, csv) = setup_test_env();

    run_spx(&config_path, &["init"]);
    let (stdout, _, success) = run_spx(&config_path, &["seed", csv.to_str().unwrap(), "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("dry-run"));
    assert!(stdout.contains("entries estimated: 7"));

    let (stats, _, _) = run_spx(&config_path, &["stats"]);
    assert_eq!(stat_value(&stats, "Entries:"), "0", "stats: {}", stats);
}

#[test]
fn test_reseeding_duplicates_rather_than_upserts() {
    let (_tmp, config_path, csv) = setup_test_env();

    run_spx(&config_path, &["init"]);
    let (stdout1, _, _) = run_spx(&config_path, &["seed", csv.to_str().unwrap()]);
    assert!(stdout1.contains("entries written: 7"));

    // Fresh organisation ids mean no key collisions: the second run adds
    // 7 more entries instead of upserting. Documented behavior.
    let (stdout2, _, success) = run_spx(&config_path, &["seed", csv.to_str().unwrap()]);
    assert!(success);
    assert!(stdout2.contains("entries written: 7"));
    assert!(stdout2.contains("duplicates skipped: 0"));

    let (stats, _, _) = run_spx(&config_path, &["stats"]);
    assert_eq!(stat_value(&stats, "Entries:"), "14", "stats: {}", stats);
    assert_eq!(stat_value(&stats, "Organisations:"), "6", "stats: {}", stats);
}

#[test]
fn test_search_finds_by_keyword() {
    let (_tmp, config_path, csv) = setup_test_env();

    run_spx(&config_path, &["init"]);
    run_spx(&config_path, &["seed", csv.to_str().unwrap()]);

    let (stdout, _, success) = run_spx(&config_path, &["search", "widgets"]);
    assert!(success);
    assert!(stdout.contains("Acme Widgets Ltd"));
    assert!(stdout.contains("town: London, Greater London"));
    assert!(stdout.contains("Skilled Worker | Global Business Mobility: Senior or Specialist Worker"));
}

#[test]
fn test_search_stop_words_find_nothing() {
    let (_tmp, config_path, csv) = setup_test_env();

    run_spx(&config_path, &["init"]);
    run_spx(&config_path, &["seed", csv.to_str().unwrap()]);

    // "company" is a stop word: The A Company Ltd has a canonical entry
    // but is unreachable by keyword.
    let (stdout, _, success) = run_spx(&config_path, &["search", "the a company ltd"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_get_by_id_from_search() {
    let (_tmp, config_path, csv) = setup_test_env();

    run_spx(&config_path, &["init"]);
    run_spx(&config_path, &["seed", csv.to_str().unwrap()]);

    let (search_out, _, _) = run_spx(&config_path, &["search", "zzoomm"]);
    let id_line = search_out
        .lines()
        .find(|line| line.trim_start().starts_with("id: "))
        .expect("search output should include an id line");
    let org_id = id_line.trim_start().trim_start_matches("id: ").trim();

    let (stdout, stderr, success) = run_spx(&config_path, &["get", org_id]);
    assert!(success, "get failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Zzoomm Plc"));
    assert!(stdout.contains("Henley-on-Thames"));
    assert!(stdout.contains("PLC"));
    assert!(stdout.contains("ZZOOMM"));
}

#[test]
fn test_get_unknown_id_fails() {
    let (_tmp, config_path, _csv) = setup_test_env();

    run_spx(&config_path, &["init"]);
    let (_, stderr, success) = run_spx(&config_path, &["get", "no-such-id"]);
    assert!(!success);
    assert!(stderr.contains("No organisation found"));
}

#[test]
fn test_clean_merges_routes() {
    let (tmp, config_path, csv) = setup_test_env();
    let out_path = tmp.path().join("cleaned.csv");

    let (stdout, stderr, success) = run_spx(
        &config_path,
        &["clean", csv.to_str().unwrap(), "--out", out_path.to_str().unwrap()],
    );
    assert!(success, "clean failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("organisations written: 3"));

    let cleaned = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = cleaned.lines().collect();
    assert_eq!(
        lines[0],
        "Organisation Name,Town/City,County,Type & Rating,Route"
    );
    // Header plus one row per organisation.
    assert_eq!(lines.len(), 4);

    let acme_rows: Vec<&&str> = lines
        .iter()
        .filter(|line| line.to_lowercase().contains("acme"))
        .collect();
    assert_eq!(acme_rows.len(), 1);
    assert!(acme_rows[0]
        .contains("Skilled Worker | Global Business Mobility: Senior or Specialist Worker"));
}

#[test]
fn test_stats_after_seed() {
    let (_tmp, config_path, csv) = setup_test_env();

    run_spx(&config_path, &["init"]);
    run_spx(&config_path, &["seed", csv.to_str().unwrap()]);

    let (stdout, _, success) = run_spx(&config_path, &["stats"]);
    assert!(success);
    assert_eq!(stat_value(&stdout, "Entries:"), "7", "stats: {}", stdout);
    assert_eq!(stat_value(&stdout, "Organisations:"), "3", "stats: {}", stdout);
    assert_eq!(stat_value(&stdout, "Keyword entries:"), "4", "stats: {}", stdout);
}

#[test]
fn test_missing_config_value_fails_before_io() {
    let (tmp, _config_path, csv) = setup_test_env();

    // Config without the required batch_size.
    let bad_config = tmp.path().join("config").join("bad.toml");
    fs::write(
        &bad_config,
        format!(
            r#"[store]
path = "{}/data/other.sqlite"
table = "sponsor_entries"

[ingest]
concurrency = 5
"#,
            tmp.path().display()
        ),
    )
    .unwrap();

    let (_, stderr, success) = run_spx(&bad_config, &["seed", csv.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("batch_size"), "stderr: {}", stderr);
    // Fail-fast: the database file must not have been created.
    assert!(!tmp.path().join("data").join("other.sqlite").exists());
}

#[test]
fn test_seed_limit_caps_rows() {
    let (_tmp, config_path, csv) = setup_test_env();

    run_spx(&config_path, &["init"]);
    let (stdout, _, success) = run_spx(
        &config_path,
        &["seed", csv.to_str().unwrap(), "--limit", "1"],
    );
    assert!(success);
    assert!(stdout.contains("rows read: 1"));
    assert!(stdout.contains("organisations: 1"));
}
