use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn saral_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("saral");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // Network and generation disabled: loads come from the seed, chat runs limited.
    let config_content = format!(
        r#"[db]
path = "{}/data/schemes.sqlite"

[scraper]
enabled = false
pause_ms = 0

[llm]
provider = "disabled"
min_interval_ms = 0

[server]
bind = "127.0.0.1:8599"
"#,
        root.display()
    );

    let config_path = config_dir.join("saral.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_saral(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = saral_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("GOOGLE_API_KEY")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run saral binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn loaded_env() -> (TempDir, PathBuf) {
    let (tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_saral(&config_path, &["load"]);
    assert!(success, "load failed: stdout={}, stderr={}", stdout, stderr);
    (tmp, config_path)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_saral(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/schemes.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_saral(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_saral(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_load_with_scraping_disabled_uses_seed() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_saral(&config_path, &["load"]);
    assert!(success, "load failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Inserted 12 schemes"));
    assert!(stdout.contains("seed data"));
}

#[test]
fn test_reload_does_not_duplicate() {
    let (_tmp, config_path) = loaded_env();
    run_saral(&config_path, &["load", "--offline"]);

    let (stdout, _, success) = run_saral(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("Schemes:       12"), "stats: {}", stdout);
}

#[test]
fn test_stats_by_category() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, _, success) = run_saral(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("Telangana State"));
    assert!(stdout.contains("Central Government"));
}

#[test]
fn test_list_empty_database() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_saral(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("No schemes loaded"));
}

#[test]
fn test_list_by_category() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, _, success) = run_saral(&config_path, &["list", "--category", "Central Government"]);
    assert!(success);
    assert!(stdout.contains("Showing 6 schemes"));
    assert!(stdout.contains("PM-KISAN Scheme"));
    assert!(!stdout.contains("Rythu Bandhu"));
}

#[test]
fn test_search_farmer() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, stderr, success) = run_saral(&config_path, &["search", "farmer"]);
    assert!(success, "search failed: stderr={}", stderr);
    assert!(stdout.contains("Rythu Bandhu Scheme"));
    assert!(stdout.contains("PM-KISAN Scheme"));
}

#[test]
fn test_search_no_match() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, _, success) = run_saral(&config_path, &["search", "spacecraft"]);
    assert!(success);
    assert!(stdout.contains("No schemes found"));
}

#[test]
fn test_show_scheme() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, stderr, success) = run_saral(&config_path, &["show", "1"]);
    assert!(success, "show failed: stderr={}", stderr);
    assert!(stdout.contains("--- Scheme ---"));
    assert!(stdout.contains("Eligibility:"));
}

#[test]
fn test_show_missing_scheme_fails() {
    let (_tmp, config_path) = loaded_env();

    let (_, stderr, success) = run_saral(&config_path, &["show", "9999"]);
    assert!(!success);
    assert!(stderr.contains("scheme not found"));
}

#[test]
fn test_translate_in_limited_mode_shows_original() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, _, success) = run_saral(&config_path, &["translate", "1", "Hindi"]);
    assert!(success);
    assert!(stdout.contains("translation unavailable (limited mode)"));
}

#[test]
fn test_chat_in_limited_mode_lists_sources() {
    let (_tmp, config_path) = loaded_env();

    let (stdout, stderr, success) =
        run_saral(&config_path, &["chat", "pension for elderly people"]);
    assert!(success, "chat failed: stderr={}", stderr);
    assert!(stdout.contains("AI assistant is unavailable"));
    assert!(stdout.contains("Sources:"));
    assert!(stdout.contains("Aasara Pension Scheme"));

    let (stats, _, _) = run_saral(&config_path, &["stats"]);
    assert!(stats.contains("Queries:       1"), "stats: {}", stats);
}

#[test]
fn test_export_import_roundtrip() {
    let (tmp, config_path) = loaded_env();
    let snapshot = tmp.path().join("snapshot.json");

    let (_, stderr, success) = run_saral(
        &config_path,
        &["export", "--output", snapshot.to_str().unwrap()],
    );
    assert!(success, "export failed: stderr={}", stderr);
    let content = fs::read_to_string(&snapshot).unwrap();
    assert!(content.contains("Mission Bhagiratha"));

    let (stdout, stderr, success) =
        run_saral(&config_path, &["import", snapshot.to_str().unwrap()]);
    assert!(success, "import failed: stderr={}", stderr);
    assert!(stdout.contains("Imported 12 schemes"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("bad.toml");
    fs::write(
        &bad,
        format!(
            "[db]\npath = \"{}/bad.sqlite\"\n\n[llm]\nprovider = \"openai\"\n",
            tmp.path().display()
        ),
    )
    .unwrap();

    let (_, stderr, success) = run_saral(&bad, &["init"]);
    assert!(!success);
    assert!(stderr.contains("Unknown llm provider"));
}
