//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_healthquest-cli"))
        .args(args)
        .env("HEALTHQUEST_DATA_DIR", data_dir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_metrics_set_earns_points() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["metrics", "set", "steps", "12000"]);
    assert!(out.contains("Earned 100 points"), "{out}");

    let rewards = parse_json(&run_cli_success(dir.path(), &["rewards", "show", "--json"]));
    assert_eq!(rewards["totalPoints"], 100);
    assert_eq!(rewards["tokenRewards"], 1);
}

#[test]
fn test_metrics_show_json() {
    let dir = TempDir::new().unwrap();
    run_cli_success(
        dir.path(),
        &["metrics", "set", "water", "6", "--date", "2024-03-01"],
    );
    let record = parse_json(&run_cli_success(dir.path(), &["metrics", "show", "--json"]));
    assert_eq!(record["waterIntake"], 6);
    assert_eq!(record["date"], "2024-03-01");
}

#[test]
fn test_metrics_import_rejects_negative() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("entry.json");
    std::fs::write(&file, r#"{"steps": -5, "waterIntake": 2, "sleepHours": 7}"#).unwrap();

    let (_, stderr, code) = run_cli(dir.path(), &["metrics", "import", file.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("steps"), "{stderr}");
}

#[test]
fn test_metrics_import_full_entry() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("entry.json");
    std::fs::write(
        &file,
        r#"{"steps": 10000, "waterIntake": 8, "sleepHours": 8, "calories": 2000}"#,
    )
    .unwrap();

    let out = run_cli_success(dir.path(), &["metrics", "import", file.to_str().unwrap()]);
    assert!(out.contains("Earned 200 points"), "{out}");
}

#[test]
fn test_score_overrides() {
    let dir = TempDir::new().unwrap();
    let breakdown = parse_json(&run_cli_success(
        dir.path(),
        &["score", "--steps", "5000", "--water", "4", "--sleep", "6", "--json"],
    ));
    assert_eq!(breakdown["steps"], 50);
    assert_eq!(breakdown["water"], 25);
    assert_eq!(breakdown["sleep"], 25);
    assert_eq!(breakdown["total"], 100);
}

#[test]
fn test_rewards_reset() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["metrics", "set", "sleep", "8"]);
    run_cli_success(dir.path(), &["rewards", "reset"]);
    let rewards = parse_json(&run_cli_success(dir.path(), &["rewards", "show", "--json"]));
    assert_eq!(rewards["totalPoints"], 0);
}

#[test]
fn test_goal_lifecycle() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["goal", "add", "steps", "10000"]);
    assert!(out.contains("Goal created:"));

    let goals = parse_json(&run_cli_success(dir.path(), &["goal", "list", "--json"]));
    let id = goals[0]["id"].as_str().unwrap().to_string();
    assert_eq!(goals[0]["type"], "steps");

    let out = run_cli_success(dir.path(), &["goal", "progress", &id, "10000"]);
    assert!(out.contains("Goal completed"));

    let goals = parse_json(&run_cli_success(dir.path(), &["goal", "list", "--json"]));
    assert_eq!(goals[0]["completed"], true);
}

#[test]
fn test_goal_progress_unknown_id() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["goal", "progress", "missing", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("goal not found"));
}

#[test]
fn test_goal_suggest() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["goal", "suggest"]);
    assert!(out.contains("Walk 10000 more steps today"), "{out}");
}

#[test]
fn test_insights_offline() {
    let dir = TempDir::new().unwrap();
    let insights = parse_json(&run_cli_success(
        dir.path(),
        &["insights", "--offline", "--json"],
    ));
    let titles: Vec<_> = insights
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap().to_string())
        .collect();
    assert!(titles.contains(&"Increase Your Steps".to_string()));
}

#[test]
fn test_insights_without_key_falls_back() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["insights"]);
    assert!(out.contains("Stay Hydrated"), "{out}");
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["config", "set", "rewards.currency_label", "HQT"]);
    let out = run_cli_success(dir.path(), &["config", "get", "rewards.currency_label"]);
    assert_eq!(out.trim(), "HQT");

    let list = parse_json(&run_cli_success(dir.path(), &["config", "list"]));
    assert_eq!(list["ledger"]["enabled"], false);

    run_cli_success(dir.path(), &["config", "reset"]);
    let out = run_cli_success(dir.path(), &["config", "get", "rewards.currency_label"]);
    assert_eq!(out.trim(), "BNRY");
}

#[test]
fn test_config_unknown_key() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "get", "nope.nothing"]);
    assert_ne!(code, 0);
}

#[test]
fn test_profile_calculators() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["profile", "bmi", "--weight", "70", "--height", "175"]);
    assert!(out.contains("BMI: 22.9 (Normal)"), "{out}");

    let out = run_cli_success(
        dir.path(),
        &[
            "profile", "calories", "--weight", "80", "--height", "180", "--age", "30",
            "--gender", "male", "--activity", "moderately-active",
        ],
    );
    assert_eq!(out.trim(), "2759 kcal/day");
}

#[test]
fn test_malformed_config_warns_and_uses_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[ledger\nenabled = yes").unwrap();

    let (stdout, stderr, code) = run_cli(dir.path(), &["metrics", "set", "steps", "100"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains("Earned 1 points"), "{stdout}");
    assert!(stderr.contains("using defaults"), "{stderr}");
}

#[test]
fn test_metrics_import_rejects_numeric_date() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("entry.json");
    std::fs::write(
        &file,
        r#"{"steps": 1000, "waterIntake": 2, "sleepHours": 7, "date": 20240501}"#,
    )
    .unwrap();

    let (_, stderr, code) = run_cli(dir.path(), &["metrics", "import", file.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("date"), "{stderr}");
}

#[test]
fn test_ledger_commands_need_a_session() {
    let dir = TempDir::new().unwrap();
    for args in [
        &["ledger", "status"][..],
        &["ledger", "register"][..],
        &["rewards", "claim"][..],
    ] {
        let (_, stderr, code) = run_cli(dir.path(), args);
        assert_ne!(code, 0, "{args:?}");
        assert!(stderr.contains("Ledger session is not active"), "{stderr}");
    }
}

#[test]
fn test_goal_suggest_offline() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["metrics", "set", "steps", "9000"]);
    let out = run_cli_success(dir.path(), &["goal", "suggest", "--offline"]);
    assert!(out.contains("Drink 8 more glasses of water"), "{out}");
    assert!(!out.contains("steps"), "{out}");
}
