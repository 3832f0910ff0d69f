use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("malldesk-{nanos}-{file_name}"))
}

fn spawn_session(config_path: &Path, args: &[&str]) -> std::process::Child {
    Command::new(env!("CARGO_BIN_EXE_malldesk"))
        .args(args)
        .env("MALLDESK_CONFIG_PATH", config_path)
        .env_remove("MALLDESK_SEED_PATH")
        .env_remove("MALLDESK_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session")
}

fn run_interactive(input: &str) -> std::process::Output {
    run_interactive_with_config(&temp_path("absent-config.json"), input)
}

fn run_interactive_with_config(config_path: &Path, input: &str) -> std::process::Output {
    run_interactive_with_args(config_path, &[], input)
}

fn run_interactive_with_args(
    config_path: &Path,
    args: &[&str],
    input: &str,
) -> std::process::Output {
    let mut child = spawn_session(config_path, args);

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    child
        .wait_with_output()
        .expect("failed to read interactive output")
}

#[test]
fn interactive_help_shows_usage() {
    let output = run_interactive("help\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage") || stdout.contains("USAGE"));
}

#[test]
fn interactive_help_ignores_case() {
    let output = run_interactive("HELP\nExit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage") || stdout.contains("USAGE"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("ERROR"));
}

#[test]
fn interactive_session_inherits_json_flag() {
    let output = run_interactive_with_args(
        &temp_path("absent-config.json"),
        &["--json"],
        "stats\nexit\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stats: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(stats["total"], 4);
}

#[test]
fn interactive_rejects_session_flags_per_line() {
    let output = run_interactive(
        "stats --no-seed\nstats --config-override seed_demo=maybe\nstats --json\nexit\n",
    );
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr
            .matches("ERROR: invalid_input - session flags cannot be changed inside a session")
            .count(),
        2
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stats: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(stats["total"], 4);
}

#[test]
fn interactive_invalid_command_prints_error_and_continues() {
    let output = run_interactive("nope\nstats\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Maintenance requests: 4"));
}

#[test]
fn interactive_session_keeps_state_between_commands() {
    let output = run_interactive(
        "next 1\nnext 1\nlist --status in-progress --json\nquit\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let listed = stdout
        .lines()
        .find(|line| line.starts_with('['))
        .expect("json list line");
    let tickets: serde_json::Value = serde_json::from_str(listed).unwrap();
    let ids: Vec<&str> = tickets
        .as_array()
        .unwrap()
        .iter()
        .map(|ticket| ticket["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn interactive_create_bumps_request_counter() {
    let output = run_interactive(
        "create --category Cleaning --description \"Spill near the escalator\" --location \"East Wing\"\nstats\nexit\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created request: Cleaning"));
    assert!(stdout.contains("Maintenance requests: 5"));
    assert!(stdout.contains("Pending: 2"));
}

#[test]
fn interactive_failed_create_leaves_counter_alone() {
    let output = run_interactive(
        "create --category Cleaning --description short --location \"East Wing\"\nstats\nexit\n",
    );
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("description: Description should be at least 10 characters"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Maintenance requests: 4"));
}

#[test]
fn interactive_expands_config_aliases() {
    let config_path = temp_path("cli-interactive-config.json");
    let content = serde_json::json!({
        "aliases": {
            "open": "list --status pending --json"
        }
    });
    std::fs::write(&config_path, serde_json::to_string(&content).unwrap()).unwrap();

    let output = run_interactive_with_config(&config_path, "open\nexit\n");
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let tickets: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(tickets.as_array().unwrap().len(), 1);
    assert_eq!(tickets[0]["id"], "1");
}

#[test]
fn interactive_request_lifecycle_end_to_end() {
    let mut child = spawn_session(&temp_path("absent-config.json"), &["--no-seed"]);
    let mut stdin = child.stdin.take().expect("stdin");
    let mut stdout = BufReader::new(child.stdout.take().expect("stdout"));

    stdin
        .write_all(
            b"create --json --category Plumbing --description \"Water leak in food court restroom\" --location \"Food Court, Ground Floor\" --priority high\n",
        )
        .unwrap();
    stdin.flush().unwrap();

    let mut created_line = String::new();
    stdout.read_line(&mut created_line).unwrap();
    let created: serde_json::Value = serde_json::from_str(&created_line).unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "pending");

    let script = format!(
        "stats --json\nadvance {id} assigned\nadvance {id} in-progress\nadvance {id} completed\nshow {id} --json\nlist --status completed --json\nexit\n"
    );
    stdin.write_all(script.as_bytes()).unwrap();
    drop(stdin);

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert!(child.wait().unwrap().success());

    let lines: Vec<&str> = rest.lines().collect();
    let stats: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["maintenance_requests"], 1);
    assert!(lines[1].ends_with("assigned"));
    assert!(lines[2].ends_with("in-progress"));
    assert!(lines[3].ends_with("completed"));

    let shown: serde_json::Value = serde_json::from_str(lines[4]).unwrap();
    assert_eq!(shown["status"], "completed");
    assert!(shown["resolved_at"].is_string());

    let completed: serde_json::Value = serde_json::from_str(lines[5]).unwrap();
    let completed = completed.as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["id"].as_str(), Some(id.as_str()));
}
