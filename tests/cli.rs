//! Integration tests for top-level CLI behavior.

use std::path::Path;
use std::process::Command;

fn run_roster(dir: &Path, args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_roster");
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env("ROSTER_DATABASE", dir.join("roster.db"))
        .env("ROSTER_TODAY", "2025-06-02")
        .env_remove("ROSTER_CONFIG")
        .env_remove("ROSTER_LOG")
        .output()
        .expect("failed to run roster binary")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn add(dir: &Path, name: &str, email: &str) -> std::process::Output {
    run_roster(dir, &["employee", "add", "--name", name, "--email", email])
}

#[test]
fn init_reports_database_path() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_roster(dir.path(), &["init"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("roster.db"));
}

#[test]
fn employee_add_prints_sequential_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let first = add(dir.path(), "Ada Lovelace", "ada@example.com");
    let second = add(dir.path(), "Bob Noyce", "bob@example.com");

    assert!(first.status.success());
    assert_eq!(stdout(&first).trim(), "EMP0001");
    assert_eq!(stdout(&second).trim(), "EMP0002");
}

#[test]
fn duplicate_email_fails_without_consuming_a_number() {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), "Ada", "ada@example.com");
    let dup = add(dir.path(), "Ada Again", "ada@example.com");
    assert!(!dup.status.success());
    assert!(String::from_utf8_lossy(&dup.stderr).contains("already exists"));

    let next = add(dir.path(), "Bob", "bob@example.com");
    assert_eq!(stdout(&next).trim(), "EMP0002");
}

#[test]
fn employee_list_json_is_parseable() {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), "Ada", "ada@example.com");

    let output = run_roster(dir.path(), &["employee", "list", "--json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed[0]["employee_id"], "EMP0001");
    assert_eq!(parsed[0]["employment_date"], "2025-06-02");
}

#[test]
fn removed_employee_number_is_not_reissued() {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), "Ada", "ada@example.com");
    add(dir.path(), "Bob", "bob@example.com");

    let removed = run_roster(dir.path(), &["employee", "remove", "EMP0002"]);
    assert!(removed.status.success());
    let next = add(dir.path(), "Cy", "cy@example.com");
    assert_eq!(stdout(&next).trim(), "EMP0003");
}

#[test]
fn task_cap_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), "Ada", "ada@example.com");
    for n in 0..5 {
        let title = format!("task {n}");
        let ok = run_roster(
            dir.path(),
            &["task", "assign", "EMP0001", "--title", &title, "--deadline", "2025-06-09"],
        );
        assert!(ok.status.success());
    }
    let over = run_roster(
        dir.path(),
        &["task", "assign", "EMP0001", "--title", "one more", "--deadline", "2025-06-09"],
    );
    assert!(!over.status.success());
    assert!(String::from_utf8_lossy(&over.stderr).contains("5"));
}

#[test]
fn leave_flow_shows_who_is_away() {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), "Ada", "ada@example.com");
    let submit = run_roster(
        dir.path(),
        &[
            "leave", "submit", "EMP0001", "--from", "2025-06-01", "--to", "2025-06-03", "--reason",
            "rest", "--kind", "annual",
        ],
    );
    assert!(submit.status.success());
    assert!(run_roster(dir.path(), &["leave", "approve", "1"]).status.success());

    let today = run_roster(dir.path(), &["leave", "today"]);
    let text = stdout(&today);
    assert!(text.contains("On leave today (1)"));
    assert!(text.contains("Ada (EMP0001)"));

    let again = run_roster(dir.path(), &["leave", "reject", "1"]);
    assert!(!again.status.success());
}

#[test]
fn employee_search_narrows_the_list() {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), "Ada Lovelace", "ada@example.com");
    add(dir.path(), "Bob Noyce", "bob@example.com");

    let output = run_roster(dir.path(), &["employee", "list", "--search", "noyce", "--json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(1));
    assert_eq!(parsed[0]["employee_id"], "EMP0002");

    let none = run_roster(dir.path(), &["employee", "list", "--department", "legal"]);
    assert!(stdout(&none).contains("No matching employees."));
}

#[test]
fn task_edit_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), "Ada", "ada@example.com");
    run_roster(
        dir.path(),
        &["task", "assign", "EMP0001", "--title", "draft", "--deadline", "2025-06-09"],
    );

    let edit = run_roster(dir.path(), &["task", "edit", "1", "--title", "final", "--done"]);
    assert!(edit.status.success());
    assert!(stdout(&edit).contains("Updated task 1: final"));
    let empty = run_roster(dir.path(), &["task", "edit", "1"]);
    assert!(!empty.status.success());

    assert!(run_roster(dir.path(), &["task", "delete", "1"]).status.success());
    let list = run_roster(dir.path(), &["task", "list"]);
    assert!(stdout(&list).contains("No tasks."));
}

#[test]
fn attendance_day_is_listed_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), "Ada", "ada@example.com");

    let check_in =
        run_roster(dir.path(), &["attendance", "check-in", "EMP0001", "--at", "09:00:00"]);
    assert!(check_in.status.success());
    let early =
        run_roster(dir.path(), &["attendance", "check-out", "EMP0001", "--at", "08:00:00"]);
    assert!(!early.status.success());
    let check_out =
        run_roster(dir.path(), &["attendance", "check-out", "EMP0001", "--at", "17:30:00"]);
    assert!(stdout(&check_out).contains("checked out on 2025-06-02 at 17:30"));
    run_roster(
        dir.path(),
        &["attendance", "mark", "EMP0001", "--status", "absent", "--date", "2025-05-30"],
    );

    let output = run_roster(dir.path(), &["attendance", "list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed[0]["date"], "2025-06-02");
    assert_eq!(parsed[0]["check_in"], "09:00:00");
    assert_eq!(parsed[1]["status"], "absent");

    let table = run_roster(dir.path(), &["attendance", "list", "--date", "2025-06-02"]);
    let text = stdout(&table);
    assert!(text.contains("EMP0001"));
    assert!(text.contains("17:30"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_roster(dir.path(), &["nonsense"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}
