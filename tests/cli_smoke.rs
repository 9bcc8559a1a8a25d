use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::tempdir;

#[derive(Debug, serde::Deserialize)]
struct EvalResult {
    case_name: String,
    n: usize,
    decisions_made: u64,
    best_case: u64,
    worst_case: u64,
    within_bounds: bool,
    ordered_correctly: bool,
    ranks_contiguous: bool,
}

fn run_cli_eval(case: &str) -> EvalResult {
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("eval.jsonl");

    let status = Command::new(env!("CARGO_BIN_EXE_mob-sort"))
        .args(["eval", "--case", case])
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());

    let raw = std::fs::read_to_string(&out_path).unwrap();
    let first_line = raw.lines().next().unwrap();
    serde_json::from_str(first_line).unwrap()
}

#[test]
fn cli_eval_shuffled_case_is_correct_and_bounded() {
    let result = run_cli_eval("shuffled_50");
    assert_eq!(result.case_name, "shuffled_50");
    assert_eq!(result.n, 50);
    assert!(result.ordered_correctly);
    assert!(result.ranks_contiguous);
    assert!(result.within_bounds);
    assert!(result.decisions_made >= result.best_case);
    assert!(result.decisions_made <= result.worst_case);
}

#[test]
fn cli_eval_rejects_unknown_case() {
    let dir = tempdir().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_mob-sort"))
        .args(["eval", "--case", "no_such_case"])
        .arg("--out")
        .arg(dir.path().join("eval.jsonl"))
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_estimate_prints_bounds() {
    let output = Command::new(env!("CARGO_BIN_EXE_mob-sort"))
        .args(["estimate", "--n", "4"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("estimated decisions (n ln n): 5.55"));
    assert!(stdout.contains("worst case: 5"));
}

#[test]
fn cli_sort_reads_choices_from_stdin() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("movies.csv");
    let output = dir.path().join("ranked.csv");
    let trace = dir.path().join("trace.jsonl");
    std::fs::write(
        &input,
        "Movie Title,Release Year\nHalf-Blood Prince,2009\nSorcerer's Stone,2001\nDeathly Hallows,2010\n",
    )
    .unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_mob-sort"))
        .arg("sort")
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(&output)
        .arg("--trace")
        .arg(&trace)
        .args(["--rank-column", "Mob Rank"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Accept the preview, then two decisions for three records split
    // [first] + [second, third]: an unparseable line is asked again, then the
    // left card wins twice.
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"\nmaybe\n1\n1\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains(
        "Loaded 3 records.\nFirst record:\n  Movie Title: Half-Blood Prince\n      Release Year: 2009\n"
    ));
    assert!(stdout.contains("Decision 1 of ~3"));
    assert!(stdout.contains("Mob Rank  Movie Title        Release Year"));
    assert!(stdout.contains("1         Half-Blood Prince  2009"));
    assert!(stdout.contains("Please answer 1 or 2."));

    let raw = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Mob Rank,Movie Title,Release Year",
            "1,Half-Blood Prince,2009",
            "2,Sorcerer's Stone,2001",
            "3,Deathly Hallows,2010",
        ]
    );

    let trace_raw = std::fs::read_to_string(&trace).unwrap();
    assert_eq!(trace_raw.lines().count(), 2);
}

#[test]
fn cli_sort_fails_when_input_runs_out() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("list.json");
    let output = dir.path().join("ranked.json");
    std::fs::write(&input, r#"[{"name": "a"}, {"name": "b"}]"#).unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_mob-sort"))
        .arg("sort")
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(&output)
        .arg("--yes")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(!output.exists());
}
