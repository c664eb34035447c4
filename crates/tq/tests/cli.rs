//! End-to-end tests of the `tq` binary.
//!
//! Every test points `TQ_CONFIG` into its own temporary directory, so the
//! user's real configuration is never read or written.

use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

const COLUMNS_CONFIG: &str = r#"
version = 1

[[columns]]
id = "age"
type = "numeric"

[[columns]]
id = "city"
"#;

// ==================== Test Helpers ====================

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn with_config(content: &str) -> Self {
        let env = Self::new();
        fs::write(env.config_path(), content).unwrap();
        env
    }

    fn config_path(&self) -> std::path::PathBuf {
        self.dir.path().join("config.toml")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tq"));
        cmd.env("TQ_CONFIG", self.config_path())
            .env_remove("TQ_LOG")
            .arg("--no-color");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().unwrap()
    }

    fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = self
            .command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(stdin.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ==================== check ====================

#[test]
fn test_check_valid_query() {
    let env = Env::new();
    let output = env.run(&["check", "{a} = 1 AND {b} IEQ x"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Status:     valid"));
    assert!(text.contains("Canonical:  {a} = 1 && {b} ieq x"));
}

#[test]
fn test_check_invalid_query_exits_with_one() {
    let env = Env::new();
    let output = env.run(&["check", "({a} = 1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Status:     invalid"));
    assert!(stderr(&output).starts_with("Error: invalid query:"));
}

#[test]
fn test_check_json_reports_lex_context() {
    let env = Env::new();
    let output = env.run(&["--json", "check", "{x} ~~ 1"]);
    assert_eq!(output.status.code(), Some(1));

    let report = stdout_json(&output);
    assert_eq!(report["valid"], false);
    assert_eq!(report["context"], "~~ 1");

    let error: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(error["error"]["code"], "QUERY_ERROR");
    assert_eq!(error["error"]["context"], "~~ 1");
}

#[test]
fn test_check_column_fragment() {
    let env = Env::new();
    let output = env.run(&["--json", "check", "2020-03", "--column", "when:datetime"]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output)["canonical"],
        "{when} datestartswith 2020-03"
    );
}

#[test]
fn test_check_multi_rejects_repeated_column() {
    let env = Env::new();
    let output = env.run(&["check", "--multi", "and", "{a} = 1 && {a} = 2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("'a'"));
}

// ==================== filter ====================

#[test]
fn test_filter_ndjson_from_stdin() {
    let env = Env::new();
    let records = "{\"age\": 20}\n{\"age\": 40}\n\n{\"age\": \"55\"}\n";
    let output = env.run_with_stdin(&["filter", "{age} > 30"], records);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "{\"age\":40}\n{\"age\":\"55\"}\n");
}

#[test]
fn test_filter_json_array_file_count() {
    let env = Env::new();
    let path = env.dir.path().join("records.json");
    fs::write(
        &path,
        r#"[{"name": "Ann"}, {"name": "bob"}, {"name": "anna"}, {"name": null}]"#,
    )
    .unwrap();

    let output = env.run(&[
        "--json",
        "filter",
        "{name} icontains ann",
        "--input",
        path.to_str().unwrap(),
        "--count",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let counts = stdout_json(&output);
    assert_eq!(counts["matched"], 2);
    assert_eq!(counts["total"], 4);
}

#[test]
fn test_filter_bad_input_exits_with_three() {
    let env = Env::new();
    let output = env.run_with_stdin(&["filter", "{a} = 1"], "{\"a\": 1}\nnot json\n");
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("line 2"));
}

// ==================== split / join ====================

#[test]
fn test_split_with_configured_columns() {
    let env = Env::with_config(COLUMNS_CONFIG);
    let output = env.run(&["split", "{age} > 30 && {city} contains par"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("age    > 30"));
    assert!(text.contains("city   contains par"));
}

#[test]
fn test_split_json_omits_redundant_equals() {
    let env = Env::with_config(COLUMNS_CONFIG);
    let output = env.run(&["--json", "split", "{age} = 5 && {city} = Paris"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({
            "operator": "and",
            "columns": {"age": "5", "city": "= Paris"}
        })
    );
}

#[test]
fn test_split_unknown_column_suggests() {
    let env = Env::with_config(COLUMNS_CONFIG);
    let output = env.run(&["split", "{cty} = x"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Did you mean 'city'?"));
}

#[test]
fn test_split_without_columns_is_config_error() {
    let env = Env::new();
    let output = env.run(&["split", "{a} = 1"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_join_round_trip() {
    let env = Env::with_config(COLUMNS_CONFIG);
    let output = env.run(&["join", "age=> 30", "city=par"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "{age} > 30 && {city} contains par\n");

    let output = env.run(&["join", "--operator", "or", "-c", "x:numeric", "x=7"]);
    assert_eq!(stdout(&output), "{x} = 7\n");
}

#[test]
fn test_join_reports_skipped_fragments() {
    let env = Env::new();
    let output = env.run(&["--json", "join", "a=1", "b=is odd is even"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let joined = stdout_json(&output);
    assert_eq!(joined["query"], "{a} contains 1");
    assert_eq!(joined["skipped"][0]["column"], "b");
}

// ==================== config / completions ====================

#[test]
fn test_config_init_show_and_path() {
    let env = Env::new();

    let output = env.run(&["config", "path"]);
    assert_eq!(
        stdout(&output).trim(),
        env.config_path().display().to_string()
    );

    let output = env.run(&["config", "init"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(env.config_path().exists());

    let output = env.run(&["--json", "config", "show"]);
    let shown = stdout_json(&output);
    assert_eq!(shown["exists"], true);
    assert_eq!(shown["config"]["version"], 1);

    let output = env.run(&["config", "init"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(env.run(&["config", "init", "--force"]).status.success());
}

#[test]
fn test_broken_config_is_reported() {
    let env = Env::with_config("operator = \"xor\"\n");
    let output = env.run(&["check", "{a} = 1"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("configuration error"));
}

#[test]
fn test_completions() {
    let env = Env::new();
    let output = env.run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("tq"));
}
