// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs the treeport binary against event logs written to temporary directories.

use camino_tempfile::Utf8TempDir;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::{
    io::Write,
    process::{Command, Output, Stdio},
};
use treeport::TreeportExitCode;

const NESTED_EVENTS: &str = indoc! {r#"
    {"event": "scope-starting", "qualified-name": "org.example.Outer"}
    {"event": "scope-starting", "qualified-name": "org.example.Outer$Inner"}
    {"event": "scope-completed", "class-summary": {"scope-name": "org.example.Outer$Inner", "elapsed": "250ms"}, "members": [{"scope-name": "org.example.Outer$Inner", "test-name": "fails", "status": "failure", "elapsed": "20ms", "stack-trace": "boom", "stdout": "captured\n"}]}
    {"event": "scope-completed", "class-summary": {"scope-name": "org.example.Outer", "elapsed": "1s"}, "members": [{"scope-name": "org.example.Outer", "test-name": "passes", "elapsed": "5ms"}]}
"#};

struct TreeportCli {
    command: Command,
}

impl TreeportCli {
    fn new() -> Self {
        let mut command = Command::new(env!("CARGO_BIN_EXE_treeport"));
        for var in [
            "TREEPORT_LOG",
            "TREEPORT_VERBOSE",
            "TREEPORT_COLOR",
            "TREEPORT_CONFIG_FILE",
            "TREEPORT_THEME",
        ] {
            command.env_remove(var);
        }
        command.args(["--color", "never"]);
        Self { command }
    }

    fn replay(mut self, args: &[&str]) -> Self {
        self.command.arg("replay").args(["--theme", "ascii"]).args(args);
        self
    }

    fn output(mut self) -> Output {
        self.command.output().expect("treeport ran")
    }

    fn output_with_stdin(mut self, input: &str) -> Output {
        let mut child = self
            .command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("treeport spawned");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("wrote events to stdin");
        child.wait_with_output().expect("treeport ran")
    }
}

fn write_events(dir: &Utf8TempDir, contents: &str) -> String {
    let path = dir.path().join("events.jsonl");
    std::fs::write(&path, contents).expect("wrote events");
    path.into_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("stderr is UTF-8")
}

#[test]
fn replay_nested_family() {
    let dir = Utf8TempDir::new().unwrap();
    let events = write_events(&dir, NESTED_EVENTS);

    let output = TreeportCli::new().replay(&[&events]).output();

    assert_eq!(
        output.status.code(),
        Some(TreeportExitCode::TEST_RUN_FAILED)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "captured\n");
    assert_eq!(
        stderr(&output),
        indoc! {"
            + org.example.Outer - 1.000s
            |  '- [OK] passes - 0.005s
            '- - Inner - 0.250s
                  '- [XX] fails - 0.020s
            >> fails

            Stack trace
            boom

            Standard out

            Standard error
                 Summary [   1.000s] 2 tests run: 1 passed, 1 failed, 0 errored, 0 skipped
        "}
    );
}

#[test]
fn replay_from_stdin_with_config_file() {
    let dir = Utf8TempDir::new().unwrap();
    let config = dir.path().join("treeport.toml");
    std::fs::write(
        &config,
        indoc! {r#"
            hide-successes = true

            [stack-trace]
            on-failure = false

            [stdout]
            on-failure = false

            [stderr]
            on-failure = false
        "#},
    )
    .unwrap();

    let output = TreeportCli::new()
        .replay(&["--config-file", config.as_str(), "-"])
        .output_with_stdin(NESTED_EVENTS);

    assert_eq!(
        output.status.code(),
        Some(TreeportExitCode::TEST_RUN_FAILED)
    );
    assert!(output.stdout.is_empty(), "captured output isn't replayed");
    assert_eq!(
        stderr(&output),
        indoc! {"
            + org.example.Outer - 1.000s
            '- - Inner - 0.250s
                  '- [XX] fails - 0.020s
                 Summary [   1.000s] 2 tests run: 1 passed, 1 failed, 0 errored, 0 skipped
        "}
    );
}

#[test]
fn incomplete_family_is_reported() {
    let dir = Utf8TempDir::new().unwrap();
    let events = write_events(
        &dir,
        indoc! {r#"
            {"event": "scope-starting", "qualified-name": "Plain"}
            {"event": "scope-completed", "class-summary": {"scope-name": "Plain", "elapsed": "10ms"}, "members": [{"scope-name": "Plain", "test-name": "works", "elapsed": "1ms"}]}
            {"event": "scope-starting", "qualified-name": "Dangling$Nested"}
        "#},
    );

    let output = TreeportCli::new().replay(&[&events]).output();

    assert_eq!(output.status.code(), Some(TreeportExitCode::INCOMPLETE_RUN));
    let stderr = stderr(&output);
    assert!(
        stderr.starts_with("- Plain - 0.010s\n   '- [OK] works - 0.001s\n"),
        "{stderr}"
    );
    assert!(
        stderr.contains("warning: family Dangling never completed"),
        "{stderr}"
    );
    assert!(
        stderr.contains("Incomplete family never completed: Dangling"),
        "{stderr}"
    );
}

#[test]
fn missing_events_file() {
    let dir = Utf8TempDir::new().unwrap();
    let missing = dir.path().join("missing.jsonl");

    let output = TreeportCli::new().replay(&[missing.as_str()]).output();

    assert_eq!(output.status.code(), Some(TreeportExitCode::SETUP_ERROR));
    let stderr = stderr(&output);
    assert!(
        stderr.starts_with(&format!("error: failed to read events from {missing}")),
        "{stderr}"
    );
    assert!(stderr.contains("Caused by:"), "{stderr}");
}

#[test]
fn malformed_event_reports_line_number() {
    let dir = Utf8TempDir::new().unwrap();
    let events = write_events(
        &dir,
        indoc! {r#"
            {"event": "scope-starting", "qualified-name": "Plain"}

            not json
        "#},
    );

    let output = TreeportCli::new().replay(&[&events]).output();

    assert_eq!(output.status.code(), Some(TreeportExitCode::SETUP_ERROR));
    let stderr = stderr(&output);
    assert!(
        stderr.contains(&format!("error: failed to parse event at {events}:3")),
        "{stderr}"
    );
}

#[test]
fn invalid_config_file() {
    let dir = Utf8TempDir::new().unwrap();
    let config = dir.path().join("treeport.toml");
    std::fs::write(&config, "theme = \"fancy\"\n").unwrap();
    let events = write_events(&dir, NESTED_EVENTS);

    let output = TreeportCli::new()
        .replay(&["--config-file", config.as_str(), &events])
        .output();

    assert_eq!(output.status.code(), Some(TreeportExitCode::SETUP_ERROR));
    assert!(
        stderr(&output).starts_with("error: failed to load reporter config"),
        "{}",
        stderr(&output)
    );
}
