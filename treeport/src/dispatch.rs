// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, TreeportExitCode,
    errors::Result,
    output::{OutputContext, OutputOpts, StderrStyles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use smol_str::SmolStr;
use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, Write},
};
use tracing::debug;
use treeport_reporter::{
    config::{ConfigLocation, ReporterOptions},
    errors::WriteEventError,
    reporter::{
        Emission, FamilyStats, ReportEvent, ReportSink, TerminalSink, Theme, TreeReporter,
        TreeReporterBuilder,
    },
};

/// Prints the results of nested test runs as a tree.
#[derive(Debug, Parser)]
#[command(version, about, styles = crate::output::clap_styles::style())]
pub struct TreeportApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl TreeportApp {
    /// Initializes logging and colorization.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code.
    pub fn exec(self, output: OutputContext) -> Result<i32> {
        match self.command {
            Command::Replay(opts) => opts.exec(output),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a log of scope events and print each family as it completes
    Replay(ReplayOpts),
}

#[derive(Debug, Args)]
struct ReplayOpts {
    /// Event log to replay, one JSON event per line, or `-` for standard input
    #[arg(value_name = "EVENTS")]
    events: Utf8PathBuf,

    /// Reporter config file [default: built-in defaults]
    #[arg(long, value_name = "PATH", env = "TREEPORT_CONFIG_FILE")]
    config_file: Option<Utf8PathBuf>,

    /// Glyphs used to draw the tree: auto, unicode, ascii
    #[arg(long, value_name = "THEME", env = "TREEPORT_THEME")]
    theme: Option<Theme>,

    /// Hide the lines of tests that passed
    #[arg(long)]
    hide_successes: bool,
}

impl ReplayOpts {
    fn exec(self, output: OutputContext) -> Result<i32> {
        let location = match &self.config_file {
            Some(path) => ConfigLocation::Explicit(path),
            None => ConfigLocation::Isolated,
        };
        let options = ReporterOptions::load(location)?;

        let mut builder = TreeReporterBuilder::new(options);
        builder.set_colorize(output.color.should_colorize(supports_color::Stream::Stderr));
        if let Some(theme) = self.theme {
            builder.set_theme(theme);
        }
        if self.hide_successes {
            builder.set_hide_successes(true);
        }
        let reporter = builder.build(TerminalSink);

        debug!("replaying events from {}", self.events);
        let summary = if self.events.as_str() == "-" {
            replay_events(&reporter, &self.events, io::stdin().lock())?
        } else {
            let file = File::open(&self.events).map_err(|err| ExpectedError::EventsReadError {
                path: self.events.clone(),
                err,
            })?;
            replay_events(&reporter, &self.events, BufReader::new(file))?
        };

        let styles = output.stderr_styles();
        let mut stderr = io::stderr().lock();
        if let Err(error) = writeln!(stderr, "{}", summary.display(&styles)) {
            return Err(WriteEventError::Io(error).into());
        }

        if summary.ignored > 0 {
            debug!(
                "{} events with malformed scope names were ignored",
                summary.ignored
            );
        }
        Ok(summary.exit_code())
    }
}

/// The outcome of replaying an event log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[doc(hidden)]
pub struct ReplaySummary {
    /// Statistics accumulated over every printed family.
    pub stats: FamilyStats,

    /// The number of families printed.
    pub families: usize,

    /// The number of events ignored because of malformed scope names.
    pub ignored: usize,

    /// Families that were still waiting for nested scopes when the log ended.
    pub incomplete: Vec<SmolStr>,
}

impl ReplaySummary {
    /// Returns the process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.stats.has_failures() {
            TreeportExitCode::TEST_RUN_FAILED
        } else if !self.incomplete.is_empty() {
            TreeportExitCode::INCOMPLETE_RUN
        } else {
            TreeportExitCode::OK
        }
    }

    fn display<'a>(&'a self, styles: &'a StderrStyles) -> DisplayReplaySummary<'a> {
        DisplayReplaySummary {
            summary: self,
            styles,
        }
    }
}

struct DisplayReplaySummary<'a> {
    summary: &'a ReplaySummary,
    styles: &'a StderrStyles,
}

impl fmt::Display for DisplayReplaySummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.summary.stats;
        let styles = self.styles;
        let summary_style = if stats.has_failures() {
            styles.fail
        } else {
            styles.pass
        };
        write!(
            f,
            "{:>12} [{:>8.3}s] {} {} run: {} passed, {} failed, {} errored, {} skipped",
            "Summary".style(summary_style),
            stats.elapsed.as_secs_f64(),
            stats.tests.style(styles.bold),
            if stats.tests == 1 { "test" } else { "tests" },
            stats.passed.style(styles.pass),
            stats.failed.style(styles.fail),
            stats.errored.style(styles.fail),
            stats.skipped.style(styles.skip),
        )?;

        let incomplete = &self.summary.incomplete;
        if !incomplete.is_empty() {
            write!(
                f,
                "\n{:>12} {} never completed: {}",
                "Incomplete".style(styles.skip),
                if incomplete.len() == 1 {
                    "family"
                } else {
                    "families"
                },
                incomplete.join(", "),
            )?;
        }
        Ok(())
    }
}

/// Replays every event in `input` through `reporter`, then finishes the reporter.
///
/// `path` is used for error reporting.
#[doc(hidden)]
pub fn replay_events<S: ReportSink>(
    reporter: &TreeReporter<S>,
    path: &Utf8Path,
    input: impl BufRead,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for (index, line) in input.lines().enumerate() {
        let line = line.map_err(|err| ExpectedError::EventsReadError {
            path: path.to_owned(),
            err,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let event: ReportEvent =
            serde_json::from_str(&line).map_err(|err| ExpectedError::EventParseError {
                path: path.to_owned(),
                line_number: index + 1,
                err,
            })?;
        match reporter.write_event(event)? {
            Emission::Rendered { stats, .. } => {
                summary.families += 1;
                summary.stats.merge(&stats);
            }
            Emission::Buffered { .. } => {}
            Emission::Ignored => summary.ignored += 1,
        }
    }

    summary.incomplete = reporter.finish();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use treeport_reporter::reporter::BufferSink;

    const EVENTS: &str = indoc! {r#"
        {"event": "scope-starting", "qualified-name": "Outer$Inner"}
        {"event": "scope-starting", "qualified-name": "Outer"}
        {"event": "scope-completed", "class-summary": {"scope-name": "Outer", "elapsed": "1s"}, "members": [{"scope-name": "Outer", "test-name": "a", "elapsed": "100ms"}]}

        {"event": "scope-starting", "qualified-name": "Plain"}
        {"event": "scope-completed", "class-summary": {"scope-name": "Plain", "elapsed": "300ms"}, "members": [{"scope-name": "Plain", "test-name": "skips", "status": "skipped", "message": "disabled"}]}
        {"event": "scope-completed", "class-summary": {"scope-name": "Outer$Inner", "elapsed": "500ms"}, "members": [{"scope-name": "Outer$Inner", "test-name": "b", "status": "failure", "elapsed": "200ms"}]}
        {"event": "scope-starting", "qualified-name": "Dangling$Nested"}
    "#};

    fn ascii_reporter() -> TreeReporter<BufferSink> {
        let mut builder = TreeReporterBuilder::new(ReporterOptions::default());
        builder.set_theme(Theme::Ascii);
        builder.build(BufferSink::new())
    }

    #[test]
    fn replay_prints_families_in_completion_order() {
        let reporter = ascii_reporter();
        let path = Utf8Path::new("events.jsonl");
        let summary = replay_events(&reporter, path, EVENTS.as_bytes()).unwrap();

        assert_eq!(
            reporter.sink().output(),
            indoc! {"
                - Plain - 0.300s
                   '- [--] skips (disabled) - 0.000s
                + Outer - 1.000s
                |  '- [OK] a - 0.100s
                '- - Inner - 0.500s
                      '- [XX] b - 0.200s
                >> b

                Stack trace
                [No stack trace available]

                Standard out

                Standard error
            "}
        );
        assert_eq!(summary.families, 2);
        assert_eq!(summary.stats.tests, 3);
        assert_eq!(summary.stats.failed, 1);
        assert_eq!(summary.stats.skipped, 1);
        assert_eq!(summary.stats.elapsed, Duration::from_millis(1300));
        assert_eq!(summary.incomplete, ["Dangling"]);
        assert_eq!(summary.exit_code(), TreeportExitCode::TEST_RUN_FAILED);
    }

    #[test]
    fn replay_reports_parse_errors_with_line_numbers() {
        let input = indoc! {r#"
            {"event": "scope-starting", "qualified-name": "Plain"}
            {"event": "scope-finished"}
        "#};
        let reporter = ascii_reporter();
        let path = Utf8Path::new("bad.jsonl");
        let error = replay_events(&reporter, path, input.as_bytes())
            .expect_err("unknown event is an error");
        assert!(
            matches!(
                &error,
                ExpectedError::EventParseError { path, line_number: 2, .. } if path == "bad.jsonl"
            ),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.process_exit_code(), TreeportExitCode::SETUP_ERROR);
    }

    #[test]
    fn malformed_scope_names_are_counted() {
        let input = indoc! {r#"
            {"event": "scope-starting", "qualified-name": "Outer$$Inner"}
            {"event": "scope-completed", "class-summary": {"scope-name": ""}}
        "#};
        let reporter = ascii_reporter();
        let path = Utf8Path::new("events.jsonl");
        let summary = replay_events(&reporter, path, input.as_bytes()).unwrap();
        assert_eq!(summary.ignored, 2);
        assert_eq!(summary.families, 0);
        assert_eq!(summary.exit_code(), TreeportExitCode::OK);
    }

    #[test]
    fn summary_display() {
        let summary = ReplaySummary {
            stats: FamilyStats {
                scopes: 2,
                tests: 4,
                passed: 2,
                failed: 1,
                errored: 0,
                skipped: 1,
                elapsed: Duration::from_millis(1250),
            },
            families: 1,
            ignored: 0,
            incomplete: vec!["Alpha".into(), "Beta".into()],
        };
        assert_eq!(
            summary.display(&StderrStyles::default()).to_string(),
            "     Summary [   1.250s] 4 tests run: 2 passed, 1 failed, 0 errored, 1 skipped\n  \
             Incomplete families never completed: Alpha, Beta"
        );
    }

    #[test]
    fn exit_code_for_incomplete_run() {
        let summary = ReplaySummary {
            incomplete: vec!["Alpha".into()],
            ..ReplaySummary::default()
        };
        assert_eq!(summary.exit_code(), TreeportExitCode::INCOMPLETE_RUN);
    }

    #[test]
    fn parse_cli() {
        let app = TreeportApp::try_parse_from([
            "treeport",
            "--color",
            "never",
            "replay",
            "--theme",
            "ascii",
            "--hide-successes",
            "events.jsonl",
        ])
        .expect("valid arguments");
        let Command::Replay(opts) = app.command;
        assert_eq!(opts.events, "events.jsonl");
        assert_eq!(opts.theme, Some(Theme::Ascii));
        assert!(opts.hide_successes);

        let error = TreeportApp::try_parse_from(["treeport", "replay", "--theme", "fancy", "x"])
            .expect_err("unknown theme is rejected");
        assert!(error.to_string().contains("fancy"), "{error}");
    }
}
