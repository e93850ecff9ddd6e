// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders completed families as indented trees.
//!
//! The main structure in this module is [`TreeDisplayer`].

use super::{formatters::DisplayElapsed, theme::ThemeCharacters};
use crate::{
    config::ReporterOptions,
    errors::{DisplayErrorChain, WriteEventError},
    reporter::{
        events::{ReportEntry, ReportStatus},
        helpers::Styles,
        sink::ReportSink,
    },
    tree::{Node, Tree},
};
use owo_colors::OwoColorize;
use smol_str::SmolStr;
use swrite::{SWrite, swrite};
use tracing::warn;

pub(crate) struct TreeDisplayer {
    options: ReporterOptions,
    theme_characters: ThemeCharacters,
    styles: Styles,
}

impl TreeDisplayer {
    pub(crate) fn new(options: ReporterOptions, should_colorize: bool) -> Self {
        let mut styles = Styles::default();
        if should_colorize {
            styles.colorize();
        }
        let theme_characters = ThemeCharacters::for_theme(options.theme);
        Self {
            options,
            theme_characters,
            styles,
        }
    }

    /// Renders every top-level family in `tree`.
    pub(crate) fn render(
        &self,
        tree: &Tree,
        sink: &dyn ReportSink,
    ) -> Result<(), WriteEventError> {
        for family in tree.root().children() {
            if self.options.blank_line_between_prints {
                write_line(sink, "")?;
            }
            let mut path = vec![SmolStr::new(family.name())];
            FamilyWriter {
                displayer: self,
                tree,
                sink,
            }
            .write_node(family, &mut path)?;
        }
        Ok(())
    }
}

/// Writes out a single family. `path` always holds the segments from the root to the node being
/// written.
struct FamilyWriter<'a> {
    displayer: &'a TreeDisplayer,
    tree: &'a Tree,
    sink: &'a dyn ReportSink,
}

impl FamilyWriter<'_> {
    fn write_node(&self, node: &Node, path: &mut Vec<SmolStr>) -> Result<(), WriteEventError> {
        self.write_class_line(node, path)?;

        let entries = node.entries();
        for (index, entry) in entries.iter().enumerate() {
            let is_last_entry = index + 1 == entries.len();
            self.write_test_line(node, path, entry, is_last_entry)?;
            self.write_details(entry)?;
        }

        for child in node.children() {
            path.push(SmolStr::new(child.name()));
            self.write_node(child, path)?;
            path.pop();
        }
        Ok(())
    }

    fn write_class_line(&self, node: &Node, path: &[SmolStr]) -> Result<(), WriteEventError> {
        let theme = &self.displayer.theme_characters;
        let styles = &self.displayer.styles;

        let mut line = String::new();
        let depth = node.depth();
        if depth > 2 {
            line.push_str(if self.is_on_last_branch(path) {
                theme.blank
            } else {
                theme.vertical
            });
            for _ in 0..depth - 3 {
                line.push_str(theme.blank);
            }
            line.push_str(theme.corner);
        } else if depth == 2 {
            line.push_str(if self.is_on_last_branch(path) {
                theme.corner
            } else {
                theme.tee
            });
        }
        line.push_str(if node.has_children() {
            theme.branch_down
        } else {
            theme.leaf
        });

        match node.class_summary() {
            Some(summary) => {
                let name = self.class_name(summary, path);
                swrite!(
                    line,
                    "{} - {}",
                    name.style(styles.name),
                    DisplayElapsed(summary.elapsed)
                );
            }
            None => {
                // Intermediate scope that never reported a summary of its own.
                swrite!(line, "{}", node.name().style(styles.name));
            }
        }
        write_line(self.sink, &line)
    }

    /// Returns the name of a scope with its parent scope's name stripped from the front.
    fn class_name<'s>(&self, summary: &'s ReportEntry, path: &[SmolStr]) -> &'s str {
        let name = summary.scope_report_name();
        let parent_path = &path[..path.len() - 1];
        let parent_summary = self.tree.lookup(parent_path).and_then(Node::class_summary);
        let Some(parent_summary) = parent_summary else {
            return name;
        };
        let parent_name = parent_summary.scope_report_name();
        name.strip_prefix(parent_name)
            .and_then(|rest| {
                let mut chars = rest.chars();
                // Skip the delimiter between the parent's name and this scope's.
                chars.next()?;
                Some(chars.as_str())
            })
            .filter(|rest| !rest.is_empty())
            .unwrap_or(name)
    }

    fn write_test_line(
        &self,
        node: &Node,
        path: &[SmolStr],
        entry: &ReportEntry,
        is_last_entry: bool,
    ) -> Result<(), WriteEventError> {
        if entry.status == ReportStatus::Success && self.displayer.options.hide_successes {
            return Ok(());
        }

        let theme = &self.displayer.theme_characters;
        let styles = &self.displayer.styles;

        let mut line = String::new();
        line.push_str(if self.is_on_last_branch(path) {
            theme.blank
        } else {
            theme.vertical
        });
        let depth = node.depth();
        if depth > 1 {
            for _ in 0..depth - 2 {
                line.push_str(theme.blank);
            }
            let parent_has_children = self
                .tree
                .lookup(&path[..path.len() - 1])
                .is_some_and(Node::has_children);
            line.push_str(if parent_has_children && node.has_children() {
                theme.vertical
            } else {
                theme.blank
            });
        }
        line.push_str(if is_last_entry {
            theme.corner
        } else {
            theme.tee
        });

        let name = entry.abbreviated_name();
        match entry.status {
            ReportStatus::Success => {
                let status = format!("{}{name}", theme.success);
                swrite!(line, "{}", status.style(styles.pass));
            }
            ReportStatus::Failure | ReportStatus::Error => {
                let status = format!("{}{name}", theme.failure);
                swrite!(line, "{}", status.style(styles.fail));
            }
            ReportStatus::Skipped => {
                let mut status = format!("{}{name}", theme.skipped);
                if let Some(message) = entry.non_blank_message() {
                    swrite!(status, " ({message})");
                }
                swrite!(line, "{}", status.style(styles.skip));
            }
        }
        swrite!(line, " - {}", DisplayElapsed(entry.elapsed));
        write_line(self.sink, &line)
    }

    fn write_details(&self, entry: &ReportEntry) -> Result<(), WriteEventError> {
        let options = &self.displayer.options;
        let show_stack_trace = options.stack_trace.shows(entry.status);
        let show_stdout = options.stdout.shows(entry.status);
        let show_stderr = options.stderr.shows(entry.status);
        if !(show_stack_trace || show_stdout || show_stderr) {
            return Ok(());
        }

        let theme = &self.displayer.theme_characters;
        let styles = &self.displayer.styles;
        let style = if entry.status == ReportStatus::Success {
            styles.pass
        } else {
            styles.fail
        };
        let header = format!("{}{}", theme.details, entry.abbreviated_name());
        write_line(self.sink, &header.style(style).to_string())?;

        if show_stack_trace {
            self.write_label("Stack trace")?;
            write_line(
                self.sink,
                entry
                    .non_blank_stack_trace()
                    .unwrap_or("[No stack trace available]"),
            )?;
        }
        if show_stdout {
            self.write_label("Standard out")?;
            if let Err(error) = self.sink.replay_stdout(&entry.stdout) {
                warn!(
                    "failed to replay standard output of {}: {}",
                    entry.report_name(),
                    DisplayErrorChain::new(&error),
                );
            }
        }
        if show_stderr {
            self.write_label("Standard error")?;
            if let Err(error) = self.sink.replay_stderr(&entry.stderr) {
                warn!(
                    "failed to replay standard error of {}: {}",
                    entry.report_name(),
                    DisplayErrorChain::new(&error),
                );
            }
        }
        Ok(())
    }

    fn write_label(&self, label: &str) -> Result<(), WriteEventError> {
        write_line(self.sink, "")?;
        write_line(
            self.sink,
            &label.style(self.displayer.styles.label).to_string(),
        )
    }

    /// Returns true if the node at `path` is on the last branch of its family: either it is the
    /// last child of the family's top-level node, or it is nested within that child.
    ///
    /// Also true for every node of a family whose top-level node has no children.
    fn is_on_last_branch(&self, path: &[SmolStr]) -> bool {
        let Some(last) = self.tree.lookup(&path[..1]).and_then(Node::last_child) else {
            return true;
        };
        (path.len() == 2 && path[1].as_str() == last.name())
            || self.tree.ancestor_named(path, last.name()).is_some()
    }
}

fn write_line(sink: &dyn ReportSink, line: &str) -> Result<(), WriteEventError> {
    sink.write_line(line).map_err(WriteEventError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{CapturedOutputOptions, StackTraceOptions},
        names::ScopePath,
        reporter::{BufferSink, Theme},
    };
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::{io, time::Duration};

    const NO_OUTPUT: CapturedOutputOptions = CapturedOutputOptions {
        on_success: false,
        on_error: false,
        on_failure: false,
    };

    fn options(theme: Theme) -> ReporterOptions {
        ReporterOptions {
            theme,
            stack_trace: StackTraceOptions {
                on_error: false,
                on_failure: false,
            },
            stdout: NO_OUTPUT,
            stderr: NO_OUTPUT,
            ..ReporterOptions::default()
        }
    }

    fn scope(name: &str, millis: u64) -> ReportEntry {
        ReportEntry::scope(name, Duration::from_millis(millis))
    }

    fn test(scope: &str, name: &str, status: ReportStatus, millis: u64) -> ReportEntry {
        ReportEntry::test(scope, name, status, Duration::from_millis(millis))
    }

    fn build_tree(summaries: Vec<ReportEntry>, members: Vec<ReportEntry>) -> Tree {
        let mut tree = Tree::new();
        for summary in summaries {
            let path = ScopePath::parse(&summary.scope_name).expect("valid scope name");
            tree.insert(&path).set_class_summary(summary);
        }
        for member in members {
            let path = ScopePath::parse(&member.scope_name).expect("valid scope name");
            tree.insert(&path).push_entry(member);
        }
        tree
    }

    fn render(options: ReporterOptions, tree: &Tree) -> String {
        let sink = BufferSink::new();
        TreeDisplayer::new(options, false)
            .render(tree, &sink)
            .expect("buffer sink doesn't fail");
        sink.output()
    }

    fn plain_tree() -> Tree {
        build_tree(
            vec![scope("Plain", 300)],
            vec![
                test("Plain", "one", ReportStatus::Success, 100),
                test("Plain", "two", ReportStatus::Success, 100),
                test("Plain", "three", ReportStatus::Failure, 100),
            ],
        )
    }

    fn nested_tree() -> Tree {
        build_tree(
            vec![scope("Outer$Inner", 500), scope("Outer", 1000)],
            vec![
                test("Outer$Inner", "b", ReportStatus::Success, 100),
                test("Outer$Inner", "c", ReportStatus::Failure, 200),
                test("Outer", "a", ReportStatus::Success, 100),
            ],
        )
    }

    #[test]
    fn plain_class_ascii() {
        assert_eq!(
            render(options(Theme::Ascii), &plain_tree()),
            indoc! {"
                - Plain - 0.300s
                   +- [OK] one - 0.100s
                   +- [OK] two - 0.100s
                   '- [XX] three - 0.100s
            "}
        );
    }

    #[test]
    fn nested_class_ascii() {
        assert_eq!(
            render(options(Theme::Ascii), &nested_tree()),
            indoc! {"
                + Outer - 1.000s
                |  '- [OK] a - 0.100s
                '- - Inner - 0.500s
                      +- [OK] b - 0.100s
                      '- [XX] c - 0.200s
            "}
        );
    }

    #[test]
    fn nested_class_unicode() {
        assert_eq!(
            render(options(Theme::Unicode), &nested_tree()),
            indoc! {"
                ┬ Outer - 1.000s
                │  └─ ✔ a - 0.100s
                └─ ─ Inner - 0.500s
                      ├─ ✔ b - 0.100s
                      └─ ✘ c - 0.200s
            "}
        );
    }

    #[test]
    fn deeply_nested_branches() {
        let tree = build_tree(
            vec![
                scope("Outer$First", 100),
                scope("Outer$Second$Deep", 200),
                scope("Outer$Second", 300),
                scope("Outer", 1000),
            ],
            vec![
                test("Outer$First", "f1", ReportStatus::Success, 10),
                test("Outer$Second$Deep", "d1", ReportStatus::Success, 10),
                test("Outer$Second$Deep", "d2", ReportStatus::Error, 20),
            ],
        );
        assert_eq!(
            render(options(Theme::Ascii), &tree),
            indoc! {"
                + Outer - 1.000s
                +- - First - 0.100s
                |     '- [OK] f1 - 0.010s
                '- + Second - 0.300s
                   '- - Deep - 0.200s
                         +- [OK] d1 - 0.010s
                         '- [XX] d2 - 0.020s
            "}
        );
    }

    #[test]
    fn inner_branch_with_nested_children() {
        let tree = build_tree(
            vec![
                scope("Outer$A$X", 200),
                scope("Outer$A", 500),
                scope("Outer$B", 100),
                scope("Outer", 1000),
            ],
            vec![
                test("Outer", "a", ReportStatus::Success, 10),
                test("Outer$A", "a1", ReportStatus::Success, 20),
                test("Outer$A$X", "x1", ReportStatus::Success, 30),
                test("Outer$B", "b1", ReportStatus::Success, 40),
            ],
        );
        assert_eq!(
            render(options(Theme::Ascii), &tree),
            indoc! {"
                + Outer - 1.000s
                |  '- [OK] a - 0.010s
                +- + A - 0.500s
                |  |  '- [OK] a1 - 0.020s
                |  '- - X - 0.200s
                |        '- [OK] x1 - 0.030s
                '- - B - 0.100s
                      '- [OK] b1 - 0.040s
            "}
        );
    }

    #[test]
    fn scope_without_summary_shows_segment() {
        let tree = build_tree(
            vec![scope("Outer$Inner", 100)],
            vec![test("Outer$Inner", "a", ReportStatus::Success, 10)],
        );
        assert_eq!(
            render(options(Theme::Ascii), &tree),
            indoc! {"
                + Outer
                '- - Outer$Inner - 0.100s
                      '- [OK] a - 0.010s
            "}
        );
    }

    #[test]
    fn hidden_successes_still_count_as_entries() {
        let tree = build_tree(
            vec![scope("Plain", 200)],
            vec![
                test("Plain", "fails", ReportStatus::Failure, 100),
                test("Plain", "passes", ReportStatus::Success, 100),
            ],
        );
        let options = ReporterOptions {
            hide_successes: true,
            ..options(Theme::Ascii)
        };
        assert_eq!(
            render(options, &tree),
            indoc! {"
                - Plain - 0.200s
                   +- [XX] fails - 0.100s
            "}
        );
    }

    #[test]
    fn hidden_success_still_prints_details() {
        let tree = build_tree(
            vec![scope("Plain", 100)],
            vec![
                test("Plain", "passes", ReportStatus::Success, 100).with_stdout("hello\n"),
            ],
        );
        let options = ReporterOptions {
            hide_successes: true,
            stdout: CapturedOutputOptions {
                on_success: true,
                ..NO_OUTPUT
            },
            ..options(Theme::Ascii)
        };

        let sink = BufferSink::new();
        TreeDisplayer::new(options, false)
            .render(&tree, &sink)
            .unwrap();
        assert_eq!(
            sink.output(),
            indoc! {"
                - Plain - 0.100s
                >> passes

                Standard out
            "}
        );
        assert_eq!(sink.snapshot().stdout, b"hello\n");
    }

    #[test]
    fn skipped_with_message() {
        let tree = build_tree(
            vec![scope("Plain", 0)],
            vec![
                test("Plain", "later", ReportStatus::Skipped, 0).with_message("not ready"),
                test("Plain", "blank", ReportStatus::Skipped, 0).with_message(" "),
            ],
        );
        assert_eq!(
            render(options(Theme::Ascii), &tree),
            indoc! {"
                - Plain - 0.000s
                   +- [--] later (not ready) - 0.000s
                   '- [--] blank - 0.000s
            "}
        );
    }

    #[test]
    fn test_names_are_abbreviated() {
        let tree = build_tree(
            vec![scope("Plain", 0)],
            vec![
                test("Plain", "org.example.shouldWork", ReportStatus::Success, 0),
                test("Plain", "x", ReportStatus::Success, 0).with_test_display_name("works fine"),
            ],
        );
        assert_eq!(
            render(options(Theme::Ascii), &tree),
            indoc! {"
                - Plain - 0.000s
                   +- [OK] o.e.shouldWork - 0.000s
                   '- [OK] works fine - 0.000s
            "}
        );
    }

    #[test]
    fn failure_details_with_default_options() {
        let tree = build_tree(
            vec![scope("Plain", 100)],
            vec![
                test("Plain", "boom", ReportStatus::Failure, 100)
                    .with_stdout("captured out\n")
                    .with_stderr("captured err\n"),
                test("Plain", "trace", ReportStatus::Error, 0)
                    .with_stack_trace("java.lang.IllegalStateException: nope"),
            ],
        );
        let options = ReporterOptions {
            theme: Theme::Ascii,
            stdout: CapturedOutputOptions {
                on_error: false,
                ..CapturedOutputOptions::ON_ERROR_OR_FAILURE
            },
            stderr: NO_OUTPUT,
            ..ReporterOptions::default()
        };

        let sink = BufferSink::new();
        TreeDisplayer::new(options, false)
            .render(&tree, &sink)
            .unwrap();
        assert_eq!(
            sink.output(),
            indoc! {"
                - Plain - 0.100s
                   +- [XX] boom - 0.100s
                >> boom

                Stack trace
                [No stack trace available]

                Standard out
                   '- [XX] trace - 0.000s
                >> trace

                Stack trace
                java.lang.IllegalStateException: nope
            "}
        );
        let buffer = sink.snapshot();
        assert_eq!(buffer.stdout, b"captured out\n");
        assert!(buffer.stderr.is_empty(), "stderr is not replayed");
    }

    #[test]
    fn blank_line_between_prints() {
        let options = ReporterOptions {
            blank_line_between_prints: true,
            ..options(Theme::Ascii)
        };
        let output = render(options, &plain_tree());
        assert!(output.starts_with("\n- Plain - 0.300s\n"), "{output:?}");
    }

    #[test]
    fn colorized_output_is_styled() {
        let sink = BufferSink::new();
        TreeDisplayer::new(options(Theme::Ascii), true)
            .render(&plain_tree(), &sink)
            .unwrap();
        let lines = sink.snapshot().lines;
        assert!(
            lines[0].contains("\u{1b}["),
            "class name is bold: {:?}",
            lines[0]
        );
        assert!(lines[3].contains("[XX] three"), "{:?}", lines[3]);
    }

    /// A sink whose stdout replay always fails.
    #[derive(Default)]
    struct BrokenStdoutSink {
        inner: BufferSink,
    }

    impl ReportSink for BrokenStdoutSink {
        fn write_line(&self, line: &str) -> io::Result<()> {
            self.inner.write_line(line)
        }

        fn replay_stdout(&self, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn replay_stderr(&self, bytes: &[u8]) -> io::Result<()> {
            self.inner.replay_stderr(bytes)
        }
    }

    #[test]
    fn replay_failure_skips_only_that_block() {
        let tree = build_tree(
            vec![scope("Plain", 0)],
            vec![
                test("Plain", "boom", ReportStatus::Failure, 0)
                    .with_stack_trace("trace")
                    .with_stdout("lost")
                    .with_stderr("kept"),
            ],
        );
        let options = ReporterOptions {
            theme: Theme::Ascii,
            ..ReporterOptions::default()
        };

        let sink = BrokenStdoutSink::default();
        TreeDisplayer::new(options, false)
            .render(&tree, &sink)
            .expect("replay failures are not fatal");
        assert_eq!(
            sink.inner.output(),
            indoc! {"
                - Plain - 0.000s
                   '- [XX] boom - 0.000s
                >> boom

                Stack trace
                trace

                Standard out

                Standard error
            "}
        );
        assert_eq!(sink.inner.snapshot().stderr, b"kept");
    }

    /// A sink that fails every write.
    struct BrokenSink;

    impl ReportSink for BrokenSink {
        fn write_line(&self, _line: &str) -> io::Result<()> {
            Err(io::Error::other("closed"))
        }

        fn replay_stdout(&self, _bytes: &[u8]) -> io::Result<()> {
            Ok(())
        }

        fn replay_stderr(&self, _bytes: &[u8]) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn line_write_failure_is_propagated() {
        let error = TreeDisplayer::new(options(Theme::Ascii), false)
            .render(&plain_tree(), &BrokenSink)
            .expect_err("write failure is an error");
        assert!(matches!(error, WriteEventError::Io(_)));
    }
}
