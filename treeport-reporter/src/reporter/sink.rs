// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destinations for rendered output.

use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

/// A destination for rendered lines and replayed captured output.
///
/// Each rendered line is passed to [`write_line`](Self::write_line) in a single call, without a
/// trailing newline. Implementations must write each line atomically with respect to other
/// threads, so that lines from different families never interleave mid-line.
pub trait ReportSink: Send + Sync {
    /// Writes a single rendered line.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Replays bytes captured from a test's standard output.
    fn replay_stdout(&self, bytes: &[u8]) -> io::Result<()>;

    /// Replays bytes captured from a test's standard error.
    fn replay_stderr(&self, bytes: &[u8]) -> io::Result<()>;
}

/// Writes rendered lines to standard error, and replays captured output to the process's own
/// standard output and standard error.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalSink;

impl ReportSink for TerminalSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{line}")
    }

    fn replay_stdout(&self, bytes: &[u8]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()
    }

    fn replay_stderr(&self, bytes: &[u8]) -> io::Result<()> {
        io::stderr().lock().write_all(bytes)
    }
}

/// An in-memory sink, for tests and for embedding the reporter.
#[derive(Debug, Default)]
pub struct BufferSink {
    inner: Mutex<SinkBuffer>,
}

/// The contents of a [`BufferSink`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SinkBuffer {
    /// Rendered lines, in the order they were written.
    pub lines: Vec<String>,

    /// Replayed standard output.
    pub stdout: Vec<u8>,

    /// Replayed standard error.
    pub stderr: Vec<u8>,
}

impl BufferSink {
    /// Creates an empty buffer sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    pub fn snapshot(&self) -> SinkBuffer {
        self.lock().clone()
    }

    /// Returns the rendered lines joined by newlines, with a trailing newline after each line.
    pub fn output(&self) -> String {
        let buffer = self.lock();
        let mut out = String::new();
        for line in &buffer.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Takes everything written so far, leaving the sink empty.
    pub fn take(&self) -> SinkBuffer {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportSink for BufferSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lock().lines.push(line.to_owned());
        Ok(())
    }

    fn replay_stdout(&self, bytes: &[u8]) -> io::Result<()> {
        self.lock().stdout.extend_from_slice(bytes);
        Ok(())
    }

    fn replay_stderr(&self, bytes: &[u8]) -> io::Result<()> {
        self.lock().stderr.extend_from_slice(bytes);
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &S {
    fn write_line(&self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn replay_stdout(&self, bytes: &[u8]) -> io::Result<()> {
        (**self).replay_stdout(bytes)
    }

    fn replay_stderr(&self, bytes: &[u8]) -> io::Result<()> {
        (**self).replay_stderr(bytes)
    }
}
