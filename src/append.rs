// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! File handlers that write formatted log records.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use anyhow::Context;
use colored::Color;
use colored::Colorize;
use log::LevelFilter;

use crate::layout::TextLayout;
use crate::severity::Severity;

/// A handler that appends formatted log records to a single file.
///
/// A `FileAppender` may be owned by one logger (individual mode) or shared by
/// many through the [`HandlerRegistry`](crate::registry::HandlerRegistry).
/// Writes are serialized by an internal lock, so `&self` methods are safe to
/// call from any thread.
#[derive(Debug)]
pub struct FileAppender {
    path: PathBuf,
    layout: TextLayout,
    state: Mutex<AppenderState>,
}

#[derive(Debug)]
struct AppenderState {
    file: File,
    threshold: LevelFilter,
}

impl FileAppender {
    /// Opens `path` in append mode, creating the file if missing.
    ///
    /// The parent directory must already exist; logger setup creates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened.
    pub fn create(path: impl Into<PathBuf>, threshold: LevelFilter) -> anyhow::Result<FileAppender> {
        let path = path.into();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("failed to open log file `{}`", path.display()))?;
        Ok(FileAppender {
            path,
            layout: TextLayout,
            state: Mutex::new(AppenderState { file, threshold }),
        })
    }

    /// The file this handler writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file still exists on disk.
    ///
    /// A deleted file leaves the open handle writing into the void; callers
    /// treat an invalid handler as a trigger for re-setup.
    pub fn is_valid(&self) -> bool {
        self.path.exists()
    }

    /// The current severity threshold.
    pub fn threshold(&self) -> LevelFilter {
        self.lock_state().threshold
    }

    /// Makes the threshold at least as verbose as `threshold`. Never makes it
    /// stricter; several loggers may share this handler at different levels.
    pub fn lower_threshold(&self, threshold: LevelFilter) {
        let mut state = self.lock_state();
        if threshold > state.threshold {
            state.threshold = threshold;
        }
    }

    /// Appends one record, formatted for `severity` and tagged with `scope`.
    ///
    /// Records below the threshold are dropped silently. The write itself is
    /// not guarded here: the I/O error is returned so callers can route it
    /// through `report_write_error` without crashing the process.
    pub fn append(&self, scope: &str, severity: Severity, message: &str) -> anyhow::Result<()> {
        let mut state = self.lock_state();
        if severity.level() > state.threshold {
            return Ok(());
        }
        let mut line = self.layout.format(scope, severity, message);
        line.push('\n');
        state
            .file
            .write_all(line.as_bytes())
            .with_context(|| format!("failed to write log record to `{}`", self.path.display()))?;
        Ok(())
    }

    // A poisoned lock still guards coherent state; the write path must not
    // panic over it.
    fn lock_state(&self) -> MutexGuard<'_, AppenderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writes a record straight to stderr as `[SEVERITY] message`.
///
/// This is the output path for print-only loggers and the drop target for
/// records that could not reach a file.
pub(crate) fn write_fallback(severity: Severity, message: &str) {
    let color = match severity {
        Severity::Debug => Color::Blue,
        Severity::Info => Color::Green,
        Severity::Warn => Color::Yellow,
        Severity::Error | Severity::Critical => Color::Red,
    };
    let tag = severity.name().color(color);
    eprintln!("[{tag}] {message}");
}

/// Reports a failed write to stderr.
///
/// Every handler routes write failures through this one routine. The
/// reporting path is itself guarded: if stderr cannot be written, a
/// last-resort line is attempted and nothing propagates further.
pub(crate) fn report_write_error(scope: &str, message: &str, error: &anyhow::Error) {
    let mut stderr = std::io::stderr().lock();
    let outcome = writeln!(stderr, "Error processing log record for `{scope}`: {message}")
        .and_then(|_| writeln!(stderr, "Logging system internal error: {error:#}"));
    if outcome.is_err() {
        let _ = writeln!(stderr, "Error in the log error handler itself!");
    }
}
