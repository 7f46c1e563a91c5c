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

//! The per-component logger facade.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use anyhow::Context;
use log::LevelFilter;

use crate::append;
use crate::append::FileAppender;
use crate::config::LogConfig;
use crate::error::MoveError;
use crate::error::SetupError;
use crate::path::ensure_absolute;
use crate::path::ensure_dir;
use crate::registry::HandlerRegistry;
use crate::severity::Severity;

/// A builder to configure and create a [`ScopedLogger`].
///
/// Defaults come from the process-wide [`LogConfig`]; every setting can be
/// overridden per logger:
///
/// ```
/// let logger = devlog::scoped("worker")
///     .only_print(true) // stderr only, no files
///     .build()
///     .unwrap();
/// logger.info("hello");
/// ```
#[must_use = "call `build` to create the logger"]
#[derive(Debug)]
pub struct ScopedLoggerBuilder {
    name: String,
    directory: PathBuf,
    separate_files: bool,
    shared_file_name: String,
    only_print: bool,
    announce_paths: bool,
}

impl ScopedLoggerBuilder {
    /// Creates a builder for a logger displaying `name`, with every other
    /// setting taken from [`LogConfig::global`].
    pub fn new(name: impl Into<String>) -> ScopedLoggerBuilder {
        let config = LogConfig::global();
        ScopedLoggerBuilder {
            name: name.into(),
            directory: config.file_path.clone(),
            separate_files: false,
            shared_file_name: config.file_name.clone(),
            only_print: config.only_print,
            announce_paths: false,
        }
    }

    /// Sets the log directory. Created on build if missing.
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Gives this logger its own `<name>.log` / `<name>_debug.log` file pair
    /// instead of the shared pair.
    pub fn separate_files(mut self, separate_files: bool) -> Self {
        self.separate_files = separate_files;
        self
    }

    /// Sets the base name of the shared file pair. Ignored in
    /// separate-files mode.
    pub fn shared_file_name(mut self, shared_file_name: impl Into<String>) -> Self {
        self.shared_file_name = shared_file_name.into();
        self
    }

    /// Disables file logging entirely; every record goes to stderr.
    pub fn only_print(mut self, only_print: bool) -> Self {
        self.only_print = only_print;
        self
    }

    /// Announces the resolved log file paths at info level on build, instead
    /// of a debug-only initialization record.
    pub fn announce_paths(mut self, announce_paths: bool) -> Self {
        self.announce_paths = announce_paths;
        self
    }

    /// Builds the logger, creating the log directory and attaching its file
    /// handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a log file
    /// cannot be opened. This is the only fatal path; once built, logging
    /// never fails to the caller.
    pub fn build(self) -> Result<ScopedLogger, SetupError> {
        let ScopedLoggerBuilder {
            name,
            directory,
            separate_files,
            shared_file_name,
            only_print,
            announce_paths,
        } = self;
        let logger = ScopedLogger {
            name,
            separate_files,
            shared_file_name,
            only_print,
            state: Mutex::new(ChannelState {
                directory,
                main: None,
                debug: None,
                main_path: None,
                debug_path: None,
            }),
        };
        if !logger.only_print {
            let mut state = logger.lock_state();
            logger.setup(&mut state)?;
        }
        let init = format!("`{}` logger initialized", logger.name);
        if announce_paths {
            logger.info_mirrored(&format!("{init}.\n{}", logger.log_paths_text()));
        } else {
            logger.debug(&init);
        }
        Ok(logger)
    }
}

/// A per-component logging facade writing through two channels: `main` for
/// info and above, `debug` for everything.
///
/// Each channel holds at most one attached [`FileAppender`], either an
/// individual one (files named after the logger) or one obtained from the
/// process-wide [`HandlerRegistry`] (files named after the shared file name,
/// reused across loggers). The display name tags every record, so a shared
/// file interleaves records from many loggers.
///
/// Write methods never return errors and never panic. A handler whose file
/// vanished triggers a full re-setup before the write; records that still
/// cannot reach a file are dropped to stderr with a `[CRITICAL]` annotation.
#[derive(Debug)]
pub struct ScopedLogger {
    name: String,
    separate_files: bool,
    shared_file_name: String,
    only_print: bool,
    state: Mutex<ChannelState>,
}

#[derive(Debug)]
struct ChannelState {
    directory: PathBuf,
    main: Option<Arc<FileAppender>>,
    debug: Option<Arc<FileAppender>>,
    main_path: Option<PathBuf>,
    debug_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Main,
    Debug,
}

impl Channel {
    fn label(self) -> &'static str {
        match self {
            Channel::Main => "main",
            Channel::Debug => "debug",
        }
    }
}

fn channel_for(severity: Severity) -> Channel {
    match severity {
        Severity::Debug => Channel::Debug,
        _ => Channel::Main,
    }
}

fn channel_valid(state: &ChannelState, channel: Channel) -> bool {
    let appender = match channel {
        Channel::Main => state.main.as_ref(),
        Channel::Debug => state.debug.as_ref(),
    };
    appender.is_some_and(|appender| appender.is_valid())
}

impl ScopedLogger {
    /// Creates a builder for a logger displaying `name`.
    pub fn builder(name: impl Into<String>) -> ScopedLoggerBuilder {
        ScopedLoggerBuilder::new(name)
    }

    /// The display name tagging this logger's records.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved log directory.
    pub fn directory(&self) -> PathBuf {
        self.lock_state().directory.clone()
    }

    /// Writes a debug record. Debug records go to the debug channel only.
    pub fn debug(&self, message: &str) {
        self.write(Severity::Debug, message, false);
    }

    /// Writes an info record to the main channel.
    pub fn info(&self, message: &str) {
        self.write(Severity::Info, message, false);
    }

    /// Writes an info record, mirrored to the debug channel as
    /// `[INFO] message`.
    pub fn info_mirrored(&self, message: &str) {
        self.write(Severity::Info, message, true);
    }

    /// Writes a warning record to the main channel.
    pub fn warn(&self, message: &str) {
        self.write(Severity::Warn, message, false);
    }

    /// Writes a warning record, mirrored to the debug channel as
    /// `[WARN] message`.
    pub fn warn_mirrored(&self, message: &str) {
        self.write(Severity::Warn, message, true);
    }

    /// Writes an error record to the main channel.
    pub fn error(&self, message: &str) {
        self.write(Severity::Error, message, false);
    }

    /// Writes an error record, mirrored to the debug channel as
    /// `[ERROR] message`.
    pub fn error_mirrored(&self, message: &str) {
        self.write(Severity::Error, message, true);
    }

    /// Writes a critical record to the main channel. Filters like an error;
    /// the record is tagged `[CRITICAL]`.
    pub fn critical(&self, message: &str) {
        self.write(Severity::Critical, message, false);
    }

    /// Writes a critical record, mirrored to the debug channel as
    /// `[CRITICAL] message`.
    pub fn critical_mirrored(&self, message: &str) {
        self.write(Severity::Critical, message, true);
    }

    /// A human-readable listing of the resolved log file paths, one line per
    /// channel. The directory itself is not listed.
    pub fn log_paths_text(&self) -> String {
        let state = self.lock_state();
        let display = |path: &Option<PathBuf>| match path {
            Some(path) => path.display().to_string(),
            None => "<none>".to_string(),
        };
        format!(
            "main: {}\ndebug: {}",
            display(&state.main_path),
            display(&state.debug_path)
        )
    }

    /// Re-runs the full handler setup.
    ///
    /// Setup is idempotent: a repeated run replaces the attached handlers
    /// instead of stacking new ones, so no record is ever written twice.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a log file
    /// cannot be opened.
    pub fn refresh(&self) -> Result<(), SetupError> {
        if self.only_print {
            return Ok(());
        }
        let mut state = self.lock_state();
        self.setup(&mut state)
    }

    /// Physically moves the whole log directory under `destination` and
    /// reattaches the file handlers against the new location, so subsequent
    /// writes land in the moved files.
    ///
    /// The directory keeps its own name: moving `/tmp/a/logs` under `/srv`
    /// leaves it at `/srv/logs`. Not safe to run concurrently with other
    /// writers of the same directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the source directory is missing, the move fails,
    /// or the post-move double-check finds the destination absent or the
    /// source still present. Partial moves are not rolled back.
    pub fn move_directory(&self, destination: impl AsRef<Path>) -> Result<(), MoveError> {
        let destination = ensure_absolute(destination.as_ref()).map_err(MoveError::Move)?;
        {
            let mut state = self.lock_state();
            let source = state.directory.clone();
            if !source.exists() {
                return Err(MoveError::SourceMissing(source));
            }
            let dir_name = source
                .file_name()
                .map(|name| name.to_os_string())
                .ok_or_else(|| {
                    MoveError::Move(anyhow::anyhow!("log directory has no final component"))
                })?;
            ensure_dir(&destination).map_err(MoveError::Move)?;
            let target = destination.join(dir_name);
            move_tree(&source, &target).map_err(MoveError::Move)?;

            // Defensive double-check after the move.
            if !target.exists() {
                return Err(MoveError::DestinationMissing(target));
            }
            if source.exists() {
                return Err(MoveError::SourceNotRemoved(source));
            }

            state.directory = target;
            if !self.only_print {
                self.setup(&mut state).map_err(MoveError::Reattach)?;
            }
        }
        self.info_mirrored(&format!("log directory moved.\n{}", self.log_paths_text()));
        Ok(())
    }

    /// Attaches fresh handlers to both channels, replacing whatever was
    /// attached before.
    ///
    /// Resolves the directory to an absolute path and creates it if missing.
    /// In separate-files mode each channel gets a brand-new individual
    /// handler; otherwise handlers come from the process-wide registry and
    /// may already serve other loggers.
    fn setup(&self, state: &mut ChannelState) -> Result<(), SetupError> {
        let directory = ensure_absolute(&state.directory).map_err(SetupError::Directory)?;
        ensure_dir(&directory).map_err(SetupError::Directory)?;
        state.directory = directory.clone();

        // Detach before attach so a repeated setup never leaves two handlers
        // feeding the same channel.
        state.main = None;
        state.debug = None;

        let base = if self.separate_files {
            self.name.as_str()
        } else {
            self.shared_file_name.as_str()
        };
        let main_path = directory.join(format!("{base}.log"));
        let debug_path = directory.join(format!("{base}_debug.log"));

        let (main, debug) = if self.separate_files {
            let main = Arc::new(
                FileAppender::create(&main_path, LevelFilter::Info).map_err(SetupError::Handler)?,
            );
            let debug = Arc::new(
                FileAppender::create(&debug_path, LevelFilter::Debug)
                    .map_err(SetupError::Handler)?,
            );
            (main, debug)
        } else {
            let registry = HandlerRegistry::global();
            let main = registry
                .get_or_create(&main_path, LevelFilter::Info)
                .map_err(SetupError::Handler)?;
            let debug = registry
                .get_or_create(&debug_path, LevelFilter::Debug)
                .map_err(SetupError::Handler)?;
            (main, debug)
        };
        state.main = Some(main);
        state.debug = Some(debug);
        state.main_path = Some(main_path);
        state.debug_path = Some(debug_path);
        Ok(())
    }

    // A poisoned lock still guards coherent channel state; logging methods
    // must not panic over it.
    fn lock_state(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, severity: Severity, message: &str, mirror: bool) {
        if self.only_print {
            append::write_fallback(severity, message);
            return;
        }
        if !self.ensure_channel(severity, message) {
            return;
        }
        {
            let state = self.lock_state();
            let appender = match channel_for(severity) {
                Channel::Main => state.main.as_ref(),
                Channel::Debug => state.debug.as_ref(),
            };
            if let Some(appender) = appender {
                if let Err(err) = appender.append(&self.name, severity, message) {
                    append::report_write_error(&self.name, message, &err);
                }
            }
        }
        if mirror && severity != Severity::Debug {
            self.debug(&format!("[{severity}] {message}"));
        }
    }

    /// Validates the channel `severity` writes to, re-running the full setup
    /// when its file handler went stale. Returns `false` when the record had
    /// to be dropped to stderr.
    fn ensure_channel(&self, severity: Severity, message: &str) -> bool {
        let channel = channel_for(severity);
        {
            let state = self.lock_state();
            if channel_valid(&state, channel) {
                return true;
            }
        }
        eprintln!(
            "WARNING: {} channel of logger `{}` has no active file handler; re-running setup",
            channel.label(),
            self.name
        );
        let outcome = {
            let mut state = self.lock_state();
            self.setup(&mut state)
        };
        match outcome {
            Ok(()) => {
                self.warn_mirrored(&format!("re-setup of `{}` log handlers complete", self.name));
            }
            Err(err) => eprintln!("ERROR: re-setup of logger `{}` failed: {err}", self.name),
        }
        {
            let state = self.lock_state();
            if channel_valid(&state, Channel::Main) && channel_valid(&state, Channel::Debug) {
                return true;
            }
        }
        eprintln!(
            "[CRITICAL] failed to restore file handlers for logger `{}`; routing record to stderr",
            self.name
        );
        append::write_fallback(severity, message);
        false
    }
}

/// Moves a directory tree, falling back to copy-and-remove when a plain
/// rename is not possible (e.g. across filesystems).
fn move_tree(source: &Path, target: &Path) -> anyhow::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_tree(source, target)?;
            fs::remove_dir_all(source)
                .with_context(|| format!("failed to remove `{}`", source.display()))?;
            Ok(())
        }
    }
}

fn copy_tree(source: &Path, target: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(target)
        .with_context(|| format!("failed to create `{}`", target.display()))?;
    let entries = fs::read_dir(source)
        .with_context(|| format!("failed to read `{}`", source.display()))?;
    for entry in entries {
        let entry = entry?;
        let to = target.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &to)?;
        } else {
            fs::copy(entry.path(), &to)
                .with_context(|| format!("failed to copy `{}`", entry.path().display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::panic::AssertUnwindSafe;

    use super::*;

    #[test]
    fn test_logging_survives_poisoned_state_lock() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ScopedLogger::builder("sturdy")
            .directory(dir.path())
            .separate_files(true)
            .build()
            .unwrap();

        let _ = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = logger.state.lock().unwrap();
            panic!("poison the logger lock");
        }));

        // write methods recover the poisoned guard instead of panicking
        logger.info("after poisoning");
        let main = fs::read_to_string(dir.path().join("sturdy.log")).unwrap();
        assert!(main.contains("[INFO] after poisoning"));
    }
}
