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

use std::path::PathBuf;

/// Errors raised while setting up a [`ScopedLogger`](crate::ScopedLogger).
///
/// Setup is the only part of the logging path that can fail fatally; once a
/// logger is built, its write methods never return errors.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to prepare log directory: {0}")]
    Directory(#[source] anyhow::Error),
    #[error("failed to attach log file handler: {0}")]
    Handler(#[source] anyhow::Error),
}

/// Errors raised by [`ScopedLogger::move_directory`](crate::ScopedLogger::move_directory).
///
/// Partial moves are not rolled back; the error message names the path that
/// failed verification.
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("source log directory `{0}` is missing")]
    SourceMissing(PathBuf),
    #[error("destination directory `{0}` does not exist after the move")]
    DestinationMissing(PathBuf),
    #[error("source directory `{0}` still exists after the move")]
    SourceNotRemoved(PathBuf),
    #[error("failed to move log directory: {0}")]
    Move(#[source] anyhow::Error),
    #[error("failed to reattach log handlers after the move: {0}")]
    Reattach(#[source] SetupError),
}
