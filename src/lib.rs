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

//! Devlog is a small developer toolbox: a per-component logging facade that
//! writes to shared or individual log files, plus wall-clock timing helpers.
//!
//! # Overview
//!
//! Each component of an application builds a [`ScopedLogger`] carrying a
//! display name. A logger writes through two channels: `main` holds records
//! at info level and above, `debug` holds everything, each in its own file.
//! By default all loggers in a process share one file pair; a logger can opt
//! into its own dedicated pair instead. File handlers for shared files are
//! deduplicated process-wide, so any number of loggers pointing at the same
//! path write through one open handle.
//!
//! A logger whose file disappears from under it re-runs its own setup; when
//! even that cannot restore a handler, the record goes to stderr instead of
//! being lost. Write methods never return errors and never panic.
//!
//! # Examples
//!
//! Stderr-only logging, no files:
//!
//! ```
//! let logger = devlog::scoped("worker").only_print(true).build().unwrap();
//!
//! logger.info("starting up");
//! logger.warn_mirrored("queue is filling"); // also lands in the debug channel
//! ```
//!
//! A dedicated file pair under a chosen directory:
//!
//! ```no_run
//! let logger = devlog::scoped("ingest")
//!     .directory("/var/log/myapp")
//!     .separate_files(true)
//!     .build()
//!     .unwrap();
//!
//! logger.debug("opened connection");
//! logger.error("ingest failed");
//! ```
//!
//! Timing a computation:
//!
//! ```
//! let t = devlog::start_timer();
//! let answer = devlog::measure_execution_time(|| 6 * 7);
//! let secs = devlog::stop_timer_elapsed(t);
//! assert!(secs >= 0.0);
//! # let _ = answer;
//! ```

pub mod append;
pub mod config;
pub mod registry;
pub mod scoped;
pub mod timing;

mod error;
mod layout;
mod path;
mod severity;

pub use config::LogConfig;
pub use error::MoveError;
pub use error::SetupError;
pub use registry::HandlerRegistry;
pub use scoped::ScopedLogger;
pub use scoped::ScopedLoggerBuilder;
pub use severity::Severity;
pub use timing::measure_execution_time;
pub use timing::start_timer;
pub use timing::stop_timer;
pub use timing::stop_timer_elapsed;
pub use timing::try_measure_execution_time;

/// Create a new [`ScopedLoggerBuilder`] for a logger displaying `name`.
///
/// This is a convenient API that you can use as:
///
/// ```
/// let logger = devlog::scoped("worker").only_print(true).build().unwrap();
/// logger.info("hello");
/// ```
pub fn scoped(name: impl Into<String>) -> ScopedLoggerBuilder {
    ScopedLoggerBuilder::new(name)
}
