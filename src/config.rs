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

//! Process-wide logging defaults sourced from the environment.

use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

use jiff::Zoned;

static GLOBAL: LazyLock<LogConfig> = LazyLock::new(LogConfig::from_env);

/// Default settings applied to every [`ScopedLoggerBuilder`](crate::ScopedLoggerBuilder)
/// unless overridden per logger.
///
/// Three environment variables are consulted:
///
/// * `LOG_ONLY_PRINT`: any non-empty value disables file logging entirely;
///   all output goes to stderr. An empty string counts as unset.
/// * `LOG_FILE_PATH`: the base log directory. Defaults to
///   `./logs/<YYYYMMDD_HHMMSS>`, with the timestamp captured once when the
///   configuration is constructed rather than per logger.
/// * `LOG_FILE_NAME`: the base name for shared-mode log files. Defaults to
///   `combined_log`.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Disable file logging; route every record to stderr.
    pub only_print: bool,
    /// Base directory for log files.
    pub file_path: PathBuf,
    /// Base name for shared-mode log files.
    pub file_name: String,
}

impl LogConfig {
    /// Reads the configuration from the environment.
    pub fn from_env() -> LogConfig {
        let only_print = only_print_from(env::var("LOG_ONLY_PRINT").ok().as_deref());
        let file_path = env::var("LOG_FILE_PATH").map(PathBuf::from).unwrap_or_else(|_| {
            let stamp = Zoned::now().strftime("%Y%m%d_%H%M%S").to_string();
            PathBuf::from("./logs").join(stamp)
        });
        let file_name =
            env::var("LOG_FILE_NAME").unwrap_or_else(|_| "combined_log".to_string());
        LogConfig {
            only_print,
            file_path,
            file_name,
        }
    }

    /// The configuration shared by the whole process, constructed from the
    /// environment on first use and never refreshed.
    pub fn global() -> &'static LogConfig {
        &GLOBAL
    }
}

// Presence-based: setting the variable to anything non-empty enables
// print-only mode. The value itself is not interpreted.
fn only_print_from(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_print_is_presence_based() {
        // any non-empty value enables print-only mode, "0" and "false" included
        for value in ["1", "true", "0", "false", "enable", " "] {
            assert!(
                only_print_from(Some(value)),
                "{value:?} should enable print-only mode"
            );
        }
        assert!(!only_print_from(Some("")));
        assert!(!only_print_from(None));
    }

    #[test]
    fn test_default_directory_shape() {
        // The default directory carries a `YYYYMMDD_HHMMSS` leaf.
        let config = LogConfig::from_env();
        if env::var("LOG_FILE_PATH").is_err() {
            let leaf = config.file_path.file_name().unwrap().to_string_lossy();
            assert_eq!(leaf.len(), 15);
            assert_eq!(leaf.as_bytes()[8], b'_');
        }
    }
}
