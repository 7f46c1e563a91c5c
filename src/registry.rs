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

//! Process-wide registry of shared file handlers.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::Mutex;
use std::sync::PoisonError;

use log::LevelFilter;

use crate::append::FileAppender;

static GLOBAL: LazyLock<HandlerRegistry> = LazyLock::new(HandlerRegistry::new);

/// Maps each resolved log file path to its single shared [`FileAppender`].
///
/// Shared-mode loggers pointing at the same file must write through the same
/// open handle; the registry guarantees at most one handler per distinct
/// path. The lookup, staleness check, create-if-absent, and threshold
/// adjustment all happen under one lock so concurrent loggers cannot race to
/// create duplicate handlers.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: Mutex<HashMap<PathBuf, Arc<FileAppender>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry. Tests use private registries; production
    /// code goes through [`HandlerRegistry::global`].
    pub fn new() -> HandlerRegistry {
        HandlerRegistry {
            handlers: Mutex::new(HashMap::new()),
        }
    }

    /// The registry shared by every logger in the process. Created once on
    /// first use, never reset.
    pub fn global() -> &'static HandlerRegistry {
        &GLOBAL
    }

    /// Returns the handler for `path`, creating one if absent or stale.
    ///
    /// An existing entry whose backing file disappeared is evicted and
    /// replaced; dropping the stale entry closes the old handle once the
    /// last attached logger lets go of it. An existing live entry has its
    /// threshold made at least as verbose as `threshold`, since several
    /// loggers may request different levels for the same file.
    ///
    /// # Errors
    ///
    /// Returns an error if a fresh log file cannot be opened.
    pub fn get_or_create(
        &self,
        path: impl AsRef<Path>,
        threshold: LevelFilter,
    ) -> anyhow::Result<Arc<FileAppender>> {
        let path = path.as_ref();
        // a poisoned lock still guards a coherent map; recover instead of
        // panicking out of a logging call
        let mut handlers = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = handlers.get(path) {
            if existing.is_valid() {
                existing.lower_threshold(threshold);
                return Ok(Arc::clone(existing));
            }
            handlers.remove(path);
        }
        let appender = Arc::new(FileAppender::create(path, threshold)?);
        handlers.insert(path.to_path_buf(), Arc::clone(&appender));
        Ok(appender)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::severity::Severity;

    use super::*;

    #[test]
    fn test_same_path_shares_one_handler() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.log");
        let registry = HandlerRegistry::new();

        let first = registry.get_or_create(&path, LevelFilter::Info).unwrap();
        let second = registry.get_or_create(&path, LevelFilter::Info).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_threshold_is_lowered_for_verbose_requests() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.log");
        let registry = HandlerRegistry::new();

        let handler = registry.get_or_create(&path, LevelFilter::Info).unwrap();
        assert_eq!(handler.threshold(), LevelFilter::Info);

        registry.get_or_create(&path, LevelFilter::Debug).unwrap();
        assert_eq!(handler.threshold(), LevelFilter::Debug);

        // a stricter request never tightens an existing handler
        registry.get_or_create(&path, LevelFilter::Error).unwrap();
        assert_eq!(handler.threshold(), LevelFilter::Debug);
    }

    #[test]
    fn test_stale_entry_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.log");
        let registry = HandlerRegistry::new();

        let first = registry.get_or_create(&path, LevelFilter::Info).unwrap();
        fs::remove_file(&path).unwrap();

        let second = registry.get_or_create(&path, LevelFilter::Info).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        // the fresh handler writes without raising
        second.append("scope", Severity::Info, "recovered").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("recovered"));
    }
}
