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

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;

/// Resolves `path` to an absolute path against the current directory.
///
/// The resolution is lexical; the path does not need to exist yet.
pub(crate) fn ensure_absolute(path: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::path::absolute(path)
        .with_context(|| format!("failed to resolve path `{}`", path.display()))
}

/// Creates `dir` and any missing parents. A directory that already exists is
/// not an error.
pub(crate) fn ensure_dir(dir: impl AsRef<Path>) -> anyhow::Result<()> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory `{}`", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_absolute_resolves_relative() {
        let resolved = ensure_absolute("logs/today").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("logs/today"));
    }

    #[test]
    fn test_ensure_absolute_keeps_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = ensure_absolute(dir.path()).unwrap();
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn test_ensure_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // already existing is fine
        ensure_dir(&nested).unwrap();
    }
}
