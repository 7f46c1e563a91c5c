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

use jiff::Zoned;

use crate::severity::Severity;

/// Formats log records as text lines.
///
/// Output format:
///
/// ```text
/// 2024-08-11 22:44:57 - worker | [INFO] job finished
/// 2024-08-11 22:44:57 - worker | picked format by severity
/// ```
///
/// Debug records carry no severity tag; every other severity is spelled out
/// between brackets. The scope is passed per record so one shared file
/// handler can serve many loggers.
#[derive(Default, Debug, Clone)]
pub(crate) struct TextLayout;

impl TextLayout {
    pub(crate) fn format(&self, scope: &str, severity: Severity, message: &str) -> String {
        let time = Zoned::now().strftime("%Y-%m-%d %H:%M:%S");
        match severity {
            Severity::Debug => format!("{time} - {scope} | {message}"),
            _ => format!("{time} - {scope} | [{severity}] {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_record_has_no_tag() {
        let line = TextLayout.format("worker", Severity::Debug, "poll tick");
        assert!(line.ends_with(" - worker | poll tick"));
        assert!(!line.contains('['));
    }

    #[test]
    fn test_tagged_record_spells_severity() {
        let line = TextLayout.format("worker", Severity::Warn, "queue is slow");
        assert!(line.ends_with(" - worker | [WARN] queue is slow"));

        let line = TextLayout.format("worker", Severity::Critical, "giving up");
        assert!(line.contains("| [CRITICAL] giving up"));
    }

    #[test]
    fn test_timestamp_is_second_granularity() {
        let line = TextLayout.format("s", Severity::Info, "m");
        let (stamp, _) = line.split_once(" - ").unwrap();
        // `YYYY-MM-DD HH:MM:SS`
        assert_eq!(stamp.len(), 19);
    }
}
