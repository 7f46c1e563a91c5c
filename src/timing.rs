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

//! Stateless wall-clock timing helpers, independent of the logging facade.

use std::io;
use std::io::Write;
use std::time::Instant;

/// Runs `f` and prints its wall-clock execution time with microsecond
/// precision.
///
/// ```
/// let answer = devlog::measure_execution_time(|| 6 * 7);
/// assert_eq!(answer, 42);
/// ```
pub fn measure_execution_time<T>(f: impl FnOnce() -> T) -> T {
    measure_into(&mut io::stdout(), f)
}

/// Runs a fallible `f`, printing its wall-clock execution time even when it
/// fails.
///
/// On failure the timing line is labeled `before error` and the original
/// error value passes through unchanged.
///
/// ```
/// let outcome: Result<(), String> =
///     devlog::try_measure_execution_time(|| Err("boom".to_string()));
/// assert_eq!(outcome.unwrap_err(), "boom");
/// ```
pub fn try_measure_execution_time<T, E>(f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    try_measure_into(&mut io::stdout(), f)
}

/// Records a high-resolution start timestamp for [`stop_timer`] or
/// [`stop_timer_elapsed`].
pub fn start_timer() -> Instant {
    Instant::now()
}

/// Prints the elapsed time since `start` as `Elapsed time: X.XXXXXX seconds`.
pub fn stop_timer(start: Instant) {
    stop_timer_into(&mut io::stdout(), start);
}

/// Returns the elapsed seconds since `start` without printing anything.
pub fn stop_timer_elapsed(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}

fn measure_into<T>(out: &mut impl Write, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed().as_secs_f64();
    let _ = writeln!(out, "Execution time: {elapsed:.6} seconds");
    result
}

fn try_measure_into<T, E>(
    out: &mut impl Write,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed().as_secs_f64();
    match &result {
        Ok(_) => {
            let _ = writeln!(out, "Execution time: {elapsed:.6} seconds");
        }
        Err(_) => {
            let _ = writeln!(out, "Execution time before error: {elapsed:.6} seconds");
        }
    }
    result
}

fn stop_timer_into(out: &mut impl Write, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    let _ = writeln!(out, "Elapsed time: {elapsed:.6} seconds");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_measure_returns_result_and_prints_one_line() {
        let mut out = Vec::new();
        assert_eq!(measure_into(&mut out, || "done"), "done");

        let text = captured(out);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Execution time: "));
        assert!(text.trim_end().ends_with(" seconds"));
    }

    #[test]
    fn test_try_measure_failure_prints_one_before_error_line() {
        let mut out = Vec::new();
        let outcome: Result<i32, String> = try_measure_into(&mut out, || Err("x".to_string()));

        // the error value passes through unchanged
        assert_eq!(outcome.unwrap_err(), "x");

        let text = captured(out);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let line = lines[0];
        assert!(line.contains("before error"), "got {line:?}");

        // six decimal places of seconds
        let seconds = line
            .strip_prefix("Execution time before error: ")
            .and_then(|rest| rest.strip_suffix(" seconds"))
            .unwrap();
        let (_, fraction) = seconds.split_once('.').unwrap();
        assert_eq!(fraction.len(), 6);
    }

    #[test]
    fn test_try_measure_success_has_no_error_label() {
        let mut out = Vec::new();
        let outcome: Result<i32, String> = try_measure_into(&mut out, || Ok(7));
        assert_eq!(outcome.unwrap(), 7);

        let text = captured(out);
        assert!(text.starts_with("Execution time: "));
        assert!(!text.contains("before error"));
    }

    #[test]
    fn test_stop_timer_prints_elapsed_line() {
        let mut out = Vec::new();
        stop_timer_into(&mut out, start_timer());

        let text = captured(out);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Elapsed time: "));
    }

    #[test]
    fn test_timer_elapsed_is_non_negative() {
        let start = start_timer();
        assert!(stop_timer_elapsed(start) >= 0.0);
    }
}
