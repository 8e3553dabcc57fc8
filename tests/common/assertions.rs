//! Domain-specific assertion macros for quill harnesses.
//!
//! These add context-rich failure messages that make it clear *which* sink
//! violated *what* routing or formatting guarantee.

// ---------------------------------------------------------------------------
// File content assertions
// ---------------------------------------------------------------------------

/// Assert that a log file contains a needle.
///
/// ```rust,ignore
/// assert_file_contains!(root.join("scrapers/twitter.log"), "rate limit");
/// ```
#[macro_export]
macro_rules! assert_file_contains {
    ($path:expr, $needle:expr) => {{
        let owned = $path;
        let path: &std::path::Path = owned.as_ref();
        let needle: &str = $needle;
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if !content.contains(needle) {
            panic!(
                "assert_file_contains! failed:\n  file:   {}\n  needle: {:?}\n  content:\n{}",
                path.display(),
                needle,
                content
            );
        }
    }};
}

/// Assert that a log file does NOT contain a needle.
#[macro_export]
macro_rules! assert_file_lacks {
    ($path:expr, $needle:expr) => {{
        let owned = $path;
        let path: &std::path::Path = owned.as_ref();
        let needle: &str = $needle;
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.contains(needle) {
            panic!(
                "assert_file_lacks! failed: {:?} found in {}\n  content:\n{}",
                needle,
                path.display(),
                content
            );
        }
    }};
}

/// Assert the exact number of lines in a log file.
#[macro_export]
macro_rules! assert_line_count {
    ($path:expr, $expected:expr) => {{
        let owned = $path;
        let path: &std::path::Path = owned.as_ref();
        let expected: usize = $expected;
        let content = std::fs::read_to_string(path).unwrap_or_default();
        let actual = content.lines().count();
        if actual != expected {
            panic!(
                "assert_line_count! failed for {}:\n  expected: {} lines\n  actual:   {} lines\n  content:\n{}",
                path.display(),
                expected,
                actual,
                content
            );
        }
    }};
}

/// Assert that every line of a file parses as a standalone JSON object
/// carrying the mandatory record keys.
#[macro_export]
macro_rules! assert_json_lines {
    ($path:expr) => {{
        let owned = $path;
        let path: &std::path::Path = owned.as_ref();
        let content = std::fs::read_to_string(path).unwrap_or_default();
        for (i, line) in content.lines().enumerate() {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap_or_else(|err| {
                panic!(
                    "assert_json_lines! failed: line {} of {} is not valid JSON: {}\n  line: {:?}",
                    i + 1,
                    path.display(),
                    err,
                    line
                )
            });
            for key in ["timestamp", "level", "logger", "message", "extra"] {
                if parsed.get(key).is_none() {
                    panic!(
                        "assert_json_lines! failed: line {} of {} lacks key {:?}\n  line: {:?}",
                        i + 1,
                        path.display(),
                        key,
                        line
                    );
                }
            }
        }
    }};
}
