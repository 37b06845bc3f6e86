// src/utils/log.rs

//! Summary blocks for the `log` facade.
//!
//! ```text
//! [SUMMARY] summer
//!     Rows: 12
//!     Accepted: 3
//! ```

/// Lines of a titled key/value summary.
pub fn summary_lines(title: &str, items: &[(&str, String)]) -> Vec<String> {
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(format!("[SUMMARY] {}", title));
    for (key, value) in items {
        lines.push(format!("    {}: {}", key, value));
    }
    lines
}

/// Log a summary section at info level.
pub fn summary(title: &str, items: &[(&str, String)]) {
    for line in summary_lines(title, items) {
        log::info!("{}", line);
    }
}
