//! Structured logging using tracing.
//!
//! Console output always; file output when a log path is supplied.
//! Verbosity from the -v flags maps onto the filter level, RUST_LOG is
//! deliberately ignored so the flags stay authoritative.

use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ellipse a string for display: first half + "..." + last half.
/// If `s` has ≤ `max_len` chars it is returned unchanged.
pub fn ellipse(s: &str, max_len: usize) -> String {
    const SEP: &str = "...";
    let sep_len = 3;
    let chars: Vec<char> = s.chars().collect();
    let n = chars.len();
    if n <= max_len {
        return s.to_string();
    }
    let first_count = (max_len - sep_len) / 2;
    let last_count = (max_len - sep_len) - first_count;
    let first: String = chars[..first_count].iter().collect();
    let last: String = chars[n - last_count..].iter().collect();
    format!("{}{}{}", first, SEP, last)
}

/// Initialize tracing with console and optional file output.
///
/// Verbosity: 0 → error, 1 → warn, 2 → debug, 3+ → trace.
pub fn init_tracing(verbosity: u8, log_file_path: Option<PathBuf>) {
    let filter_level = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::new(filter_level);

    let registry = tracing_subscriber::registry().with(filter);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    if let Some(log_path) = log_file_path {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        if let Some(file) = file {
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(false); // No ANSI in files

            registry.with(console_layer).with(file_layer).init();
        } else {
            registry.with(console_layer).init();
        }
    } else {
        registry.with(console_layer).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipse_keeps_short_strings() {
        assert_eq!(ellipse("short", 10), "short");
    }

    #[test]
    fn ellipse_clips_both_ends() {
        let clipped = ellipse("abcdefghijklmnopqrstuvwxyz", 11);
        assert_eq!(clipped.chars().count(), 11);
        assert!(clipped.starts_with("abcd"));
        assert!(clipped.ends_with("wxyz"));
        assert!(clipped.contains("..."));
    }
}
