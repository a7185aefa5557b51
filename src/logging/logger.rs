//! Structured logger backed by `tracing`.
use std::path::PathBuf;

use super::types::Log;
use super::utils::{DRY_RUN_TARGET, STAGE_TARGET, log_file};

/// Implement the methods of [`Log`] by delegating to inherent methods of the
/// same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger for command output.
///
/// Every message goes through `tracing`; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) decides what
/// reaches the console and always writes the full stream to
/// `$XDG_CACHE_HOME/dotts/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Only remembers the log file path for display; the file itself is
    /// created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            log_file: log_file(command),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only with `--verbose`; always in the
    /// log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log an action skipped by `--dry-run`.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    fn log_contents(log: &Logger) -> String {
        let path = log.log_path().expect("log path");
        fs::read_to_string(path).unwrap()
    }

    /// The tag column of the file line carrying `marker`.
    fn tag_of(log: &Logger, marker: &str) -> String {
        let contents = log_contents(log);
        let line = contents
            .lines()
            .find(|line| line.ends_with(marker))
            .unwrap_or_else(|| panic!("no line for {marker} in:\n{contents}"));
        line.split_whitespace().nth(1).unwrap().to_string()
    }

    #[test]
    fn log_file_starts_with_run_header() {
        let (log, _tmp, _guard) = isolated_logger();
        let contents = log_contents(&log);
        assert!(contents.starts_with("# dotts "), "{contents}");
        assert!(contents.lines().next().unwrap().contains(" test started "));
    }

    #[test]
    fn every_level_is_tagged_in_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let pid = std::process::id();
        let cases: [(&str, fn(&Logger, &str)); 6] = [
            ("stage", Logger::stage),
            ("info", Logger::info),
            ("debug", Logger::debug),
            ("warn", Logger::warn),
            ("error", Logger::error),
            ("dry-run", Logger::dry_run),
        ];
        for (tag, emit) in cases {
            let marker = format!("{tag}-marker-{pid}");
            emit(&log, &marker);
            assert_eq!(tag_of(&log, &marker), tag);
        }
    }

    #[test]
    fn escape_sequences_stripped_in_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.info("\x1b[32mFast-forward\x1b[0m");
        let contents = log_contents(&log);
        assert!(contents.contains("info    Fast-forward"), "{contents}");
        assert!(!contents.contains('\x1b'));
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        let marker = format!("trait-marker-{}", std::process::id());
        log_ref.warn(&marker);
        assert_eq!(tag_of(&log, &marker), "warn");
    }
}
