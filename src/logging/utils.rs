//! Event classification, log file location and timestamps.
use std::path::PathBuf;
use std::{env, fs};

use tracing::Level;

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "dotts::stage";
/// Target used for dry-run notices.
pub(super) const DRY_RUN_TARGET: &str = "dotts::dry_run";

/// Timestamp in the log file header.
pub(super) const HEADER_TIME: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Timestamp on every log file line.
pub(super) const LINE_TIME: &str = "%H:%M:%S";

/// How an event is rendered, decided by its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EventKind {
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl EventKind {
    pub(super) fn classify(level: Level, target: &str) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO if target == STAGE_TARGET => Self::Stage,
            Level::INFO if target == DRY_RUN_TARGET => Self::DryRun,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Second column of a log file line.
    pub(super) const fn file_tag(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::DryRun => "dry-run",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

/// Drop terminal escape sequences so the log file stays plain text.
///
/// `ESC [ ... <final>` is removed up to and including the final byte
/// (`@`..`~`); any other escape swallows the one character after `ESC`.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
        } else if chars.next_if_eq(&'[').is_some() {
            let _ = chars.by_ref().find(|c| ('@'..='~').contains(c));
        } else {
            let _ = chars.next();
        }
    }
    out
}

/// `$XDG_CACHE_HOME`, else `~/.cache`.
fn cache_root() -> PathBuf {
    env::var_os("XDG_CACHE_HOME")
        .filter(|dir| !dir.is_empty())
        .map_or_else(
            || {
                env::var_os("HOME")
                    .map_or_else(|| PathBuf::from("."), PathBuf::from)
                    .join(".cache")
            },
            PathBuf::from,
        )
}

/// `<cache>/dotts/<command>.log`, creating the directory.
///
/// `None` when the directory cannot be created; logging then stays
/// console-only.
pub(super) fn log_file(command: &str) -> Option<PathBuf> {
    let dir = cache_root().join("dotts");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}
