//! The [`Log`] trait shared by command and engine code.

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation; the
/// sync engine and command handlers take `&dyn Log` so tests can swap in a
/// recording double.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log an action that `--dry-run` skipped.
    fn dry_run(&self, msg: &str);
}

/// A [`Log`] that records every message in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingLog {
    /// Every message logged so far, prefixed with its level.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    fn push(&self, level: &str, msg: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(format!("{level}: {msg}"));
        }
    }
}

#[cfg(test)]
impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry-run", msg);
    }
}
