//! Job logging
//!
//! Jobs emit lines of the form `Job [{name}]: {message}` through a
//! pluggable [`LogSink`]. The default sink forwards to `tracing`; tests
//! inject a [`MemoryLogSink`] to capture output.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a job log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Normal progress output
    Info,
    /// Worker failures
    Error,
}

/// Destination for job log lines
///
/// Implementations receive fully-formatted lines (job-name prefix
/// included) and decide where they go.
pub trait LogSink: Send + Sync {
    /// Emit one formatted line
    fn log(&self, level: LogLevel, line: &str);
}

/// Default sink — forwards to `tracing`
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Info => tracing::info!("{}", line),
            LogLevel::Error => tracing::error!("{}", line),
        }
    }
}

/// In-memory sink for tests — collects every line in emission order
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    /// Captured lines at one level
    pub fn lines_at(&self, level: LogLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line)
            .collect()
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, level: LogLevel, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, line.to_string()));
        }
    }
}

/// Logger bound to one job's name
///
/// Cheap to clone. The scheduling loop uses it for its own progress
/// lines and hands a clone to the worker, so worker messages carry the
/// same `Job [{name}]:` prefix.
#[derive(Clone)]
pub struct JobLogger {
    job_name: Arc<str>,
    sink: Arc<dyn LogSink>,
    enabled: bool,
}

impl JobLogger {
    pub(crate) fn new(job_name: &str, sink: Arc<dyn LogSink>, enabled: bool) -> Self {
        Self {
            job_name: Arc::from(job_name),
            sink,
            enabled,
        }
    }

    /// Emit a line at the given level; a no-op when logging is disabled
    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.enabled {
            return;
        }
        self.sink
            .log(level, &format!("Job [{}]: {}", self.job_name, message));
    }

    /// Emit an info line
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Emit an error line
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

impl fmt::Debug for JobLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobLogger")
            .field("job_name", &self.job_name)
            .field("enabled", &self.enabled)
            .finish()
    }
}
