//! Error types for cronrun

use crate::field::Unit;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while parsing schedules or running jobs
#[derive(Debug, Error)]
pub enum CronError {
    /// A cron spec did not split into exactly five fields
    #[error("unable to parse cron spec provided: [{0}]")]
    InvalidSpec(String),

    /// One field of a cron spec could not be parsed
    #[error("unable to parse {unit} from spec: [{spec}]")]
    UnparseableField {
        /// The field that failed
        unit: Unit,
        /// The full spec as supplied by the caller
        spec: String,
    },

    /// No matching minute within the bounded forward search — the field
    /// combination can never occur (e.g. day 31 restricted to February)
    #[error("could not find next trigger date, gave up at {gave_up_at}")]
    SearchExhausted {
        /// Where the search stopped
        gave_up_at: DateTime<Utc>,
    },

    /// Job configured with a start date earlier than the current time
    #[error("Job [{job}]: Start date cannot be in the past: {start} now is: {now}")]
    StartDateInPast {
        job: String,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// Job configured with an end date earlier than the current time
    #[error("Job [{job}]: End date cannot be in the past: {end} now is: {now}")]
    EndDateInPast {
        job: String,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// Job configured with an end date at or before its start date
    #[error("Job [{job}]: End date cannot be before start date, start: {start} end: {end}")]
    EndDateBeforeStart {
        job: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A worker invocation failed and continue-on-error was not set
    #[error("Job [{job}]: Error running job at iteration {trigger}: {error}")]
    WorkerFailed {
        /// Job name
        job: String,
        /// Trigger time of the failing iteration
        trigger: DateTime<Utc>,
        /// The worker's error, rendered
        error: String,
    },

    /// The completion signal was already consumed by an earlier wait
    #[error("Job [{0}]: completion signal already consumed")]
    AlreadyCompleted(String),

    /// The scheduling loop task terminated without resolving the signal
    #[error("Job [{0}]: scheduling task terminated unexpectedly")]
    TaskAborted(String),
}

/// Result type alias for cron operations
pub type Result<T> = std::result::Result<T, CronError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_error_messages() {
        let err = CronError::InvalidSpec("* * *".to_string());
        assert_eq!(err.to_string(), "unable to parse cron spec provided: [* * *]");

        let err = CronError::UnparseableField {
            unit: Unit::DayOfMonth,
            spec: "* * / * *".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unable to parse day of month from spec: [* * / * *]"
        );
    }

    #[test]
    fn test_job_error_messages() {
        let trigger = Utc.with_ymd_and_hms(2023, 8, 1, 0, 5, 0).unwrap();
        let err = CronError::WorkerFailed {
            job: "backup".to_string(),
            trigger,
            error: "disk full".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("Job [backup]: Error running job at iteration"));
        assert!(message.ends_with("disk full"));
    }
}
