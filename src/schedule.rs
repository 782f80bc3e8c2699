//! Next-trigger computation
//!
//! A [`ScheduleGenerator`] couples a parsed cron expression with a cursor
//! timestamp. The next trigger is found by bounded forward search:
//! advance one minute at a time and return the first timestamp whose
//! minute, hour, day-of-month, month and day-of-week all belong to the
//! expression's matrices.

use crate::error::{CronError, Result};
use crate::parser::CronExpression;
use chrono::{DateTime, Duration, Utc};

/// Upper bound on the forward search, in minutes (a little over twenty
/// months). Exceeding it means the field combination can never occur,
/// e.g. day 31 restricted to February.
const MAX_SEARCH_MINUTES: u32 = 900_000;

/// Generates successive trigger times for a cron expression
///
/// The cursor starts at the supplied start date (truncated to the
/// minute) and only ever moves forward, so successive
/// [`next_trigger`](Self::next_trigger) calls yield strictly increasing
/// timestamps at minute granularity.
#[derive(Debug, Clone)]
pub struct ScheduleGenerator {
    expression: CronExpression,
    cursor: DateTime<Utc>,
}

impl ScheduleGenerator {
    /// Parse `cron_spec` and position the cursor at `start`
    pub fn new(cron_spec: &str, start: DateTime<Utc>) -> Result<Self> {
        Ok(Self::with_expression(CronExpression::parse(cron_spec)?, start))
    }

    /// Build a generator from an already-parsed expression
    ///
    /// An expression with an empty field matrix never matches anything;
    /// trigger computation on it reports search exhaustion.
    pub fn with_expression(expression: CronExpression, start: DateTime<Utc>) -> Self {
        Self {
            cursor: truncate_to_minute(start),
            expression,
        }
    }

    /// English description of the schedule
    pub fn description(&self) -> &str {
        self.expression.description()
    }

    /// The parsed expression driving this generator
    pub fn expression(&self) -> &CronExpression {
        &self.expression
    }

    /// Current cursor position
    pub fn cursor(&self) -> DateTime<Utc> {
        self.cursor
    }

    /// The next trigger strictly after `after`, leaving the cursor alone
    pub fn next_after(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let mut candidate = truncate_to_minute(after);
        if !self.expression.is_valid() {
            return Err(CronError::SearchExhausted {
                gave_up_at: candidate,
            });
        }
        for _ in 0..MAX_SEARCH_MINUTES {
            candidate = candidate + Duration::minutes(1);
            if self.expression.matches(&candidate) {
                return Ok(candidate);
            }
        }
        Err(CronError::SearchExhausted {
            gave_up_at: candidate,
        })
    }

    /// The next trigger after the cursor; advances the cursor to it
    pub fn next_trigger(&mut self) -> Result<DateTime<Utc>> {
        let next = self.next_after(self.cursor)?;
        self.cursor = next;
        Ok(next)
    }
}

/// Truncate to minute precision (seconds and sub-seconds zeroed)
fn truncate_to_minute(dt: DateTime<Utc>) -> DateTime<Utc> {
    let secs = dt.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(60), 0).unwrap_or(dt)
}
