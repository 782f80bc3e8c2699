//! # cronrun
//!
//! Embeddable cron-style job scheduling with human-readable schedule
//! descriptions.
//!
//! ## Overview
//!
//! `cronrun` parses standard 5-field cron expressions (minute, hour,
//! day-of-month, month, day-of-week), computes trigger times, renders an
//! English description of the schedule, and drives a worker callback on a
//! tokio task with lifecycle controls: start and end windows, an
//! iteration cap, and an error-continuation policy. It runs inside a host
//! process — no daemon, no persistence.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cronrun::{worker_fn, CronJob, JobOptions};
//! use chrono::{Duration, Utc};
//!
//! // Report every minute until the end date, then resolve
//! let mut job = CronJob::schedule(
//!     "heartbeat",
//!     "*/1 * * * *",
//!     worker_fn(|fire_time, log| async move {
//!         log.info(&format!("alive at {fire_time}"));
//!         Ok(())
//!     }),
//!     JobOptions::new().with_end_date(Utc::now() + Duration::hours(1)),
//! )?;
//!
//! println!("{}", job.description()); // "At every minute"
//! job.wait().await?;
//! ```
//!
//! ## Architecture
//!
//! - [`ParsedField`] — one field parsed into an allowed-value set and an
//!   English fragment
//! - [`CronExpression`] — the five fields plus the composed description
//! - [`ScheduleGenerator`] — bounded forward search for the next trigger
//! - [`CronJob`] — the scheduling loop: arm timer, run worker, repeat,
//!   with a completion signal that settles exactly once
//! - [`LogSink`] — pluggable destination for `Job [{name}]: ...` lines;
//!   `tracing` by default

mod error;
mod field;
mod job;
mod log;
mod parser;
mod schedule;

pub use error::{CronError, Result};
pub use field::{ParsedField, Unit, UnitSpec};
pub use job::{worker_fn, CronJob, Hook, JobOptions, JobWorker, WorkerError, WorkerFn, WorkerResult};
pub use log::{JobLogger, LogLevel, LogSink, MemoryLogSink, TracingSink};
pub use parser::CronExpression;
pub use schedule::ScheduleGenerator;
