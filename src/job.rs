//! Job scheduling
//!
//! [`CronJob`] couples a [`ScheduleGenerator`] with a worker callback and
//! drives the repeat-execute-reschedule loop on a spawned tokio task.
//! Iterations are strictly serialized: exactly one timer is outstanding
//! at any time, and the next timer is armed only after the current worker
//! invocation settles, so worker invocations occur one at a time in
//! increasing trigger-time order.

use crate::error::{CronError, Result};
use crate::log::{JobLogger, LogSink, TracingSink};
use crate::schedule::ScheduleGenerator;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Error type workers may return — anything the caller's work produces
pub type WorkerError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of one worker invocation
pub type WorkerResult = std::result::Result<(), WorkerError>;

/// Test-seam hook, run synchronously by the scheduling loop
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// The work a job performs on every trigger
///
/// `fire_time` is the time observed when the timer fired. `log` is bound
/// to the job's name, so worker output lines up with the scheduler's own.
/// Use [`worker_fn`] to build a worker from an async closure.
#[async_trait]
pub trait JobWorker: Send + Sync + 'static {
    /// Perform one iteration of the job's work
    async fn run(&self, fire_time: DateTime<Utc>, log: JobLogger) -> WorkerResult;
}

/// A [`JobWorker`] wrapping an async function or closure
pub struct WorkerFn<F> {
    f: F,
}

/// Wrap an async function or closure as a [`JobWorker`]
///
/// ```ignore
/// let worker = worker_fn(|fire_time, log| async move {
///     log.info(&format!("triggered at {fire_time}"));
///     Ok(())
/// });
/// ```
pub fn worker_fn<F, Fut>(f: F) -> WorkerFn<F>
where
    F: Fn(DateTime<Utc>, JobLogger) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = WorkerResult> + Send,
{
    WorkerFn { f }
}

#[async_trait]
impl<F, Fut> JobWorker for WorkerFn<F>
where
    F: Fn(DateTime<Utc>, JobLogger) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = WorkerResult> + Send,
{
    async fn run(&self, fire_time: DateTime<Utc>, log: JobLogger) -> WorkerResult {
        (self.f)(fire_time, log).await
    }
}

/// Configuration for a [`CronJob`]
///
/// All fields are optional; defaults are resolved once, when the job is
/// constructed.
#[derive(Clone, Default)]
pub struct JobOptions {
    /// Keep scheduling after a failed worker invocation (default: false)
    pub continue_on_error: bool,
    /// When the schedule begins; `None` means "now", resolved at
    /// construction time
    pub start_date: Option<DateTime<Utc>>,
    /// When the schedule stops. The completion signal resolves
    /// successfully once the next trigger would land at or past this
    /// instant; the job never executes at or after it
    pub end_date: Option<DateTime<Utc>>,
    /// Maximum number of worker invocations; 0 means unlimited
    pub scheduled_iterations: u64,
    /// Hook run just before each worker invocation (test seam)
    pub before_executing_worker: Option<Hook>,
    /// Hook run right after each timer is armed (test seam)
    pub after_arming_timer: Option<Hook>,
    /// Suppress all log output for this job
    pub disable_logging: bool,
    /// Log sink; `None` selects the tracing-backed default
    pub log_sink: Option<Arc<dyn LogSink>>,
}

impl JobOptions {
    /// Options with every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep scheduling after worker failures
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Set when the schedule begins
    pub fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Set when the schedule stops
    pub fn with_end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Cap the number of worker invocations
    pub fn with_scheduled_iterations(mut self, iterations: u64) -> Self {
        self.scheduled_iterations = iterations;
        self
    }

    /// Run a hook just before every worker invocation
    pub fn with_before_executing_worker(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.before_executing_worker = Some(Arc::new(hook));
        self
    }

    /// Run a hook right after every timer is armed
    pub fn with_after_arming_timer(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.after_arming_timer = Some(Arc::new(hook));
        self
    }

    /// Suppress all log output
    pub fn with_disable_logging(mut self, disable: bool) -> Self {
        self.disable_logging = disable;
        self
    }

    /// Route log lines to a custom sink
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }
}

impl fmt::Debug for JobOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobOptions")
            .field("continue_on_error", &self.continue_on_error)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("scheduled_iterations", &self.scheduled_iterations)
            .field("before_executing_worker", &self.before_executing_worker.is_some())
            .field("after_arming_timer", &self.after_arming_timer.is_some())
            .field("disable_logging", &self.disable_logging)
            .field("log_sink", &self.log_sink.is_some())
            .finish()
    }
}

/// A named, recurring job driven by a cron schedule
///
/// Constructed with [`CronJob::schedule`], which validates the
/// configuration, parses the spec and spawns the scheduling loop.
/// Dropping the handle does not stop the schedule; there is no explicit
/// cancellation — a job ends by reaching its end date, its iteration cap,
/// or a non-continued worker failure.
pub struct CronJob {
    name: String,
    description: String,
    executed: Arc<AtomicU64>,
    completion: Option<oneshot::Receiver<Result<()>>>,
}

impl CronJob {
    /// Validate options, parse the schedule and start the scheduling loop
    ///
    /// Must be called within a tokio runtime. Configuration problems —
    /// start date in the past, end date in the past or not after the
    /// start date, malformed cron spec — fail synchronously here; any
    /// later failure is reported through [`CronJob::wait`]. Date checks
    /// are at second granularity.
    pub fn schedule(
        name: impl Into<String>,
        cron_spec: &str,
        worker: impl JobWorker,
        options: JobOptions,
    ) -> Result<Self> {
        let name = name.into();
        let now = Utc::now();
        let start = options.start_date.unwrap_or(now);

        if start.timestamp() < now.timestamp() {
            return Err(CronError::StartDateInPast {
                job: name,
                start,
                now,
            });
        }
        if let Some(end) = options.end_date {
            if end.timestamp() < now.timestamp() {
                return Err(CronError::EndDateInPast { job: name, end, now });
            }
            if end.timestamp() <= start.timestamp() {
                return Err(CronError::EndDateBeforeStart {
                    job: name,
                    start,
                    end,
                });
            }
        }

        let generator = ScheduleGenerator::new(cron_spec, start)?;
        let sink = options
            .log_sink
            .clone()
            .unwrap_or_else(|| Arc::new(TracingSink));
        let logger = JobLogger::new(&name, sink, !options.disable_logging);

        let mut banner = format!("Scheduled to execute: {}", generator.description());
        if options.scheduled_iterations > 0 {
            banner.push_str(&format!(" for {} iterations.", options.scheduled_iterations));
        }
        logger.info(&banner);

        let description = generator.description().to_string();
        let executed = Arc::new(AtomicU64::new(0));
        let (done_tx, done_rx) = oneshot::channel();

        let job_loop = JobLoop {
            name: name.clone(),
            generator,
            worker,
            options,
            logger,
            executed: executed.clone(),
        };
        tokio::spawn(async move {
            let outcome = job_loop.run().await;
            let _ = done_tx.send(outcome);
        });

        Ok(Self {
            name,
            description,
            executed,
            completion: Some(done_rx),
        })
    }

    /// Job name used in log and error messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// English description of the cron schedule
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Number of worker invocations attempted so far
    pub fn executed_iterations(&self) -> u64 {
        self.executed.load(Ordering::SeqCst)
    }

    /// Await the completion signal
    ///
    /// Settles exactly once: `Ok(())` when the iteration cap or end date
    /// is reached, `Err` when a worker fails without continue-on-error or
    /// the next-trigger search is exhausted. With no cap, no end date and
    /// continue-on-error set, the signal never settles — awaiting it then
    /// keeps the schedule running indefinitely.
    pub async fn wait(&mut self) -> Result<()> {
        match self.completion.take() {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(CronError::TaskAborted(self.name.clone()))),
            None => Err(CronError::AlreadyCompleted(self.name.clone())),
        }
    }
}

impl fmt::Debug for CronJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CronJob")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("executed", &self.executed_iterations())
            .finish()
    }
}

/// State moved onto the spawned scheduling task
struct JobLoop<W> {
    name: String,
    generator: ScheduleGenerator,
    worker: W,
    options: JobOptions,
    logger: JobLogger,
    executed: Arc<AtomicU64>,
}

impl<W: JobWorker> JobLoop<W> {
    /// One iteration at a time: check the cap, compute the next trigger,
    /// check the end date, arm the timer, run the worker, repeat.
    async fn run(mut self) -> Result<()> {
        loop {
            let cap = self.options.scheduled_iterations;
            if cap > 0 && self.executed.load(Ordering::SeqCst) >= cap {
                self.logger.info(&format!(
                    "Number of scheduled iterations to execute reached {}, completing job",
                    cap
                ));
                return Ok(());
            }

            let trigger = self.generator.next_trigger()?;
            if let Some(end) = self.options.end_date {
                if trigger >= end {
                    self.logger.info("End date reached, completing job");
                    return Ok(());
                }
            }

            let now = Utc::now();
            let delay = (trigger - now).to_std().unwrap_or(std::time::Duration::ZERO);
            self.logger.info(&format!(
                "Scheduling to trigger in the next {} ms, at {} the time is now {}.",
                delay.as_millis(),
                trigger,
                now
            ));

            let timer = tokio::time::sleep(delay);
            if let Some(hook) = &self.options.after_arming_timer {
                hook();
            }
            timer.await;

            if let Some(hook) = &self.options.before_executing_worker {
                hook();
            }
            let iteration = self.executed.fetch_add(1, Ordering::SeqCst) + 1;
            self.logger
                .info(&format!("Executing iteration #{}", iteration));

            let fire_time = Utc::now();
            match self.worker.run(fire_time, self.logger.clone()).await {
                Ok(()) => {
                    self.logger.info("Scheduled trigger finished!");
                }
                Err(err) => {
                    self.logger.error(&format!(
                        "Failed to execute, following error was received: {}",
                        err
                    ));
                    self.logger.info("Scheduled trigger did not finish!");
                    if !self.options.continue_on_error {
                        return Err(CronError::WorkerFailed {
                            job: self.name.clone(),
                            trigger,
                            error: err.to_string(),
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn nop(_fire_time: DateTime<Utc>, _log: JobLogger) -> WorkerResult {
        Ok(())
    }

    #[test]
    fn test_options_defaults() {
        let options = JobOptions::default();
        assert!(!options.continue_on_error);
        assert!(options.start_date.is_none());
        assert!(options.end_date.is_none());
        assert_eq!(options.scheduled_iterations, 0);
        assert!(options.before_executing_worker.is_none());
        assert!(options.after_arming_timer.is_none());
        assert!(!options.disable_logging);
        assert!(options.log_sink.is_none());
    }

    #[test]
    fn test_options_builders() {
        let end = Utc::now() + Duration::hours(1);
        let options = JobOptions::new()
            .with_continue_on_error(true)
            .with_end_date(end)
            .with_scheduled_iterations(5)
            .with_disable_logging(true)
            .with_after_arming_timer(|| {});

        assert!(options.continue_on_error);
        assert_eq!(options.end_date, Some(end));
        assert_eq!(options.scheduled_iterations, 5);
        assert!(options.disable_logging);
        assert!(options.after_arming_timer.is_some());

        let debug = format!("{options:?}");
        assert!(debug.contains("scheduled_iterations: 5"));
        assert!(debug.contains("after_arming_timer: true"));
    }

    #[tokio::test]
    async fn test_start_date_in_past_rejected() {
        let start = Utc::now() - Duration::minutes(5);
        let err = CronJob::schedule(
            "a badly declared job",
            "*/1 * * * *",
            worker_fn(nop),
            JobOptions::new().with_start_date(start),
        )
        .unwrap_err();

        assert!(matches!(err, CronError::StartDateInPast { .. }));
        assert!(err
            .to_string()
            .starts_with("Job [a badly declared job]: Start date cannot be in the past"));
    }

    #[tokio::test]
    async fn test_end_date_in_past_rejected() {
        let end = Utc::now() - Duration::minutes(5);
        let err = CronJob::schedule(
            "a badly declared job",
            "*/1 * * * *",
            worker_fn(nop),
            JobOptions::new().with_end_date(end),
        )
        .unwrap_err();

        assert!(matches!(err, CronError::EndDateInPast { .. }));
    }

    #[tokio::test]
    async fn test_end_date_before_start_rejected() {
        let start = Utc::now() + Duration::minutes(10);
        let end = Utc::now() + Duration::minutes(5);
        let err = CronJob::schedule(
            "a badly declared job",
            "*/1 * * * *",
            worker_fn(nop),
            JobOptions::new().with_start_date(start).with_end_date(end),
        )
        .unwrap_err();

        assert!(matches!(err, CronError::EndDateBeforeStart { .. }));
        assert!(err
            .to_string()
            .starts_with("Job [a badly declared job]: End date cannot be before start date"));
    }

    #[tokio::test]
    async fn test_end_date_equal_to_start_rejected() {
        let start = Utc::now() + Duration::minutes(10);
        let err = CronJob::schedule(
            "a badly declared job",
            "*/1 * * * *",
            worker_fn(nop),
            JobOptions::new().with_start_date(start).with_end_date(start),
        )
        .unwrap_err();

        assert!(matches!(err, CronError::EndDateBeforeStart { .. }));
    }

    #[tokio::test]
    async fn test_malformed_spec_rejected() {
        let err = CronJob::schedule("bad spec", "not cron", worker_fn(nop), JobOptions::new())
            .unwrap_err();
        assert!(matches!(err, CronError::InvalidSpec(_)));

        let err = CronJob::schedule("bad field", "60 * * * *", worker_fn(nop), JobOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CronError::UnparseableField {
                unit: crate::field::Unit::Minute,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_job_exposes_description_and_name() {
        let job = CronJob::schedule(
            "augustjob",
            "5 0 * 8 *",
            worker_fn(nop),
            JobOptions::new().with_disable_logging(true),
        )
        .unwrap();

        assert_eq!(job.name(), "augustjob");
        assert_eq!(job.description(), "At 00:05 in August");
        assert_eq!(job.executed_iterations(), 0);
    }
}
