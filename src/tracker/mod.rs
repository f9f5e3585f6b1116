//! Job lifecycle tracking for batch-queue submissions.
//!
//! A [`Tracker`] submits scripts through a [`Submitter`], gives each submission a
//! zero-based index, and follows every job through its lifecycle by watching the
//! output/error files the queue writes:
//!
//! ```text
//! submit ──> Running ──> Finished
//!    │          └──────> Error      (non-empty stderr, ErrorStreamPolicy::Escalate)
//!    └─────> Failed                 (no job id in the submission output)
//! ```
//!
//! A job counts as done once its output file exists and is non-empty. The tracker then
//! consumes the error file (if non-empty) and the output file, in that order, into the
//! job's captured output. There is no exit-code check and no timeout.

pub mod job;
mod poll;
mod submit;

pub use job::{Job, JobStatus, JobSummary, REJECTED_JOB_ID};
pub use submit::parse_job_id;

use crate::config::TrackerConfig;
use crate::queue::{FsObserver, JobObserver, Submitter};
use crate::schedule::{RetrySchedule, Sleeper, TokioSleeper};

/// Owns every job it submits. Job indices equal their position in submission order.
#[derive(Debug)]
pub struct Tracker<S, O = FsObserver, P = TokioSleeper> {
    submitter: S,
    observer: O,
    schedule: RetrySchedule<P>,
    config: TrackerConfig,
    jobs: Vec<Job>,
}

impl<S: Submitter> Tracker<S> {
    /// Tracker that watches the real filesystem and sleeps on the tokio timer
    pub fn new(submitter: S, config: TrackerConfig) -> Self {
        Self::with_parts(submitter, FsObserver, TokioSleeper, config)
    }
}

impl<S, O, P> Tracker<S, O, P>
where
    S: Submitter,
    O: JobObserver,
    P: Sleeper,
{
    pub fn with_parts(submitter: S, observer: O, sleeper: P, config: TrackerConfig) -> Self {
        Self {
            submitter,
            observer,
            schedule: RetrySchedule::with_sleeper(config.poll_interval, sleeper),
            config,
            jobs: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn schedule(&self) -> &RetrySchedule<P> {
        &self.schedule
    }

    pub fn job(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    /// All jobs in submission order
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Number of jobs not yet in a terminal state
    pub fn pending(&self) -> usize {
        self.jobs.iter().filter(|j| !j.is_terminal()).count()
    }

    /// Summaries of every job in index order
    pub fn results(&self, include_output: bool) -> Vec<JobSummary> {
        self.jobs
            .iter()
            .map(|job| job.summary(include_output))
            .collect()
    }

    pub fn print_results(&self, include_output: bool) {
        for summary in self.results(include_output) {
            println!("{}", summary);
        }
    }
}
