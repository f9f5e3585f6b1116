use tokio_util::sync::CancellationToken;

use crate::config::ErrorStreamPolicy;
use crate::error::{Result, TrackerError};
use crate::queue::{JobObserver, Submitter};
use crate::schedule::Sleeper;
use crate::tracker::{JobStatus, Tracker};

impl<S, O, P> Tracker<S, O, P>
where
    S: Submitter,
    O: JobObserver,
    P: Sleeper,
{
    /// Check one job and advance it if its output has arrived. Returns whether the job
    /// is now terminal.
    ///
    /// Terminal jobs are not looked at again, so `Failed` jobs never touch the filesystem.
    pub fn poll_job(&mut self, index: usize) -> Result<bool> {
        let policy = self.config.error_policy;
        let observer = &self.observer;
        let job = self
            .jobs
            .get_mut(index)
            .ok_or(TrackerError::UnknownJob(index))?;

        if job.is_terminal() {
            return Ok(true);
        }

        if observer.file_len(&job.output_path)?.is_none() {
            return Ok(false);
        }

        // The queue may have created the file but not written it out yet
        observer.flush()?;
        if observer.file_len(&job.output_path)?.unwrap_or(0) == 0 {
            return Ok(false);
        }

        // Both files are read before the job changes, so a failed read leaves it untouched
        let diagnostics = match observer.file_len(&job.error_path)?.unwrap_or(0) {
            0 => None,
            _ => Some(observer.read(&job.error_path)?),
        };
        let output = observer.read(&job.output_path)?;

        let mut status = JobStatus::Finished;
        if let Some(ref diagnostics) = diagnostics {
            tracing::debug!(
                index,
                bytes = diagnostics.len(),
                "Merged error stream into job output"
            );
            job.capture(diagnostics);
            if policy == ErrorStreamPolicy::Escalate {
                status = JobStatus::Error;
            }
        }
        job.capture(&output);
        job.complete(status);

        // The job is terminal now and will not be polled again, even if a delete fails
        if diagnostics.is_some() {
            observer.remove(&job.error_path)?;
        }
        observer.remove(&job.output_path)?;

        tracing::info!(index, job_id = ?job.job_id, status = %status, "Job finished");
        Ok(true)
    }

    /// Poll every job once, in index order. Returns true if all are terminal.
    pub fn poll_all(&mut self) -> Result<bool> {
        let mut all_terminal = true;
        for index in 0..self.jobs.len() {
            if !self.poll_job(index)? {
                all_terminal = false;
            }
        }
        Ok(all_terminal)
    }

    /// Block until every job is terminal, polling once per interval.
    ///
    /// A job whose output never appears keeps this waiting forever.
    pub async fn wait(&mut self) -> Result<()> {
        while !self.poll_all()? {
            tracing::debug!(
                cycle = self.schedule.cycles(),
                pending = self.pending(),
                "Jobs still running"
            );
            self.schedule.pause().await;
        }
        Ok(())
    }

    /// Like [`wait`](Self::wait), but stop early once `token` is cancelled.
    ///
    /// Returns `Ok(true)` if all jobs reached a terminal state and `Ok(false)` if waiting
    /// was cancelled first. Cancelling does not withdraw anything from the queue.
    pub async fn wait_until_cancelled(&mut self, token: &CancellationToken) -> Result<bool> {
        loop {
            if self.poll_all()? {
                return Ok(true);
            }

            let cancelled = tokio::select! {
                biased;
                _ = token.cancelled() => true,
                _ = self.schedule.pause() => false,
            };
            if cancelled {
                tracing::warn!(pending = self.pending(), "Stopped waiting for running jobs");
                return Ok(false);
            }
        }
    }
}
