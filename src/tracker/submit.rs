use tokio_util::sync::CancellationToken;

use crate::error::{Result, TrackerError};
use crate::queue::{JobObserver, Submitter};
use crate::schedule::Sleeper;
use crate::tracker::{Job, Tracker};

const JOB_ID_MARKER: &str = "Your job ";

/// Extract the job id from submission output such as
/// `Your job 12345 ("hostname.sge") has been submitted`.
///
/// The digits must directly follow the first `"Your job "` and be terminated by a space.
/// Ids above `i64::MAX` are rejected so they can always be reported as signed numbers.
pub fn parse_job_id(stdout: &str) -> Option<u64> {
    let start = stdout.find(JOB_ID_MARKER)? + JOB_ID_MARKER.len();
    let rest = &stdout[start..];
    let end = rest.find(|c: char| !c.is_ascii_digit())?;
    if end == 0 || !rest[end..].starts_with(' ') {
        return None;
    }
    let id: i64 = rest[..end].parse().ok()?;
    u64::try_from(id).ok()
}

impl<S, O, P> Tracker<S, O, P>
where
    S: Submitter,
    O: JobObserver,
    P: Sleeper,
{
    /// Submit a script to the queue.
    ///
    /// A rejected submission is not an error: the returned job is `Failed`. An error is
    /// returned only if the submission command itself could not be run.
    pub async fn submit(&mut self, script: &str) -> Result<Job> {
        let index = self.jobs.len();
        let output_path = self.config.output_path(index);
        let error_path = self.config.error_path(index);

        let stdout = self
            .submitter
            .submit(script, &output_path, &error_path)
            .await
            .map_err(|source| TrackerError::SubmitterUnavailable {
                command: self.submitter.command().to_string(),
                source,
            })?;

        let job_id = parse_job_id(&stdout);
        match job_id {
            Some(job_id) => tracing::info!(index, job_id, script, "Submitted job"),
            None => {
                tracing::warn!(index, script, "Job submission rejected");
                tracing::debug!(index, output = %stdout.trim(), "Submission output");
            }
        }

        let job = Job::new(index, script.to_string(), job_id, output_path, error_path);
        self.jobs.push(job.clone());
        Ok(job)
    }

    /// Submit scripts in order until `token` is cancelled. Returns how many were submitted.
    pub async fn submit_until_cancelled<'a, I>(
        &mut self,
        scripts: I,
        token: &CancellationToken,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut submitted = 0;
        for script in scripts {
            if token.is_cancelled() {
                tracing::warn!(submitted, "Interrupted, skipping remaining submissions");
                break;
            }
            self.submit(script).await?;
            submitted += 1;
        }
        Ok(submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grid_engine_confirmation() {
        let out = "Your job 12345 (\"hostname.sge\") has been submitted\n";
        assert_eq!(parse_job_id(out), Some(12345));
    }

    #[test]
    fn tolerates_surrounding_text() {
        let out = "warning: no suitable queues\nYour job 7 ('a.sge') has been submitted\nbye";
        assert_eq!(parse_job_id(out), Some(7));
    }

    #[test]
    fn missing_marker_is_rejected() {
        assert_eq!(parse_job_id(""), None);
        assert_eq!(parse_job_id("Unable to run job: denied\n"), None);
        assert_eq!(parse_job_id("your job 12 (x)"), None);
    }

    #[test]
    fn digits_must_follow_marker_directly() {
        assert_eq!(parse_job_id("Your job-array 55.1-4:1 (\"x\")"), None);
        assert_eq!(parse_job_id("Your job  55 (x)"), None);
        assert_eq!(parse_job_id("Your job abc (x)"), None);
    }

    #[test]
    fn digits_must_be_space_terminated() {
        assert_eq!(parse_job_id("Your job 55"), None);
        assert_eq!(parse_job_id("Your job 55\n"), None);
        assert_eq!(parse_job_id("Your job 55."), None);
    }

    #[test]
    fn only_first_marker_counts() {
        assert_eq!(parse_job_id("Your job x\nYour job 9 (y)"), None);
    }

    #[test]
    fn overflowing_id_is_rejected() {
        assert_eq!(parse_job_id("Your job 99999999999999999999999 (x)"), None);
        assert_eq!(parse_job_id("Your job 18446744073709551615 (x)"), None);
    }

    #[test]
    fn largest_signed_id_is_accepted() {
        assert_eq!(
            parse_job_id("Your job 9223372036854775807 (x)"),
            Some(i64::MAX as u64)
        );
        assert_eq!(parse_job_id("Your job 9223372036854775808 (x)"), None);
    }
}
