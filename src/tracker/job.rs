use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Job id rendered in summaries when the queue never accepted the job
pub const REJECTED_JOB_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// The queue did not hand back a job id
    Failed,
    /// Queued or executing
    Running,
    Finished,
    /// Finished with error-stream output (only under `ErrorStreamPolicy::Escalate`)
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Failed => write!(f, "FAILED"),
            JobStatus::Running => write!(f, "RUNNING"),
            JobStatus::Finished => write!(f, "FINISHED"),
            JobStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// One submission attempt.
///
/// Status and captured output only change through the owning `Tracker`.
#[derive(Debug, Clone)]
pub struct Job {
    pub index: usize,
    /// Id assigned by the queue; `None` when submission was rejected
    pub job_id: Option<u64>,
    pub script: String,
    pub output_path: PathBuf,
    pub error_path: PathBuf,
    pub submitted_at: DateTime<Utc>,
    pub(crate) status: JobStatus,
    pub(crate) output: String,
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(
        index: usize,
        script: String,
        job_id: Option<u64>,
        output_path: PathBuf,
        error_path: PathBuf,
    ) -> Self {
        let submitted_at = Utc::now();
        let (status, completed_at) = match job_id {
            Some(_) => (JobStatus::Running, None),
            None => (JobStatus::Failed, Some(submitted_at)),
        };
        Self {
            index,
            job_id,
            script,
            output_path,
            error_path,
            submitted_at,
            status,
            output: String::new(),
            completed_at,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Text captured from the job's error and output files
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn capture(&mut self, text: &str) {
        debug_assert_eq!(self.status, JobStatus::Running);
        self.output.push_str(text);
    }

    pub(crate) fn complete(&mut self, status: JobStatus) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.completed_at = Some(Utc::now());
    }

    pub fn summary(&self, include_output: bool) -> JobSummary {
        let output = match self.status {
            JobStatus::Finished | JobStatus::Error if include_output => Some(self.output.clone()),
            _ => None,
        };
        JobSummary {
            index: self.index,
            script: self.script.clone(),
            job_id: self
                .job_id
                .and_then(|id| i64::try_from(id).ok())
                .unwrap_or(REJECTED_JOB_ID),
            status: self.status,
            submitted_at_ms: self.submitted_at.timestamp_millis(),
            completed_at_ms: self.completed_at.map(|t| t.timestamp_millis()),
            output,
        }
    }
}

/// Read-only snapshot of a job, as reported by `Tracker::results`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub index: usize,
    pub script: String,
    pub job_id: i64,
    pub status: JobStatus,
    pub submitted_at_ms: i64,
    pub completed_at_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl std::fmt::Display for JobSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Job index {} script {} job id {} status {}",
            self.index, self.script, self.job_id, self.status
        )?;
        if let Some(ref output) = self.output {
            write!(f, "\n  Output: {}", output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(job_id: Option<u64>) -> Job {
        Job::new(
            3,
            "hostname.sge".to_string(),
            job_id,
            PathBuf::from("output_3"),
            PathBuf::from("error_3"),
        )
    }

    #[test]
    fn accepted_job_starts_running() {
        let job = job(Some(4711));
        assert_eq!(job.status(), JobStatus::Running);
        assert!(!job.is_terminal());
        assert!(job.output().is_empty());
        assert!(job.completed_at().is_none());
    }

    #[test]
    fn rejected_job_starts_failed() {
        let job = job(None);
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.is_terminal());
        assert_eq!(job.completed_at(), Some(job.submitted_at));
    }

    #[test]
    fn summary_renders_rejected_id_as_sentinel() {
        let summary = job(None).summary(true);
        assert_eq!(summary.job_id, REJECTED_JOB_ID);
        assert_eq!(summary.status, JobStatus::Failed);
        assert!(summary.output.is_none());
        assert_eq!(
            summary.to_string(),
            "Job index 3 script hostname.sge job id -1 status FAILED"
        );
    }

    #[test]
    fn summary_includes_output_only_when_finished() {
        let mut job = job(Some(10));
        assert!(job.summary(true).output.is_none());

        job.capture("node07\n");
        job.complete(JobStatus::Finished);

        let summary = job.summary(true);
        assert_eq!(summary.output.as_deref(), Some("node07\n"));
        assert_eq!(
            summary.to_string(),
            "Job index 3 script hostname.sge job id 10 status FINISHED\n  Output: node07\n"
        );
        assert!(job.summary(false).output.is_none());
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&JobStatus::Finished).unwrap();
        assert_eq!(json, "\"FINISHED\"");
        assert!(JobStatus::Error.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }
}
