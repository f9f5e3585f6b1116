use std::path::PathBuf;
use std::time::Duration;

/// How a non-empty error stream affects a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorStreamPolicy {
    /// Prepend error text to the output; the job still ends `Finished`.
    #[default]
    MergeOnly,
    /// Prepend error text to the output and mark the job `Error`.
    Escalate,
}

/// Configuration for the external submission command.
///
/// The command is invoked as `<command> <extra_args...> -o <output> -e <error> <script>`.
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    /// Submission executable (looked up on `PATH` when not absolute)
    pub command: String,
    /// Arguments placed before the output/error flags (e.g. `-cwd`, `-q all.q`)
    pub extra_args: Vec<String>,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            command: "qsub".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl SubmitConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Directory the queue writes job output/error files into
    pub work_dir: PathBuf,
    pub output_prefix: String,
    pub error_prefix: String,
    /// Delay between two polling cycles in `wait`
    pub poll_interval: Duration,
    pub error_policy: ErrorStreamPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            output_prefix: "output_".to_string(),
            error_prefix: "error_".to_string(),
            poll_interval: Duration::from_secs(1),
            error_policy: ErrorStreamPolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorStreamPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Output file path for the job with the given index
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.work_dir.join(format!("{}{}", self.output_prefix, index))
    }

    /// Error file path for the job with the given index
    pub fn error_path(&self, index: usize) -> PathBuf {
        self.work_dir.join(format!("{}{}", self.error_prefix, index))
    }
}
