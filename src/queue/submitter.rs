use std::future::Future;
use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::SubmitConfig;

/// Submits a script to the batch queue.
///
/// `Ok` carries the submission command's stdout whatever its exit status was; whether the
/// queue accepted the job is decided by the tracker from that text. `Err` means the command
/// could not be run at all.
pub trait Submitter {
    fn submit(
        &self,
        script: &str,
        output: &Path,
        error: &Path,
    ) -> impl Future<Output = io::Result<String>> + Send;

    /// Name used in error reports
    fn command(&self) -> &str;
}

/// Runs `qsub` (or a compatible command) as a child process
#[derive(Debug, Clone, Default)]
pub struct QsubSubmitter {
    config: SubmitConfig,
}

impl QsubSubmitter {
    pub fn new(config: SubmitConfig) -> Self {
        Self { config }
    }

    fn args(&self, script: &str, output: &Path, error: &Path) -> Vec<String> {
        let mut args = self.config.extra_args.clone();
        args.push("-o".to_string());
        args.push(output.display().to_string());
        args.push("-e".to_string());
        args.push(error.display().to_string());
        args.push(script.to_string());
        args
    }
}

impl Submitter for QsubSubmitter {
    fn submit(
        &self,
        script: &str,
        output: &Path,
        error: &Path,
    ) -> impl Future<Output = io::Result<String>> + Send {
        let args = self.args(script, output, error);
        let command = self.config.command.clone();

        async move {
            tracing::debug!(command = %command, args = ?args, "Running submission command");

            let result = Command::new(&command)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await?;

            if !result.status.success() {
                tracing::warn!(
                    command = %command,
                    exit_code = ?result.status.code(),
                    stderr = %String::from_utf8_lossy(&result.stderr).trim(),
                    "Submission command exited with failure"
                );
            }

            Ok(String::from_utf8_lossy(&result.stdout).into_owned())
        }
    }

    fn command(&self) -> &str {
        &self.config.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_place_paths_before_script() {
        let submitter = QsubSubmitter::new(SubmitConfig::default().with_arg("-cwd"));
        let args = submitter.args("job.sge", Path::new("out_0"), Path::new("err_0"));
        assert_eq!(args, vec!["-cwd", "-o", "out_0", "-e", "err_0", "job.sge"]);
        assert_eq!(submitter.command(), "qsub");
    }
}
