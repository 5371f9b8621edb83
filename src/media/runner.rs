use super::command::ToolCommand;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run with inherited stdio and report whether the tool exited zero.
    async fn run(&self, command: &ToolCommand) -> Result<bool>;

    /// Run with captured stdout/stderr.
    async fn capture(&self, command: &ToolCommand) -> Result<CapturedOutput>;
}

/// Launches the real binaries found on `PATH`.
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(command: &ToolCommand) -> Command {
        let mut process = Command::new(command.tool.binary());
        process.args(&command.args);
        if let Some(dir) = &command.working_dir {
            process.current_dir(dir);
        }
        process
    }
}

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand) -> Result<bool> {
        info!("Running command: {}", command);

        let status = Self::command(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("Failed to start {}", command.tool.binary()))?;

        info!("{} exited with {}", command.tool.binary(), status);
        Ok(status.success())
    }

    async fn capture(&self, command: &ToolCommand) -> Result<CapturedOutput> {
        info!("Running command: {}", command);

        let output = Self::command(command)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to start {}", command.tool.binary()))?;

        debug!(
            "{} exited with {} ({} bytes of output)",
            command.tool.binary(),
            output.status,
            output.stdout.len()
        );

        Ok(CapturedOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::command::Tool;

    #[tokio::test]
    #[ignore = "Requires yt-dlp installed"]
    async fn test_capture_version() {
        let command = ToolCommand::new(Tool::YtDlp).arg("--version");
        let output = SystemRunner::new().capture(&command).await.unwrap();
        assert!(output.success);
        assert!(!output.stdout.trim().is_empty());
    }

    #[test]
    fn test_working_dir_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let command = ToolCommand::new(Tool::Mpv).current_dir(dir.path());
        let process = SystemRunner::command(&command);
        assert_eq!(process.as_std().get_current_dir(), Some(dir.path()));
    }
}
