//! Captured result of one juju invocation

use crate::ClientError;

/// Output from a juju CLI command execution
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Command line as run, for diagnostics
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Create from std::process::Output
    pub fn from_output(command: impl Into<String>, output: std::process::Output) -> Self {
        Self {
            command: command.into(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            exit_code: output.status.code(),
        }
    }

    /// Assert command succeeded
    pub fn expect_success(self) -> Result<Self, ClientError> {
        if self.success {
            Ok(self)
        } else {
            Err(ClientError::CommandFailed {
                command: self.command,
                exit_code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(success: bool, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            command: "juju deploy ./charm".to_string(),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            success,
            exit_code: Some(if success { 0 } else { 1 }),
        }
    }

    #[test]
    fn test_expect_success_reports_stderr() {
        let err = output(false, "", "min-juju-version 99.9.9 not satisfied")
            .expect_success()
            .unwrap_err();
        match err {
            ClientError::CommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(command, "juju deploy ./charm");
                assert_eq!(exit_code, Some(1));
                assert!(stderr.contains("99.9.9"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
