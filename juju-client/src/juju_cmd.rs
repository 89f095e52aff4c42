//! Fluent juju command builder

use crate::{ClientConfig, ClientError, CommandOutput};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fluent builder for juju commands
#[derive(Debug, Clone)]
pub struct JujuCommand {
    binary_path: PathBuf,
    model: Option<String>,
    debug: bool,
    juju_data: Option<PathBuf>,
    timeout: Duration,
}

impl JujuCommand {
    /// Create new juju command builder for the given binary
    pub fn new<P: AsRef<Path>>(binary_path: P) -> Self {
        Self {
            binary_path: binary_path.as_ref().to_path_buf(),
            model: None,
            debug: false,
            juju_data: None,
            timeout: Duration::from_secs(600),
        }
    }

    /// Create a builder carrying the shared client settings
    pub fn from_config<P: AsRef<Path>>(binary_path: P, config: &ClientConfig) -> Self {
        let cmd = Self::new(binary_path)
            .debug(config.debug)
            .timeout(config.command_timeout);
        match &config.juju_data {
            Some(data) => cmd.juju_data(data),
            None => cmd,
        }
    }

    /// Target model, passed as `-m <model>` after the sub-command
    pub fn model<S: AsRef<str>>(mut self, model: S) -> Self {
        self.model = Some(model.as_ref().to_string());
        self
    }

    /// Pass the global `--debug` flag
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set JUJU_DATA directory
    pub fn juju_data<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.juju_data = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set timeout for command execution
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute `juju --version`
    pub async fn version(self) -> Result<CommandOutput, ClientError> {
        self.execute_args(["--version"]).await
    }

    /// Execute `juju status --format json`
    pub async fn status_json(self) -> Result<CommandOutput, ClientError> {
        self.execute("status", ["--format", "json"]).await
    }

    /// Execute `juju deploy <charm> <service>`
    pub async fn deploy(self, charm: &Path, service: &str) -> Result<CommandOutput, ClientError> {
        let charm = charm.to_string_lossy().into_owned();
        self.execute("deploy", [charm.as_str(), service]).await
    }

    /// Execute `juju debug-log --replay --no-tail`
    pub async fn debug_log(self) -> Result<CommandOutput, ClientError> {
        self.execute("debug-log", ["--replay", "--no-tail"]).await
    }

    /// Run a juju sub-command; model and debug flags are inserted for it
    pub async fn execute<I, S>(self, command: &str, args: I) -> Result<CommandOutput, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut full_args = Vec::new();
        if self.debug {
            full_args.push("--debug".to_string());
        }
        full_args.push(command.to_string());
        if let Some(model) = &self.model {
            full_args.push("-m".to_string());
            full_args.push(model.clone());
        }
        full_args.extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self.execute_args(full_args).await
    }

    /// Execute arbitrary juju command with custom args
    pub async fn execute_args<I, S>(self, args: I) -> Result<CommandOutput, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let command_line = self.command_line(&args);

        let mut cmd = tokio::process::Command::new(&self.binary_path);

        if let Some(data) = &self.juju_data {
            cmd.env("JUJU_DATA", data);
        }

        cmd.args(&args);
        cmd.kill_on_drop(true);

        tracing::debug!(command = %command_line, timeout = ?self.timeout, "Running juju.");

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                return Err(ClientError::Timeout {
                    command: command_line,
                    timeout: self.timeout,
                });
            }
            Ok(Err(source)) => {
                return Err(ClientError::Spawn {
                    binary: self.binary_path.display().to_string(),
                    source,
                });
            }
            Ok(Ok(output)) => output,
        };

        let output = CommandOutput::from_output(command_line, output);
        tracing::debug!(
            command = %output.command,
            exit_code = ?output.exit_code,
            "juju finished."
        );
        Ok(output)
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.binary_path.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
