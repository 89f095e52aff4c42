//! The controller as assessments see it

use crate::status::Readiness;
use crate::{BootstrapOptions, ClientConfig, ClientError, CommandOutput, JujuCommand, Status};
use std::path::{Path, PathBuf};
use tokio::time::Instant;

/// What happened to a deploy request.
///
/// A rejection is an answer from the controller, not a transport problem, so
/// it is a value here. Failing to run juju at all is a `ClientError`.
#[derive(Debug, Clone)]
pub enum DeployOutcome {
    Deployed,
    Rejected(CommandOutput),
}

/// Operations assessments need from a juju controller
#[allow(async_fn_in_trait)]
pub trait Controller {
    /// Model the assessment runs in
    fn model_name(&self) -> &str;

    async fn bootstrap(&self, options: &BootstrapOptions) -> Result<(), ClientError>;

    async fn deploy(&self, charm: &Path, service: &str) -> Result<DeployOutcome, ClientError>;

    /// Block until every machine and unit agent is started
    async fn wait_for_started(&self) -> Result<(), ClientError>;

    /// Full `juju --version` report, e.g. `2.0-beta7-xenial-amd64`
    async fn get_version(&self) -> Result<String, ClientError>;

    /// Run a model-scoped sub-command and return its stdout
    async fn get_juju_output(&self, command: &str, args: &[&str]) -> Result<String, ClientError>;

    async fn debug_log(&self) -> Result<String, ClientError>;

    async fn destroy_environment(&self) -> Result<(), ClientError>;
}

/// Controller backed by a real juju binary
#[derive(Debug, Clone)]
pub struct JujuClient {
    env: String,
    binary_path: PathBuf,
    model: String,
    config: ClientConfig,
}

impl JujuClient {
    /// `env` is the cloud to bootstrap on; `model` doubles as the controller name
    pub fn new<P: AsRef<Path>>(env: &str, binary_path: P, model: &str, config: ClientConfig) -> Self {
        Self {
            env: env.to_string(),
            binary_path: binary_path.as_ref().to_path_buf(),
            model: model.to_string(),
            config,
        }
    }

    /// Command builder without a model, for controller-level commands
    pub fn juju_cmd(&self) -> JujuCommand {
        JujuCommand::from_config(&self.binary_path, &self.config)
    }

    /// Command builder scoped to this client's model
    pub fn model_cmd(&self) -> JujuCommand {
        self.juju_cmd().model(&self.model)
    }

    pub async fn status(&self) -> Result<Status, ClientError> {
        let output = self.model_cmd().status_json().await?.expect_success()?;
        Ok(Status::from_json(&output.stdout)?)
    }
}

impl Controller for JujuClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn bootstrap(&self, options: &BootstrapOptions) -> Result<(), ClientError> {
        let cloud = match &options.region {
            Some(region) => format!("{}/{region}", self.env),
            None => self.env.clone(),
        };
        let mut args = vec![cloud, self.model.clone(), "--default-model".to_string(), self.model.clone()];
        if options.upload_tools {
            args.push("--upload-tools".to_string());
        }
        if let Some(series) = &options.series {
            args.extend(["--bootstrap-series".to_string(), series.clone()]);
        }
        if let Some(url) = &options.agent_url {
            args.extend(["--config".to_string(), format!("agent-metadata-url={url}")]);
        }
        if let Some(stream) = &options.agent_stream {
            args.extend(["--config".to_string(), format!("agent-stream={stream}")]);
        }

        tracing::info!(env = %self.env, model = %self.model, "Bootstrapping.");
        self.juju_cmd()
            .timeout(self.config.bootstrap_timeout)
            .execute("bootstrap", args)
            .await?
            .expect_success()?;
        Ok(())
    }

    async fn deploy(&self, charm: &Path, service: &str) -> Result<DeployOutcome, ClientError> {
        let output = self.model_cmd().deploy(charm, service).await?;
        if output.success {
            tracing::info!(service, "Deployed.");
            Ok(DeployOutcome::Deployed)
        } else {
            tracing::info!(service, exit_code = ?output.exit_code, stderr = %output.stderr.trim(), "Deploy rejected.");
            Ok(DeployOutcome::Rejected(output))
        }
    }

    async fn wait_for_started(&self) -> Result<(), ClientError> {
        let deadline = Instant::now() + self.config.start_timeout;
        loop {
            match self.status().await?.readiness() {
                Readiness::Started => return Ok(()),
                Readiness::Failed { agent, message } => {
                    return Err(ClientError::ErrorState { agent, message });
                }
                Readiness::Pending(pending) => {
                    tracing::debug!(?pending, "Waiting for agents to start.");
                    if Instant::now() >= deadline {
                        return Err(ClientError::Timeout {
                            command: format!("wait_for_started ({} agents pending)", pending.len()),
                            timeout: self.config.start_timeout,
                        });
                    }
                }
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn get_version(&self) -> Result<String, ClientError> {
        let output = self.juju_cmd().version().await?.expect_success()?;
        Ok(output.stdout.trim().to_string())
    }

    async fn get_juju_output(&self, command: &str, args: &[&str]) -> Result<String, ClientError> {
        let output = self
            .model_cmd()
            .execute(command, args.iter().copied())
            .await?
            .expect_success()?;
        Ok(output.stdout)
    }

    async fn debug_log(&self) -> Result<String, ClientError> {
        let output = self.model_cmd().debug_log().await?.expect_success()?;
        Ok(output.stdout)
    }

    async fn destroy_environment(&self) -> Result<(), ClientError> {
        tracing::info!(controller = %self.model, "Destroying environment.");
        self.juju_cmd()
            .timeout(self.config.bootstrap_timeout)
            .execute("kill-controller", [self.model.as_str(), "-y"])
            .await?
            .expect_success()?;
        Ok(())
    }
}
