//! Scoped bootstrap/teardown around an assessment

use crate::{ClientError, Controller};
use std::path::{Path, PathBuf};

/// Extra arguments for `juju bootstrap`
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    pub region: Option<String>,
    pub series: Option<String>,
    pub agent_url: Option<String>,
    pub agent_stream: Option<String>,
    pub upload_tools: bool,
}

/// Owns the controller for the lifetime of one assessment run
pub struct BootstrapManager<C> {
    client: C,
    options: BootstrapOptions,
    log_dir: Option<PathBuf>,
    keep_env: bool,
}

impl<C: Controller> BootstrapManager<C> {
    pub fn new(client: C, options: BootstrapOptions) -> Self {
        Self {
            client,
            options,
            log_dir: None,
            keep_env: false,
        }
    }

    /// Save `juju debug-log` here before tearing down
    pub fn log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Leave the controller running after the assessment
    pub fn keep_env(mut self, keep_env: bool) -> Self {
        self.keep_env = keep_env;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Bootstrap, run `body`, then tear down whatever happened.
    ///
    /// Teardown also runs when bootstrap itself fails part way. When both
    /// the body and the teardown fail, the body's error is returned and the
    /// teardown error is logged.
    pub async fn booted_context<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: AsyncFnOnce(&C) -> Result<T, E>,
        E: From<ClientError> + std::fmt::Display,
    {
        let result = match self.client.bootstrap(&self.options).await {
            Ok(()) => body(&self.client).await,
            Err(e) => {
                tracing::error!(error = %e, "Bootstrap failed.");
                Err(e.into())
            }
        };

        match (result, self.tear_down().await) {
            (Ok(v), Ok(())) => Ok(v),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(teardown)) => {
                tracing::error!(error = %teardown, assessment_error = %e, "Teardown failed after assessment failure.");
                Err(e)
            }
        }
    }

    async fn tear_down(&self) -> Result<(), ClientError> {
        self.dump_logs().await;
        if self.keep_env {
            tracing::info!(model = %self.client.model_name(), "--keep-env passed, leaving environment up.");
            return Ok(());
        }
        self.client.destroy_environment().await
    }

    // Log collection never fails the run.
    async fn dump_logs(&self) {
        let Some(dir) = &self.log_dir else {
            return;
        };

        let log = match self.client.debug_log().await {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch debug-log.");
                return;
            }
        };

        let path = dir.join("debug-log.txt");
        if let Err(e) = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, log)) {
            tracing::warn!(error = %e, path = ?path, "Could not save debug-log.");
        } else {
            tracing::info!(path = ?path, "Saved debug-log.");
        }
    }
}
