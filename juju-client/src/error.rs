use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` did not finish within {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("`{command}` failed with exit code {exit_code:?}\nstderr: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("could not decode status output: {0}")]
    Status(#[from] serde_json::Error),

    #[error("{agent} is in error state: {message}")]
    ErrorState { agent: String, message: String },

    #[error("charm metadata: {0}")]
    Charm(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
