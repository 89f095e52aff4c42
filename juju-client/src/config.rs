use std::path::PathBuf;
use std::time::Duration;

/// Knobs shared by every juju invocation an assessment makes
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Pass `--debug` to juju
    pub debug: bool,
    /// Value for `JUJU_DATA`; inherit the caller's when `None`
    pub juju_data: Option<PathBuf>,
    /// Upper bound for ordinary commands (deploy, status, ssh-keys, ...)
    pub command_timeout: Duration,
    /// Upper bound for `juju bootstrap` and `juju kill-controller`
    pub bootstrap_timeout: Duration,
    /// How long `wait_for_started` keeps polling status
    pub start_timeout: Duration,
    /// Delay between status polls
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            debug: false,
            juju_data: None,
            command_timeout: Duration::from_secs(600),
            bootstrap_timeout: Duration::from_secs(1800),
            start_timeout: Duration::from_secs(1200),
            poll_interval: Duration::from_secs(5),
        }
    }
}
