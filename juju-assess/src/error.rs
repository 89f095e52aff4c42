use crate::min_version::Expectation;
use crate::ssh_keys::ParseError;
use juju_client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    /// juju printed something we could not make sense of
    #[error("unparseable juju output: {0}")]
    Parse(#[from] ParseError),

    /// The version gate accepted or rejected the wrong charm
    #[error("{assertion} failed min: {version} cur: {current}: {reason}")]
    PolicyViolation {
        assertion: Expectation,
        version: String,
        current: String,
        reason: String,
    },

    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("could not generate ssh key: {0}")]
    KeyGeneration(#[from] ssh_key::Error),

    /// Logging could not be configured or the log directory created
    #[error("setup failed: {0:#}")]
    Setup(eyre::Report),

    /// juju could not be run, or failed where failure was not the answer
    #[error(transparent)]
    Transport(#[from] ClientError),
}

impl AssessError {
    /// Process exit code, so a CI harness can tell a misbehaving controller
    /// (1) from an unreachable one (2) or a run that never got going (5)
    pub fn exit_code(&self) -> i32 {
        match self {
            AssessError::PolicyViolation { .. } | AssessError::Assertion(_) => 1,
            AssessError::Transport(_) => 2,
            AssessError::Parse(_) => 3,
            AssessError::KeyGeneration(_) => 4,
            AssessError::Setup(_) => 5,
        }
    }
}
