#![deny(unsafe_code)]

mod assess_ssh_keys;
pub mod cli;
mod error;
pub mod logging;
pub mod min_version;
pub mod ssh_keys;

pub use assess_ssh_keys::{
    assess_ssh_keys, check_provisioned_keys, generate_public_key, list_ssh_keys,
};
pub use cli::{Cli, Command, TestingArgs};
pub use error::AssessError;
pub use min_version::{
    Expectation, GATE_TABLE, GateCase, assert_fail, assert_pass, assess_deploy,
    assess_min_version, gate_cases, get_current_version,
};
pub use ssh_keys::{ParseError, SshKey, parse_ssh_keys_output};

use eyre::WrapErr;
use juju_client::JujuClient;
use tracing::subscriber::DefaultGuard;

/// Install logging and create the log directory.
///
/// Keep the returned guard alive for the whole run.
pub fn prepare(args: &TestingArgs) -> Result<DefaultGuard, AssessError> {
    let guard = logging::configure_logging(&args.log_filter()).map_err(AssessError::Setup)?;
    std::fs::create_dir_all(&args.logs)
        .wrap_err_with(|| format!("could not create log directory {:?}", args.logs))
        .map_err(AssessError::Setup)?;
    Ok(guard)
}

/// Bootstrap, run the chosen assessment, tear down
pub async fn run(command: &Command) -> Result<(), AssessError> {
    let args = command.args();
    let bs_manager = args.bootstrap_manager();
    tracing::info!(
        assessment = command.name(),
        env = %args.env,
        juju_bin = ?args.juju_bin,
        model = %args.temp_env_name,
        "Starting assessment."
    );

    match command {
        Command::MinVersion(_) => {
            bs_manager
                .booted_context(async |client: &JujuClient| assess_min_version(client).await)
                .await
        }
        Command::SshKeys(_) => {
            bs_manager
                .booted_context(async |client: &JujuClient| assess_ssh_keys(client).await)
                .await
        }
    }
}
