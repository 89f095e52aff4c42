use clap_verbosity_flag::{InfoLevel, Verbosity};
use juju_client::{BootstrapManager, BootstrapOptions, ClientConfig, JujuClient};
use std::path::PathBuf;
use std::time::Duration;

#[derive(clap::Parser, Debug)]
#[command(version, about = "Functional assessments for juju controllers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    #[clap(about = "Check that deploys honour the charm's min-juju-version")]
    MinVersion(TestingArgs),
    #[clap(about = "Check ssh key listing and propagation for a model")]
    SshKeys(TestingArgs),
}

impl Command {
    pub fn args(&self) -> &TestingArgs {
        match self {
            Command::MinVersion(args) | Command::SshKeys(args) => args,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::MinVersion(_) => "min-version",
            Command::SshKeys(_) => "ssh-keys",
        }
    }
}

/// Arguments every assessment takes
#[derive(clap::Args, Debug)]
pub struct TestingArgs {
    #[arg(help = "The juju environment (cloud) to bootstrap.")]
    pub env: String,
    #[arg(help = "Full path to the juju binary.")]
    pub juju_bin: PathBuf,
    #[arg(help = "A directory in which to store logs.")]
    pub logs: PathBuf,
    #[arg(help = "A temporary name for the controller and its model.")]
    pub temp_env_name: String,

    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    #[arg(long, help = "Pass --debug to juju.")]
    pub debug: bool,
    #[arg(long, help = "Upload local tools instead of fetching them.")]
    pub upload_tools: bool,
    #[arg(long, help = "Series to bootstrap the controller on.")]
    pub series: Option<String>,
    #[arg(long, help = "URL to use for retrieving agent binaries.")]
    pub agent_url: Option<String>,
    #[arg(long, help = "Stream to use for retrieving agent binaries.")]
    pub agent_stream: Option<String>,
    #[arg(long, help = "Override the cloud region.")]
    pub region: Option<String>,
    #[arg(long, help = "Keep the environment after the assessment.")]
    pub keep_env: bool,
    #[arg(long, env = "JUJU_DATA", help = "juju client data directory.")]
    pub juju_data: Option<PathBuf>,
    #[arg(
        long,
        env = "ASSESS_START_TIMEOUT",
        default_value_t = 1200,
        help = "Seconds to wait for deployed units to start."
    )]
    pub start_timeout: u64,
}

impl TestingArgs {
    /// Default tracing filter directive, from -v/-q
    pub fn log_filter(&self) -> String {
        self.verbose.log_level_filter().to_string().to_lowercase()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            debug: self.debug,
            juju_data: self.juju_data.clone(),
            start_timeout: Duration::from_secs(self.start_timeout),
            ..ClientConfig::default()
        }
    }

    pub fn bootstrap_options(&self) -> BootstrapOptions {
        BootstrapOptions {
            region: self.region.clone(),
            series: self.series.clone(),
            agent_url: self.agent_url.clone(),
            agent_stream: self.agent_stream.clone(),
            upload_tools: self.upload_tools,
        }
    }

    pub fn client(&self) -> JujuClient {
        JujuClient::new(&self.env, &self.juju_bin, &self.temp_env_name, self.client_config())
    }

    pub fn bootstrap_manager(&self) -> BootstrapManager<JujuClient> {
        BootstrapManager::new(self.client(), self.bootstrap_options())
            .log_dir(&self.logs)
            .keep_env(self.keep_env)
    }
}
