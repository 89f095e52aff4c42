/// Argument parsing for the juju-assess binary

use clap::Parser;
use juju_assess::{Cli, Command};
use std::path::PathBuf;
use std::time::Duration;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("juju-assess").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn test_common_args() {
    let cli = parse(&["ssh-keys", "an-env", "/bin/juju", "/tmp/logs", "an-env-mod"]);
    assert!(matches!(cli.command, Command::SshKeys(_)));

    let args = cli.command.args();
    assert_eq!(args.env, "an-env");
    assert_eq!(args.juju_bin, PathBuf::from("/bin/juju"));
    assert_eq!(args.logs, PathBuf::from("/tmp/logs"));
    assert_eq!(args.temp_env_name, "an-env-mod");
    assert!(!args.debug);
    assert!(!args.keep_env);
    assert_eq!(args.log_filter(), "info");
}

#[test]
fn test_verbose_means_debug_logging() {
    let cli = parse(&["min-version", "an-env", "/bin/juju", "/tmp/logs", "an-env-mod", "--verbose"]);
    assert!(matches!(cli.command, Command::MinVersion(_)));
    let args = cli.command.args();
    assert_eq!(args.log_filter(), "debug");
    assert!(!args.client_config().debug);
}

#[test]
fn test_debug_is_passed_to_juju() {
    let cli = parse(&["min-version", "an-env", "/bin/juju", "/tmp/logs", "an-env-mod", "--debug"]);
    let args = cli.command.args();
    assert!(args.debug);
    assert!(args.client_config().debug);
    assert_eq!(args.log_filter(), "info");
}

#[test]
fn test_bootstrap_flags() {
    let cli = parse(&[
        "min-version",
        "an-env",
        "/bin/juju",
        "/tmp/logs",
        "an-env-mod",
        "--upload-tools",
        "--series",
        "xenial",
        "--agent-stream",
        "devel",
        "--region",
        "us-east-1",
        "--keep-env",
        "--start-timeout",
        "60",
    ]);
    let args = cli.command.args();
    let options = args.bootstrap_options();
    assert!(options.upload_tools);
    assert_eq!(options.series.as_deref(), Some("xenial"));
    assert_eq!(options.agent_stream.as_deref(), Some("devel"));
    assert_eq!(options.region.as_deref(), Some("us-east-1"));
    assert_eq!(options.agent_url, None);
    assert!(args.keep_env);
    assert_eq!(args.client_config().start_timeout, Duration::from_secs(60));
}

#[test]
fn test_missing_positional_args() {
    assert!(Cli::try_parse_from(["juju-assess", "ssh-keys", "an-env"]).is_err());
    assert!(Cli::try_parse_from(["juju-assess"]).is_err());
}

#[test]
fn test_help() {
    let err = Cli::try_parse_from(["juju-assess", "--help"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    assert!(err.to_string().contains("ssh key"), "{err}");
}

#[test]
fn test_prepare_creates_log_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let logs = tmp.path().join("logs").join("run-1");
    let logs_arg = logs.to_string_lossy().into_owned();
    let cli = parse(&["ssh-keys", "an-env", "/bin/juju", &logs_arg, "an-env-mod"]);

    let _guard = juju_assess::prepare(cli.command.args()).unwrap();
    assert!(logs.is_dir());
}

#[test]
fn test_setup_failure_has_its_own_exit_code() {
    let tmp = tempfile::tempdir().unwrap();
    let not_a_dir = tmp.path().join("logs");
    std::fs::write(&not_a_dir, "").unwrap();
    let logs_arg = not_a_dir.join("run-1").to_string_lossy().into_owned();
    let cli = parse(&["ssh-keys", "an-env", "/bin/juju", &logs_arg, "an-env-mod"]);

    let err = juju_assess::prepare(cli.command.args()).unwrap_err();
    assert!(matches!(err, juju_assess::AssessError::Setup(_)), "{err:?}");
    assert_eq!(err.exit_code(), 5);
    assert!(err.to_string().contains("could not create log directory"), "{err}");
}
