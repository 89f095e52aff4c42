#[tokio::main(flavor = "current_thread")]
async fn main() {
    use clap::Parser;
    use colored::Colorize;

    let cli = juju_assess::Cli::parse();
    let name = cli.command.name();

    // run with RUST_LOG="juju_assess=debug,juju_client=debug" to override -v/-q
    let result = match juju_assess::prepare(cli.command.args()) {
        Ok(_log_guard) => {
            let result = juju_assess::run(&cli.command).await;
            match &result {
                Ok(()) => tracing::info!(assessment = name, "Assessment passed."),
                Err(e) => tracing::error!(assessment = name, error = %e, "Assessment failed."),
            }
            result
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => eprintln!("{name} {}", "PASS".green()),
        Err(e) => {
            eprintln!("{name} {}: {e}", "FAIL".red());
            std::process::exit(e.exit_code());
        }
    }
}
