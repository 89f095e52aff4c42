use tracing_subscriber::EnvFilter;

/// Install the subscriber for the current thread and return its guard.
///
/// `RUST_LOG` wins over `default_level`. Run the assessment on the thread
/// that holds the guard (the binary uses a current-thread runtime).
pub fn configure_logging(default_level: &str) -> eyre::Result<tracing::subscriber::DefaultGuard> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    Ok(tracing::subscriber::set_default(subscriber))
}
