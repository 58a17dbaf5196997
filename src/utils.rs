/// Installs a formatted `tracing` subscriber configured through `RUST_LOG`.
///
/// Fails when a global subscriber has already been installed.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|error| anyhow::anyhow!(error))
}
