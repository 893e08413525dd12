use anyhow::anyhow;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Diagnostics go to stderr. Stdout is reserved for the banner and the
/// access log.
pub fn init(level: tracing::Level) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy("");
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!("Failed to initialize tracing: {error}"))?;
    Ok(())
}
