use anyhow::Result;
use clap::Parser;
use shop_cart_cli::{cli::{Args, CliApp}, utils::Config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_env()?;

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("🛒 Shop cart starting...");
    tracing::info!(
        "Configuration loaded for {} environment",
        config.environment
    );

    let app = CliApp::new(config)?;
    app.run(args).map_err(|e| {
        tracing::error!("Shop cart stopped with error: {}", e);
        e
    })?;

    tracing::info!("🛒 Shop cart stopped");
    Ok(())
}
