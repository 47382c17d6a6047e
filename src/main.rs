use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use demo_generator::bootstrap::build_state;
use demo_generator::config::AppConfig;
use demo_generator::routes::app;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed
    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::fmt().with_env_filter(filter).finish(),
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing();

    let state = build_state(&config)
        .await
        .context("failed to initialise application state")?;

    let routes = app(state, &config.cors_origins);

    info!(addr = %config.bind_address, "starting server");
    warp::serve(routes).run(config.bind_address).await;
    Ok(())
}
