use zipdrop_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    zipdrop_api::telemetry::init_telemetry(config.json_logs())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let router = zipdrop_api::setup::initialize_app(&config)?;

    zipdrop_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
