use smarthost_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage, services, routes)
    let (_state, router) = smarthost_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    smarthost_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
