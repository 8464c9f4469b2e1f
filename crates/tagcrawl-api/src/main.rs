use tagcrawl_core::Config;

// Use mimalloc as the global allocator for lower fragmentation under musl containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let app = tagcrawl_api::setup::initialize_app(config.clone()).await?;

    tagcrawl_api::setup::server::start_server(&config, app.router).await?;

    if let Some(consumer) = app.queue_consumer {
        consumer.shutdown().await;
    }

    Ok(())
}
