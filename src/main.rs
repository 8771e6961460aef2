use anyhow::Context;
use crisp::{Service, config::Args, logging, routes::resource::INFO};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 先解析参数，.env 中的 RUST_LOG 才能生效
    let args = Args::load();
    logging::init_logging();

    let save_to = args.save_config.clone();
    let config = args
        .into_config()
        .await
        .context("Failed to load configuration")?;

    if let Some(path) = save_to {
        config
            .save(&path)
            .await
            .with_context(|| format!("Failed to save configuration to {}", path.display()))?;
        tracing::info!("Saved configuration to {}", path.display());
    }

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    tracing::info!("{}", INFO);
    Service::new(config)
        .run()
        .await
        .context("Service terminated")?;

    Ok(())
}
