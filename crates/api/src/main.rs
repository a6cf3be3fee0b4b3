use anyhow::Context;

use paygate_api::config::ApiConfig;
use paygate_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            paygate_observability::init(LogFormat::Json);
            tracing::error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };

    paygate_observability::init(config.log_format);

    let app = paygate_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
