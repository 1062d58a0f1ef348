use std::sync::Arc;

use desk_server::providers::HttpProviders;
use desk_server::{AppState, Config, Providers, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        std::env::var("RUST_LOG").ok().as_deref(),
        config.log_dir.as_deref(),
    );

    tracing::info!(
        environment = %config.environment,
        hotel_api_url = %config.hotel_api_url,
        "Desk Server starting..."
    );

    // 2. 连接远程酒店 API
    let mut backend = HttpProviders::new(&config.hotel_api_url, config.request_timeout_ms);
    if let Some(token) = &config.hotel_api_token {
        backend = backend.with_token(token);
    }
    let providers = Providers::http(Arc::new(backend));

    // 3. 组装路由并启动 HTTP 服务
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(config, providers);
    let app = desk_server::api::router(state);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
