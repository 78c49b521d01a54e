mod categories;
mod config;
mod errors;
mod media;
mod orchestrator;
mod prompt;
mod providers;
mod server;
mod util;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    errors::Result, orchestrator::RequestAdapter, providers::GeminiClient, util::LocalTimer,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;
    if config.gemini.api_key.is_empty() {
        warn!(
            target: "config",
            "未配置 Gemini API Key (GEMINI_API_KEY / API_KEY / gemini.api_key)，生成请求将被后端拒绝"
        );
    }

    info!(
        target: "config",
        text_model = %config.gemini.text_model,
        image_model = %config.gemini.image_model,
        "Gemini 后端已配置"
    );

    let backend = GeminiClient::new(&config.gemini)?;
    let adapter = Arc::new(RequestAdapter::new(backend));
    let bind_addr = config.server.bind_addr;

    let mut server_task = tokio::spawn(async move {
        if let Err(err) = server::run_server(bind_addr, adapter).await {
            error!(target: "server", error = ?err, "HTTP 服务异常退出");
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!(target: "server", "收到退出信号，准备关闭");
        }
        _ = &mut server_task => {}
    }

    server_task.abort();

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_timer(LocalTimer)
        .init();

    info!("tracing initialized");
}
