use dotenvy::dotenv;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use textgen_gateway::api;
use textgen_gateway::config::{Command, Config};
use textgen_gateway::model::{cloud::CloudBackend, ollama::OllamaBackend, ChatBackend};
use textgen_gateway::router::RequestRouter;
use tracing_subscriber::{fmt, EnvFilter};

fn build_router(cfg: &Config) -> anyhow::Result<RequestRouter> {
    let client = cfg.http_client()?;
    let local = Arc::new(OllamaBackend::new(client.clone(), cfg.local_url.clone()));
    let cloud = cfg.cloud_api_key().map(|key| {
        Arc::new(CloudBackend::new(client, cfg.cloud_url.clone(), key)) as Arc<dyn ChatBackend>
    });
    if cloud.is_none() {
        tracing::warn!("OLLAMA_API_KEY not set; cloud models will be refused");
    }
    Ok(RequestRouter::new(local, cloud, cfg.default_model.clone()))
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = <Config as clap::Parser>::parse();

    // logs
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let router = Arc::new(build_router(&cfg)?);

    if let Some(Command::Ask { prompt, model }) = &cfg.command {
        println!("{}", router.generate_text(prompt, model.as_deref()).await);
        return Ok(());
    }

    if let Some(metrics_addr) = &cfg.metrics_addr {
        let metrics_addr: SocketAddr = metrics_addr.parse()?;
        PrometheusBuilder::new().with_http_listener(metrics_addr).install()?;
        tracing::info!(%metrics_addr, "metrics exporter listening");
    }

    let app = api::routes(router.clone());
    let addr: SocketAddr = cfg.bind_addr.parse()?;

    tracing::info!(
        %addr,
        local_url = %cfg.local_url,
        default_model = %router.default_model(),
        cloud = router.cloud_configured(),
        "listening"
    );
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}
