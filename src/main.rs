use agrifilter::config::{Cli, Config};
use agrifilter::handler::AppState;
use agrifilter::screening::KeywordSet;
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("agrifilter.svc starting");

    let mut cfg = Config::resolve(args.config_path.as_deref()).unwrap_or_else(|e| {
        tracing::error!(error = %agrifilter::unpack_error(e.as_ref()), "failed to load config file");
        std::process::exit(1);
    });
    if let Some(port) = args.port {
        cfg.app.set_port(port);
    }

    let keywords = KeywordSet::from_file(cfg.app.get_keywords_file()).unwrap_or_else(|e| {
        tracing::error!(error = %agrifilter::unpack_error(&e), "failed to load keywords");
        std::process::exit(1);
    });

    let app = agrifilter::app(AppState::new(keywords), cfg.app.max_upload_bytes());

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    let cancellation_token = CancellationToken::new();
    let shutdown_token = cancellation_token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl+c signal received, preparing to shutdown");
        }
        shutdown_token.cancel();
    });

    tracing::info!("agrifilter.svc running on {}", &address);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(cancellation_token.cancelled_owned())
        .await;

    if let Err(err) = served {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }

    tracing::info!("agrifilter.svc going off, graceful shutdown complete");
}
