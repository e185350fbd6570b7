//! Briefly News API — Binary Entrypoint
//! Loads config, connects the store, and serves the router either locally
//! or under the Lambda runtime.

use briefly_news::{api, bootstrap, config::AppConfig, metrics::Metrics, runtime};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "briefly_news=info,tower_http=info,warn";

/// Compact human-readable logs locally; JSON lines without ANSI under
/// Lambda so CloudWatch keeps one event per line.
fn init_tracing(lambda: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    if lambda {
        registry
            .with(fmt::layer().json().with_ansi(false).without_time())
            .init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    let lambda = runtime::is_lambda();
    init_tracing(lambda);

    let cfg = AppConfig::load()?;
    let state = bootstrap::init_state(&cfg).await?;

    let mut router = api::router(state);
    if cfg.metrics {
        let metrics = Metrics::install()?;
        router = router.merge(metrics.router());
    }

    if lambda {
        runtime::serve_lambda(router).await
    } else {
        runtime::serve_local(router, cfg.port).await
    }
}
