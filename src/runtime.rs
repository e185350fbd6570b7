// src/runtime.rs
//! Hosting: a plain HTTP listener locally, the Lambda runtime when deployed
//! behind a function URL or API Gateway.

use std::net::SocketAddr;

use anyhow::{anyhow, Context};
use axum::Router;
use tracing::info;

/// Set by the Lambda execution environment.
pub const ENV_LAMBDA_RUNTIME_API: &str = "AWS_LAMBDA_RUNTIME_API";

pub fn is_lambda() -> bool {
    std::env::var(ENV_LAMBDA_RUNTIME_API)
        .ok()
        .is_some_and(|v| !v.trim().is_empty())
}

/// Hand the router to the Lambda runtime, which translates each invocation
/// event into an HTTP request and the response back into the event reply.
pub async fn serve_lambda(router: Router) -> anyhow::Result<()> {
    info!("starting Lambda runtime");
    lambda_http::run(router)
        .await
        .map_err(|e| anyhow!("lambda runtime: {e}"))
}

pub async fn serve_local(router: Router, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "server listening on http://localhost:{port}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
