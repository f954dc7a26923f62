// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crane_operator::config::Config;
use crane_operator::kubernetes::wait_for_application_crd;
use crane_operator::reconcilers::ApplicationReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting crane operator");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, reconcile_timeout={:?}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.reconcile_timeout
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for Application CRD to become available...");
    wait_for_application_crd(&client).await?;

    // Cancelled on SIGINT so in-flight cycles stop instead of being waited on
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested, cancelling in-flight reconciles");
                shutdown.cancel();
            }
        }
    });

    info!("Starting application reconciler...");
    ApplicationReconciler::new(client, config, shutdown)
        .run()
        .await
}
