use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use libsched::catalog;
use libsched::clock::{Clock, SystemClock};
use libsched::config::Config;
use libsched::engine::Engine;
use libsched::notify::NotifyHub;
use libsched::sweeper::Sweeper;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    libsched::observability::init(config.metrics_port)?;

    let clock = match config.mock_time {
        Some(at) => SystemClock::starting_at(at),
        None => SystemClock::new(),
    };
    let mocked = clock.is_mocked();
    let notify = Arc::new(NotifyHub::new());
    let engine = Arc::new(Engine::new(
        config.catalog,
        config.policy,
        Arc::new(clock),
        notify.clone(),
    ));

    if config.seed_demo {
        for resource in catalog::demo_resources() {
            engine.insert_resource(resource).await?;
        }
        for user in catalog::demo_users() {
            engine.register_user(user);
        }
    }

    let now = engine.clock().now();
    info!(
        "libsched started at {}{}",
        now.format("%Y-%m-%d %H:%M:%S"),
        if mocked { " (mock time)" } else { "" }
    );
    info!("  slots: {}", engine.catalog().len());
    info!("  grace period: {}s", engine.policy().grace_period.num_seconds());
    info!("  daily limit: {}", engine.policy().daily_limit);
    info!("  sweep interval: {:?}", config.sweep_interval);
    info!("  metrics: {}", config.metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    // Change feed for whatever presentation layer is attached.
    let mut events = notify.subscribe_all();
    let feed = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => tracing::debug!("event: {json}"),
                Err(e) => tracing::warn!("unserializable event: {e}"),
            }
        }
    });

    let sweeper = Sweeper::start(engine.clone(), config.sweep_interval).await;

    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to register SIGTERM handler: {e}");
                    ctrl_c.await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    shutdown.await;
    info!("shutdown signal received");

    sweeper.shutdown().await;
    feed.abort();

    info!("libsched stopped");
    Ok(())
}
