mod api;
mod collection;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use yuqing_nlp::LexiconAnalyzer;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    collection::TaskCollector,
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(yuqing_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = yuqing_db::connect_pool_from_config(&config).await?;
    let applied = yuqing_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    // Loading the segmentation dictionary is slow; do it once and share.
    let analyzer = Arc::new(LexiconAnalyzer::default());
    let collector = TaskCollector::from_config(pool.clone(), &config, Arc::clone(&analyzer))?;

    let mut scheduler =
        scheduler::build_scheduler(pool.clone(), collector.clone(), &config.collect_schedule)
            .await?;

    let auth = AuthState::from_env(config.env.is_development())?;
    let state = AppState {
        pool,
        analyzer,
        collector: collector.clone(),
    };
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    collector.cancel();
    scheduler.shutdown().await?;
    collector.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
