//! Equiscan API Server
//!
//! Serves ranked analysis results, triggers analysis runs on demand and,
//! when `ANALYSIS_SCHEDULE` is set, on a cron schedule.

use std::sync::Arc;

use dotenvy::dotenv;
use equiscan::config::{self, AnalysisConfig};
use equiscan::core::http::{start_server, AppState};
use equiscan::core::scheduler::AnalysisScheduler;
use equiscan::db::AnalysisStore;
use equiscan::jobs::{AnalysisContext, AnalysisPipeline};
use equiscan::logging;
use equiscan::metrics::Metrics;
use equiscan::services::YahooProvider;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let port = config::get_port()?;
    let analysis_config = AnalysisConfig::from_env()?;
    info!(environment = %config::get_environment(), port, "starting Equiscan API server");

    let metrics = Arc::new(Metrics::new()?);

    // The API still serves health and metrics without a database.
    let store = match config::get_database_url() {
        Some(url) => match AnalysisStore::connect(&url).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "database unavailable, result endpoints disabled");
                None
            }
        },
        None => {
            warn!("DATABASE_URL not set, result endpoints disabled");
            None
        }
    };

    let provider = YahooProvider::new(&config::get_yahoo_base_url(), &analysis_config.ticker_suffix)?
        .with_concurrency(analysis_config.fetch_concurrency);
    let exchange_offset = analysis_config.as_of.exchange_offset;
    let mut context = AnalysisContext::new(Arc::new(provider), analysis_config)
        .with_metrics(metrics.clone());
    if let Some(store) = &store {
        context = context.with_store(store.clone());
    }
    let pipeline = Arc::new(AnalysisPipeline::new(Arc::new(context)));

    let scheduler = match config::get_analysis_schedule() {
        Some(expression) => {
            let scheduler = AnalysisScheduler::new(pipeline.clone(), &expression, exchange_offset)?;
            scheduler.start().await;
            Some(scheduler)
        }
        None => None,
    };

    let mut state = AppState::new(metrics).with_pipeline(pipeline);
    if let Some(store) = store {
        state = state.with_store(store);
    }

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("shutting down API server");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }
    Ok(())
}
