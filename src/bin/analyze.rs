//! One-shot analysis run: fetch prices, score the universe, persist and
//! export. Intended for cron jobs.

use std::sync::Arc;

use dotenvy::dotenv;
use equiscan::config::{self, AnalysisConfig};
use equiscan::db::AnalysisStore;
use equiscan::jobs::{AnalysisContext, AnalysisPipeline};
use equiscan::logging;
use equiscan::services::YahooProvider;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let analysis_config = AnalysisConfig::from_env()?;
    let provider = YahooProvider::new(&config::get_yahoo_base_url(), &analysis_config.ticker_suffix)?
        .with_concurrency(analysis_config.fetch_concurrency);

    let mut context = AnalysisContext::new(Arc::new(provider), analysis_config);
    match config::get_database_url() {
        Some(url) => context = context.with_store(Arc::new(AnalysisStore::connect(&url).await?)),
        None => warn!("DATABASE_URL not set, results will not be persisted"),
    }

    let report = AnalysisPipeline::new(Arc::new(context)).run().await?;
    info!(
        run_id = ?report.run_id,
        evaluated = report.evaluated,
        excluded = report.exclusions.len(),
        "analysis complete"
    );
    if let Some(paths) = &report.snapshot {
        info!(results = %paths.results.display(), ranked = %paths.ranked.display(), "snapshots written");
    }
    Ok(())
}
