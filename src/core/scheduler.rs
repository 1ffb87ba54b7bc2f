//! Cron-driven trigger for analysis runs.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use cron::Schedule;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::jobs::analysis::{AnalysisError, AnalysisPipeline};

#[derive(Debug, Error)]
#[error("invalid cron expression '{expression}': {reason}")]
pub struct ScheduleError {
    pub expression: String,
    pub reason: String,
}

/// Parse a cron expression (`sec min hour day month weekday [year]`).
pub fn parse_schedule(expression: &str) -> Result<Schedule, ScheduleError> {
    Schedule::from_str(expression).map_err(|e| ScheduleError {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

pub struct AnalysisScheduler {
    pipeline: Arc<AnalysisPipeline>,
    schedule: Schedule,
    timezone: FixedOffset,
    handle: RwLock<Option<JoinHandle<()>>>,
}

impl AnalysisScheduler {
    /// Schedule times are read in the exchange time zone `timezone`.
    pub fn new(
        pipeline: Arc<AnalysisPipeline>,
        expression: &str,
        timezone: FixedOffset,
    ) -> Result<Self, ScheduleError> {
        let schedule = parse_schedule(expression)?;
        info!(cron = %expression, "analysis scheduler configured");
        Ok(Self {
            pipeline,
            schedule,
            timezone,
            handle: RwLock::new(None),
        })
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.schedule
            .upcoming(self.timezone)
            .next()
            .map(|t| t.with_timezone(&Utc))
    }

    pub async fn start(&self) {
        let pipeline = self.pipeline.clone();
        let schedule = self.schedule.clone();
        let timezone = self.timezone;

        let handle = tokio::spawn(async move {
            loop {
                let Some(next_tick) = schedule.upcoming(timezone).next() else {
                    warn!("analysis schedule has no upcoming times, scheduler exiting");
                    return;
                };
                let wait = (next_tick.with_timezone(&Utc) - Utc::now())
                    .to_std()
                    .unwrap_or_default();
                info!(next_run = %next_tick, "waiting for next scheduled analysis");
                tokio::time::sleep(wait).await;

                match pipeline.run().await {
                    Ok(_) => {}
                    Err(AnalysisError::AlreadyRunning) => {
                        warn!("skipping scheduled analysis, a run is already in progress")
                    }
                    Err(e) => error!(error = %e, "scheduled analysis failed"),
                }
            }
        });

        *self.handle.write().await = Some(handle);
        info!("analysis scheduler started");
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.handle.write().await.take() {
            handle.abort();
            info!("analysis scheduler stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
