//! PostgreSQL persistence for analysis runs and tuning parameters.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error, info};

use crate::models::indicators::IndicatorSnapshot;
use crate::models::params::{ParameterError, ParameterSet};
use crate::models::signal::{ResultSet, ScoreResult, SignalSet, TrendSignal, UnknownLabel};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("failed to (de)serialize stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored tuning parameters are invalid: {0}")]
    InvalidParameters(#[from] ParameterError),

    #[error("malformed stored row: {0}")]
    InvalidRow(String),
}

impl From<UnknownLabel> for StoreError {
    fn from(err: UnknownLabel) -> Self {
        StoreError::InvalidRow(err.to_string())
    }
}

/// One recorded evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRun {
    pub id: i64,
    pub analyzed_at: DateTime<Utc>,
    pub parameters_used: ParameterSet,
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tuning_parameters (
        id BIGSERIAL PRIMARY KEY,
        date DATE NOT NULL,
        name TEXT NOT NULL,
        value DOUBLE PRECISION NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ,
        UNIQUE (date, name)
    )",
    "CREATE TABLE IF NOT EXISTS analysis_runs (
        id BIGSERIAL PRIMARY KEY,
        analyzed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        parameters_used JSONB NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS analysis_runs_analyzed_at_idx ON analysis_runs (analyzed_at)",
    "CREATE TABLE IF NOT EXISTS analysis_results (
        id BIGSERIAL PRIMARY KEY,
        run_id BIGINT NOT NULL REFERENCES analysis_runs (id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        ticker TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL,
        rsi DOUBLE PRECISION NOT NULL,
        deviation DOUBLE PRECISION NOT NULL,
        trend TEXT NOT NULL,
        macd_line DOUBLE PRECISION NOT NULL,
        macd_signal DOUBLE PRECISION NOT NULL,
        plus_di DOUBLE PRECISION NOT NULL,
        minus_di DOUBLE PRECISION NOT NULL,
        adx DOUBLE PRECISION NOT NULL,
        sma_short DOUBLE PRECISION NOT NULL,
        sma_long DOUBLE PRECISION NOT NULL,
        prev_sma_long DOUBLE PRECISION,
        volume DOUBLE PRECISION NOT NULL,
        signals JSONB NOT NULL,
        buy_score INTEGER NOT NULL,
        short_score INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS analysis_results_run_idx ON analysis_results (run_id)",
    "ALTER TABLE analysis_results ALTER COLUMN prev_sma_long DROP NOT NULL",
];

const RESULT_COLUMNS: &str = "ticker, price, rsi, deviation, trend, macd_line, macd_signal, \
     plus_di, minus_di, adx, sma_short, sma_long, prev_sma_long, volume, signals, buy_score, \
     short_score";

pub struct AnalysisStore {
    client: Arc<RwLock<Client>>,
}

impl AnalysisStore {
    /// Connect, spawn the connection driver and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        let store = Self {
            client: Arc::new(RwLock::new(client)),
        };
        store.init_schema().await?;
        info!("analysis store ready");
        Ok(store)
    }

    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let client = self.client.read().await;
        for statement in SCHEMA {
            client.execute(*statement, &[]).await?;
        }
        Ok(())
    }

    /// Record one run and all of its results atomically. Returns the run id.
    pub async fn save_run(
        &self,
        params: &ParameterSet,
        results: &ResultSet,
    ) -> Result<i64, StoreError> {
        let parameters = serde_json::to_value(params)?;
        let mut client = self.client.write().await;
        let tx = client.transaction().await?;

        let row = tx
            .query_one(
                "INSERT INTO analysis_runs (parameters_used) VALUES ($1) RETURNING id",
                &[&parameters],
            )
            .await?;
        let run_id: i64 = row.get(0);

        let insert = tx
            .prepare(&format!(
                "INSERT INTO analysis_results (run_id, position, {RESULT_COLUMNS}) VALUES \
                 ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)"
            ))
            .await?;

        for (position, result) in results.iter().enumerate() {
            let s = &result.indicators;
            let signals = serde_json::to_value(result.signals)?;
            let position = position as i32;
            let trend = result.trend.as_str();
            let buy_score = result.buy_score as i32;
            let short_score = result.short_score as i32;
            tx.execute(
                &insert,
                &[
                    &run_id,
                    &position,
                    &result.ticker,
                    &result.price,
                    &s.rsi,
                    &result.deviation,
                    &trend,
                    &s.macd_line,
                    &s.macd_signal,
                    &s.plus_di,
                    &s.minus_di,
                    &s.adx,
                    &s.sma_short,
                    &s.sma_long,
                    &s.prev_sma_long,
                    &result.volume,
                    &signals,
                    &buy_score,
                    &short_score,
                ],
            )
            .await?;
        }

        tx.commit().await?;
        info!(run_id, results = results.len(), "saved analysis run");
        Ok(run_id)
    }

    pub async fn latest_run(&self) -> Result<Option<AnalysisRun>, StoreError> {
        let client = self.client.read().await;
        let row = client
            .query_opt(
                "SELECT id, analyzed_at, parameters_used FROM analysis_runs
                 ORDER BY analyzed_at DESC, id DESC LIMIT 1",
                &[],
            )
            .await?;

        row.map(|row| -> Result<AnalysisRun, StoreError> {
            let parameters: serde_json::Value = row.get("parameters_used");
            Ok(AnalysisRun {
                id: row.get("id"),
                analyzed_at: row.get("analyzed_at"),
                parameters_used: serde_json::from_value(parameters)?,
            })
        })
        .transpose()
    }

    /// Results of the latest run in evaluation order, or `None` when no run
    /// has been recorded yet.
    pub async fn latest_results(&self) -> Result<Option<(AnalysisRun, ResultSet)>, StoreError> {
        let Some(run) = self.latest_run().await? else {
            return Ok(None);
        };
        let client = self.client.read().await;
        let rows = client
            .query(
                &format!(
                    "SELECT {RESULT_COLUMNS} FROM analysis_results WHERE run_id = $1 ORDER BY position"
                ),
                &[&run.id],
            )
            .await?;
        debug!(run_id = run.id, rows = rows.len(), "loaded latest results");

        let results = rows
            .iter()
            .map(|row| result_from_row(row, &run.parameters_used))
            .collect::<Result<ResultSet, StoreError>>()?;
        Ok(Some((run, results)))
    }

    /// Tuning overrides in effect on `date`: the values stored for the latest
    /// date on or before it.
    pub async fn tuning_parameters(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<String, f64>, StoreError> {
        let client = self.client.read().await;
        let rows = client
            .query(
                "SELECT name, value FROM tuning_parameters
                 WHERE date = (SELECT MAX(date) FROM tuning_parameters WHERE date <= $1)",
                &[&date],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<_, String>(0), row.get::<_, f64>(1)))
            .collect())
    }

    pub async fn upsert_tuning_parameter(
        &self,
        date: NaiveDate,
        name: &str,
        value: f64,
        description: Option<&str>,
    ) -> Result<(), StoreError> {
        let client = self.client.read().await;
        client
            .execute(
                "INSERT INTO tuning_parameters (date, name, value, description)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (date, name) DO UPDATE
                 SET value = EXCLUDED.value,
                     description = EXCLUDED.description,
                     updated_at = now()",
                &[&date, &name, &value, &description],
            )
            .await?;
        Ok(())
    }

    /// Defaults overridden by the tuning values in effect on `date`.
    pub async fn resolve_parameters(&self, date: NaiveDate) -> Result<ParameterSet, StoreError> {
        let overrides = self.tuning_parameters(date).await?;
        if !overrides.is_empty() {
            info!(%date, count = overrides.len(), "applying stored tuning parameters");
        }
        Ok(ParameterSet::default().with_overrides(&overrides)?)
    }
}

fn result_from_row(row: &Row, params: &ParameterSet) -> Result<ScoreResult, StoreError> {
    let signals: serde_json::Value = row.try_get("signals")?;
    let signals: SignalSet = serde_json::from_value(signals)?;
    let trend: TrendSignal = row.try_get::<_, String>("trend")?.parse()?;
    let score = |column: &str| -> Result<u32, StoreError> {
        let value: i32 = row.try_get(column)?;
        u32::try_from(value).map_err(|_| StoreError::InvalidRow(format!("negative {column}")))
    };

    Ok(ScoreResult {
        ticker: row.try_get("ticker")?,
        price: row.try_get("price")?,
        indicators: IndicatorSnapshot {
            rsi: row.try_get("rsi")?,
            sma_short: row.try_get("sma_short")?,
            sma_long: row.try_get("sma_long")?,
            prev_sma_long: row.try_get::<_, Option<f64>>("prev_sma_long")?,
            macd_line: row.try_get("macd_line")?,
            macd_signal: row.try_get("macd_signal")?,
            adx: row.try_get("adx")?,
            plus_di: row.try_get("plus_di")?,
            minus_di: row.try_get("minus_di")?,
        },
        deviation: row.try_get("deviation")?,
        volume: row.try_get("volume")?,
        trend,
        signals,
        buy_score: score("buy_score")?,
        short_score: score("short_score")?,
        parameters_used: params.clone(),
    })
}
