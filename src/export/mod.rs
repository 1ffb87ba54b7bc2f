//! JSON snapshot export of evaluated results.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::models::signal::{ResultSet, ScoreResult};
use crate::signals::ranking::{rank, RankOptions};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Files written for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPaths {
    pub results: PathBuf,
    pub ranked: PathBuf,
}

pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the raw `{ticker: result}` map and the ranked list, both stamped
    /// with `analyzed_at`.
    pub fn write_run(
        &self,
        results: &ResultSet,
        options: &RankOptions,
        analyzed_at: DateTime<Utc>,
    ) -> Result<SnapshotPaths, ExportError> {
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let stamp = analyzed_at.format("%Y%m%d_%H%M%S");

        let results_path = self.dir.join(format!("results_{stamp}.json"));
        write_json(&results_path, results)?;

        let ranked: Vec<&ScoreResult> = rank(results, options);
        let ranked_path = self.dir.join(format!("ranked_{stamp}.json"));
        write_json(&ranked_path, &ranked)?;

        info!(
            dir = %self.dir.display(),
            results = results.len(),
            ranked = ranked.len(),
            "wrote result snapshots"
        );
        Ok(SnapshotPaths {
            results: results_path,
            ranked: ranked_path,
        })
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}
