//! Signal classification, scoring and ranking.

pub mod classifier;
pub mod engine;
pub mod ranking;
pub mod scoring;

pub use classifier::*;
pub use engine::SignalEngine;
pub use ranking::{rank, summary, RankOptions, ScoreField, SignalFilter, SortOrder, Summary};
pub use scoring::{Classification, ScoreDelta, Scored, SignalScorer};
