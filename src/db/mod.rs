pub mod postgres;

pub use postgres::{AnalysisRun, AnalysisStore, StoreError};
