//! Batch evaluation plus the HTTP and scheduling shells around it.

pub mod evaluator;
pub mod http;
pub mod scheduler;

pub use evaluator::{BatchEvaluator, BatchOutcome, Exclusion, MarketData};
pub use http::{create_router, start_server, AppState};
pub use scheduler::{parse_schedule, AnalysisScheduler, ScheduleError};
