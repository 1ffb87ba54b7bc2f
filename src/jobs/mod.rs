pub mod analysis;
pub mod context;

pub use analysis::{AnalysisError, AnalysisPipeline, AnalysisReport};
pub use context::AnalysisContext;
