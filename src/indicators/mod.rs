pub mod error;
pub mod momentum;
pub mod snapshot;
pub mod trend;

pub use error::IndicatorError;
pub use snapshot::compute_snapshot;
