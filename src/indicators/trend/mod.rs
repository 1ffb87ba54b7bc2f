//! Trend indicators: SMA, ADX/DMI

pub mod adx;
pub mod sma;

pub use adx::*;
pub use sma::*;
