//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod params;
pub mod signal;

pub use indicators::{
    AdxIndicator, AsOfSource, IndicatorSnapshot, MacdIndicator, PriceBar, PriceWindow, RawBar,
    RsiIndicator, SmaIndicator,
};
pub use params::{ParameterError, ParameterSet};
pub use signal::{
    AdxSignal, DeviationSignal, DmiSignal, MacdSignal, ResultSet, RsiSignal, ScoreResult,
    SignalSet, TrendSignal, UnknownLabel,
};
