//! Price window normalization and the ticker universe.

pub mod normalizer;
pub mod universe;

pub use normalizer::{build_window, clean_daily_bars, resolve_as_of_close, AsOfSettings};
pub use universe::{load_universe, parse_universe, provider_symbol, UniverseError};
