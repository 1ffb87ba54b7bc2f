//! Categorical signals and per-ticker score records.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::models::indicators::IndicatorSnapshot;
use crate::models::params::ParameterSet;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {family} label '{label}'")]
pub struct UnknownLabel {
    pub family: &'static str,
    pub label: String,
}

macro_rules! signal_label {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|label| label.as_str() == s)
                    .ok_or_else(|| UnknownLabel {
                        family: stringify!($name),
                        label: s.to_string(),
                    })
            }
        }
    };
}

signal_label!(
    /// RSI zone.
    RsiSignal {
        StrongBuy => "strong buy",
        BuyPrepare => "buy prepare",
        StrongSell => "strong sell",
        SellPrepare => "sell prepare",
        Neutral => "neutral",
    }
);

signal_label!(
    /// Close versus short SMA deviation.
    DeviationSignal {
        Buy => "buy",
        Sell => "sell",
        Neutral => "neutral",
    }
);

signal_label!(
    /// Direction of the long SMA against its prior value.
    TrendSignal {
        Upward => "upward",
        Downward => "downward",
        NoChange => "no change",
    }
);

signal_label!(
    MacdSignal {
        BullishCross => "bullish cross",
        BearishCross => "bearish cross",
    }
);

signal_label!(
    DmiSignal {
        GoldenCross => "golden cross",
        DeadCross => "dead cross",
    }
);

signal_label!(
    AdxSignal {
        StrongUptrend => "strong uptrend",
        StrongDowntrend => "strong downtrend",
        Trendless => "trendless",
    }
);

/// One label per indicator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    pub rsi: RsiSignal,
    pub deviation: DeviationSignal,
    pub trend: TrendSignal,
    pub macd: MacdSignal,
    pub dmi: DmiSignal,
    pub adx: AdxSignal,
}

/// Scored outcome for one ticker in one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub ticker: String,
    /// As-of close used for the deviation and as the last close of the window.
    pub price: f64,
    #[serde(flatten)]
    pub indicators: IndicatorSnapshot,
    /// Percent deviation of `price` from the short SMA.
    pub deviation: f64,
    pub volume: f64,
    pub trend: TrendSignal,
    pub signals: SignalSet,
    pub buy_score: u32,
    pub short_score: u32,
    pub parameters_used: ParameterSet,
}

/// Ticker-keyed results kept in insertion order.
///
/// Serializes as a JSON object `{ticker: result}` in that same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    entries: Vec<ScoreResult>,
    index: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result, replacing an earlier one for the same ticker in place.
    pub fn insert(&mut self, result: ScoreResult) {
        match self.index.get(&result.ticker) {
            Some(&position) => self.entries[position] = result,
            None => {
                self.index.insert(result.ticker.clone(), self.entries.len());
                self.entries.push(result);
            }
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&ScoreResult> {
        self.index.get(ticker).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.index.contains_key(ticker)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoreResult> {
        self.entries.iter()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.ticker.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[ScoreResult] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<ScoreResult> {
        self.entries
    }
}

impl FromIterator<ScoreResult> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ScoreResult>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for result in iter {
            set.insert(result);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ScoreResult;
    type IntoIter = std::slice::Iter<'a, ScoreResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for result in &self.entries {
            map.serialize_entry(&result.ticker, result)?;
        }
        map.end()
    }
}
