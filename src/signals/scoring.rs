//! Additive buy/short scoring over the classified signal set.

use std::ops::{Add, AddAssign};

use crate::indicators::IndicatorError;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::params::ParameterSet;
use crate::models::signal::{
    AdxSignal, DeviationSignal, DmiSignal, MacdSignal, RsiSignal, SignalSet, TrendSignal,
};
use crate::signals::classifier::{
    classify_adx, classify_deviation, classify_dmi, classify_macd, classify_rsi, classify_trend,
    deviation_percent,
};

/// Points one label contributes to each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreDelta {
    pub buy: u32,
    pub short: u32,
}

impl ScoreDelta {
    pub const NONE: ScoreDelta = ScoreDelta { buy: 0, short: 0 };

    pub const fn buy(points: u32) -> Self {
        Self {
            buy: points,
            short: 0,
        }
    }

    pub const fn short(points: u32) -> Self {
        Self {
            buy: 0,
            short: points,
        }
    }
}

impl Add for ScoreDelta {
    type Output = ScoreDelta;

    fn add(self, rhs: ScoreDelta) -> ScoreDelta {
        ScoreDelta {
            buy: self.buy + rhs.buy,
            short: self.short + rhs.short,
        }
    }
}

impl AddAssign for ScoreDelta {
    fn add_assign(&mut self, rhs: ScoreDelta) {
        *self = *self + rhs;
    }
}

/// A signal label with a fixed contribution to the scores.
pub trait Scored {
    fn delta(&self) -> ScoreDelta;
}

impl Scored for RsiSignal {
    fn delta(&self) -> ScoreDelta {
        match self {
            RsiSignal::StrongBuy => ScoreDelta::buy(2),
            RsiSignal::BuyPrepare => ScoreDelta::buy(1),
            RsiSignal::StrongSell => ScoreDelta::short(2),
            RsiSignal::SellPrepare => ScoreDelta::short(1),
            RsiSignal::Neutral => ScoreDelta::NONE,
        }
    }
}

impl Scored for DeviationSignal {
    fn delta(&self) -> ScoreDelta {
        match self {
            DeviationSignal::Buy => ScoreDelta::buy(2),
            DeviationSignal::Sell => ScoreDelta::short(2),
            DeviationSignal::Neutral => ScoreDelta::NONE,
        }
    }
}

impl Scored for TrendSignal {
    fn delta(&self) -> ScoreDelta {
        match self {
            TrendSignal::Upward => ScoreDelta::buy(1),
            TrendSignal::Downward => ScoreDelta::short(1),
            TrendSignal::NoChange => ScoreDelta::NONE,
        }
    }
}

impl Scored for MacdSignal {
    fn delta(&self) -> ScoreDelta {
        match self {
            MacdSignal::BullishCross => ScoreDelta::buy(2),
            MacdSignal::BearishCross => ScoreDelta::short(2),
        }
    }
}

impl Scored for DmiSignal {
    fn delta(&self) -> ScoreDelta {
        match self {
            DmiSignal::GoldenCross => ScoreDelta::buy(2),
            DmiSignal::DeadCross => ScoreDelta::short(2),
        }
    }
}

impl Scored for AdxSignal {
    fn delta(&self) -> ScoreDelta {
        match self {
            AdxSignal::StrongUptrend => ScoreDelta::buy(1),
            AdxSignal::StrongDowntrend => ScoreDelta::short(1),
            AdxSignal::Trendless => ScoreDelta::NONE,
        }
    }
}

impl Scored for SignalSet {
    fn delta(&self) -> ScoreDelta {
        self.rsi.delta()
            + self.deviation.delta()
            + self.trend.delta()
            + self.macd.delta()
            + self.dmi.delta()
            + self.adx.delta()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub signals: SignalSet,
    pub deviation: f64,
    pub buy_score: u32,
    pub short_score: u32,
}

pub struct SignalScorer<'a> {
    params: &'a ParameterSet,
}

impl<'a> SignalScorer<'a> {
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// Classify every family and sum the triggered deltas.
    pub fn score(
        &self,
        snapshot: &IndicatorSnapshot,
        price: f64,
    ) -> Result<Classification, IndicatorError> {
        let params = self.params;
        let deviation =
            deviation_percent(price, snapshot.sma_short).ok_or(IndicatorError::Undefined {
                indicator: "deviation",
                reason: "short SMA is zero",
            })?;

        let signals = SignalSet {
            rsi: classify_rsi(snapshot.rsi, params),
            deviation: classify_deviation(deviation, params),
            trend: classify_trend(snapshot.sma_long, snapshot.prev_sma_long),
            macd: classify_macd(snapshot.macd_line, snapshot.macd_signal),
            dmi: classify_dmi(snapshot.plus_di, snapshot.minus_di),
            adx: classify_adx(snapshot.adx, snapshot.plus_di, snapshot.minus_di, params),
        };
        let total = signals.delta();

        Ok(Classification {
            signals,
            deviation,
            buy_score: total.buy,
            short_score: total.short,
        })
    }
}
