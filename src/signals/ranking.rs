//! Filtering and ranking over evaluated results.

use serde::{Deserialize, Serialize};

use crate::models::signal::{
    AdxSignal, DeviationSignal, DmiSignal, MacdSignal, ResultSet, RsiSignal, ScoreResult,
    SignalSet, TrendSignal,
};

pub const DEFAULT_BENCHMARK: &str = "^N225";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    #[default]
    BuyScore,
    ShortScore,
}

impl ScoreField {
    pub fn of(&self, result: &ScoreResult) -> u32 {
        match self {
            ScoreField::BuyScore => result.buy_score,
            ScoreField::ShortScore => result.short_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

/// Accepted labels per family. `None` accepts every label of that family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<Vec<RsiSignal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<Vec<DeviationSignal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Vec<TrendSignal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<Vec<MacdSignal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dmi: Option<Vec<DmiSignal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adx: Option<Vec<AdxSignal>>,
}

fn accepts<T: PartialEq>(accepted: &Option<Vec<T>>, label: &T) -> bool {
    accepted
        .as_ref()
        .map_or(true, |labels| labels.contains(label))
}

impl SignalFilter {
    pub fn matches(&self, signals: &SignalSet) -> bool {
        accepts(&self.rsi, &signals.rsi)
            && accepts(&self.deviation, &signals.deviation)
            && accepts(&self.trend, &signals.trend)
            && accepts(&self.macd, &signals.macd)
            && accepts(&self.dmi, &signals.dmi)
            && accepts(&self.adx, &signals.adx)
    }

    pub fn is_empty(&self) -> bool {
        self == &SignalFilter::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    pub sort_by: ScoreField,
    pub order: SortOrder,
    pub min_buy_score: Option<u32>,
    pub min_short_score: Option<u32>,
    pub limit: Option<usize>,
    pub filter: SignalFilter,
    /// Ticker placed first in the ranked list whenever it was evaluated.
    pub benchmark: Option<String>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            sort_by: ScoreField::default(),
            order: SortOrder::default(),
            min_buy_score: None,
            min_short_score: None,
            limit: None,
            filter: SignalFilter::default(),
            benchmark: Some(DEFAULT_BENCHMARK.to_string()),
        }
    }
}

impl RankOptions {
    fn admits(&self, result: &ScoreResult) -> bool {
        self.min_buy_score.map_or(true, |min| result.buy_score >= min)
            && self
                .min_short_score
                .map_or(true, |min| result.short_score >= min)
            && self.filter.matches(&result.signals)
    }
}

/// Filter, sort and truncate `results`, then put the benchmark in front.
///
/// Sorting is stable so equal scores keep evaluation order. The benchmark is
/// exempt from filters and from the limit.
pub fn rank<'a>(results: &'a ResultSet, options: &RankOptions) -> Vec<&'a ScoreResult> {
    let benchmark = options.benchmark.as_deref();
    let mut ranked: Vec<&ScoreResult> = results
        .iter()
        .filter(|r| Some(r.ticker.as_str()) != benchmark)
        .filter(|r| options.admits(r))
        .collect();

    let field = options.sort_by;
    ranked.sort_by(|a, b| match options.order {
        SortOrder::Desc => field.of(b).cmp(&field.of(a)),
        SortOrder::Asc => field.of(a).cmp(&field.of(b)),
    });
    if let Some(limit) = options.limit {
        ranked.truncate(limit);
    }

    if let Some(index) = benchmark.and_then(|ticker| results.get(ticker)) {
        ranked.insert(0, index);
    }
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub top_buys: Vec<ScoreResult>,
    pub top_shorts: Vec<ScoreResult>,
}

/// Top `top_n` results by buy score and by short score, both descending.
pub fn summary(results: &ResultSet, top_n: usize) -> Summary {
    let top = |sort_by: ScoreField| -> Vec<ScoreResult> {
        let options = RankOptions {
            sort_by,
            limit: Some(top_n),
            benchmark: None,
            ..RankOptions::default()
        };
        rank(results, &options).into_iter().cloned().collect()
    };
    Summary {
        top_buys: top(ScoreField::BuyScore),
        top_shorts: top(ScoreField::ShortScore),
    }
}
