//! Seasonality summary over a symbol's monthly history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::model::MonthlyCandle;
use crate::constants::MONTH_NAMES;

/// Average return for one calendar month across all years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAverage {
    pub month: u32,
    pub month_name: String,
    /// Mean of the non-null returns, zero when `count` is zero
    pub average_return: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalitySummary {
    /// Twelve entries, January first. Empty when there is no history.
    pub monthly_returns: Vec<MonthlyAverage>,
    /// Return per `"{year}-{month}"`.
    pub heatmap: BTreeMap<String, Decimal>,
    /// Distinct years present in the history, ascending.
    pub years: Vec<i32>,
}

impl SeasonalitySummary {
    /// Builds the summary. Months without a return are left out of both
    /// the averages and the heatmap, but their year still counts.
    pub fn from_history(history: &[MonthlyCandle]) -> Self {
        if history.is_empty() {
            return Self::default();
        }

        let years: Vec<i32> = history
            .iter()
            .map(|m| m.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut sums = [Decimal::ZERO; 12];
        let mut counts = [0usize; 12];
        let mut heatmap = BTreeMap::new();

        for candle in history {
            let Some(ret) = candle.return_pct else {
                continue;
            };
            if !(1..=12).contains(&candle.month) {
                continue;
            }
            let idx = (candle.month - 1) as usize;
            sums[idx] += ret;
            counts[idx] += 1;
            heatmap.insert(format!("{}-{}", candle.year, candle.month), ret);
        }

        let monthly_returns = (0..12)
            .map(|idx| MonthlyAverage {
                month: idx as u32 + 1,
                month_name: MONTH_NAMES[idx].to_string(),
                average_return: if counts[idx] > 0 {
                    sums[idx] / Decimal::from(counts[idx])
                } else {
                    Decimal::ZERO
                },
                count: counts[idx],
            })
            .collect();

        Self {
            monthly_returns,
            heatmap,
            years,
        }
    }
}
