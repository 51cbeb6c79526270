//! Rate suggestion engine
//!
//! Suggests rates for a work item from historical documents on similar
//! projects: a weighted average with positional time decay, a typical
//! quantity (median), and a confidence level derived from how consistent
//! the observed rates are.

use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::round2;

/// Where a historic rate was observed. Later-stage documents reflect
/// agreed rather than estimated prices and carry more weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Boq,
    Valuation,
    FinalAccount,
}

impl RateSource {
    pub fn weight(&self) -> Decimal {
        match self {
            RateSource::Boq => Decimal::ONE,
            RateSource::Valuation => Decimal::new(12, 1),
            RateSource::FinalAccount => Decimal::new(15, 1),
        }
    }
}

/// A single historic rate observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateObservation {
    pub rate: Decimal,
    pub source: RateSource,
    pub observed_on: NaiveDate,
}

/// Suggested defaults for a work item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSuggestion {
    pub suggested_rate: Decimal,
    pub market_rate: Decimal,
    pub typical_quantity: Decimal,
    pub confidence_level: Decimal,
    pub confidence_samples: usize,
    pub recommendation: String,
}

impl RateSuggestion {
    /// Fallback when no historical data exists for the item.
    pub fn fallback(standard_rate: Decimal) -> Self {
        if standard_rate.is_zero() {
            Self {
                suggested_rate: Decimal::ZERO,
                market_rate: Decimal::ZERO,
                typical_quantity: Decimal::ONE,
                confidence_level: Decimal::ZERO,
                confidence_samples: 0,
                recommendation: "No data available, manual entry required".to_string(),
            }
        } else {
            Self {
                suggested_rate: standard_rate,
                market_rate: standard_rate,
                typical_quantity: Decimal::ONE,
                confidence_level: Decimal::TEN,
                confidence_samples: 0,
                recommendation: "Using item standard rate, no historical data available"
                    .to_string(),
            }
        }
    }
}

/// Weighted average of observed rates.
///
/// Observations are ordered most recent first; each position decays by
/// 10% (factor `1 / (1 + 0.1 * i)`) and is scaled by the source weight.
pub fn weighted_average_rate(observations: &[RateObservation]) -> Decimal {
    if observations.is_empty() {
        return Decimal::ZERO;
    }

    let mut sorted = observations.to_vec();
    sorted.sort_by(|a, b| b.observed_on.cmp(&a.observed_on));

    let decay_step = Decimal::new(1, 1);
    let mut total_weighted_rate = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;

    for (i, observation) in sorted.iter().enumerate() {
        let time_factor = Decimal::ONE / (Decimal::ONE + decay_step * Decimal::from(i as u64));
        let weight = time_factor * observation.source.weight();
        total_weighted_rate += observation.rate * weight;
        total_weight += weight;
    }

    if total_weight.is_zero() {
        Decimal::ZERO
    } else {
        round2(total_weighted_rate / total_weight)
    }
}

/// Median of observed quantities, the typical quantity for the item.
pub fn median_quantity(quantities: &[Decimal]) -> Decimal {
    if quantities.is_empty() {
        return Decimal::ZERO;
    }

    let mut sorted = quantities.to_vec();
    sorted.sort();

    let n = sorted.len();
    if n % 2 == 0 {
        round2((sorted[n / 2 - 1] + sorted[n / 2]) / Decimal::TWO)
    } else {
        sorted[n / 2]
    }
}

/// Confidence in the suggestion, 0-100.
///
/// Based on the coefficient of variation of the observed rates (more
/// consistent data scores higher), with a bonus of 2 points per sample
/// capped at 20.
pub fn confidence_level(rates: &[Decimal]) -> Decimal {
    if rates.len() < 2 {
        return Decimal::ZERO;
    }

    let values: Vec<f64> = rates.iter().filter_map(|r| r.to_f64()).collect();
    if values.is_empty() {
        return Decimal::ZERO;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return Decimal::ZERO;
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let cv = variance.sqrt() / mean;

    let confidence = ((1.0 - cv) * 100.0).clamp(0.0, 100.0);
    let data_bonus = (values.len() as f64 * 2.0).min(20.0);

    let level = (confidence + data_bonus).min(100.0);
    round2(Decimal::from_f64(level).unwrap_or_default())
}

/// Human-readable guidance on how to treat the suggested rate.
pub fn rate_recommendation(
    suggested_rate: Decimal,
    market_rate: Decimal,
    confidence: Decimal,
) -> String {
    if confidence < Decimal::from(30) {
        return "Low confidence, verify with recent market quotes".to_string();
    }

    if !market_rate.is_zero() && !suggested_rate.is_zero() {
        let diff_percent =
            ((market_rate - suggested_rate) / suggested_rate * Decimal::ONE_HUNDRED).abs();

        if diff_percent > Decimal::from(20) {
            return "Significant difference from market rate, investigate further".to_string();
        } else if diff_percent > Decimal::TEN {
            return "Moderate difference from market rate, consider adjustment".to_string();
        }
        return "Rate aligns well with market conditions".to_string();
    }

    if confidence > Decimal::from(80) {
        "High confidence, recommended rate based on strong historical data".to_string()
    } else if confidence > Decimal::from(50) {
        "Moderate confidence, rate based on available project data".to_string()
    } else {
        "Limited data available, verify with current market rates".to_string()
    }
}
