//! Pure decision function for deal classification

use serde::{Deserialize, Serialize};

use crate::shared::errors::DealError;
use crate::shared::types::{DealThresholds, HistoricalLow, PriceObservation};
use crate::shared::utils::percent_diff;

/// Outcome of evaluating one observation against one watchlist entry.
///
/// An observation can be an amazing deal and meet the target price at the
/// same time, so this is a set of flags rather than an enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealClassification {
    pub amazing_deal: bool,
    pub target_met: bool,
    pub reason: Option<String>,
}

impl DealClassification {
    pub fn none() -> Self {
        Self {
            amazing_deal: false,
            target_met: false,
            reason: None,
        }
    }

    /// True when the classification should reach the notifier
    pub fn is_noteworthy(&self) -> bool {
        self.amazing_deal || self.target_met
    }
}

/// Classify one observation against the historical low known for its
/// (game, store) pair and an optional target price.
///
/// The historical low passed here is the one recorded before this
/// observation was folded in. That keeps the no-history fallback rule
/// meaningful: the very first sighting of a cheap game can be flagged even
/// though recording it immediately creates a low. The asymmetry between the
/// first and second sighting is intentional, inherited behavior.
pub fn classify(
    observation: &PriceObservation,
    historical_low: Option<&HistoricalLow>,
    target_price: Option<f64>,
    thresholds: &DealThresholds,
) -> Result<DealClassification, DealError> {
    if !observation.price.is_finite() || observation.price <= 0.0 {
        return Err(DealError::InvalidPrice(observation.price));
    }

    let mut reasons = Vec::new();

    if observation.discount_percent >= thresholds.min_discount_percent {
        reasons.push(format!("Discount of {:.1}%", observation.discount_percent));
    }

    match historical_low {
        Some(low) if low.lowest_price > 0.0 => {
            // Tolerance boundary is inclusive
            if percent_diff(observation.price, low.lowest_price) <= thresholds.price_tolerance_percent {
                reasons.push(format!(
                    "Price near historical low (${:.2})",
                    low.lowest_price
                ));
            }
        }
        Some(_) => {}
        None => {
            if observation.price < thresholds.fallback_price_ceiling
                && observation.discount_percent > thresholds.fallback_min_discount
            {
                reasons.push(format!(
                    "Very low price (${:.2}) with good discount",
                    observation.price
                ));
            }
        }
    }

    let amazing_deal = !reasons.is_empty();
    let reason = amazing_deal.then(|| reasons.join(" | "));
    let target_met = target_price.map_or(false, |target| observation.price <= target);

    Ok(DealClassification {
        amazing_deal,
        target_met,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn observation(price: f64, original_price: f64, discount: f64) -> PriceObservation {
        PriceObservation::new(
            "Game X", "Steam", price, original_price, discount, "d1", "", Utc::now(),
        )
    }

    fn low(price: f64) -> HistoricalLow {
        HistoricalLow {
            lowest_price: price,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_discount_threshold_boundary() {
        let thresholds = DealThresholds::default();

        let hit = classify(&observation(10.0, 0.0, 75.0), None, None, &thresholds).unwrap();
        assert!(hit.amazing_deal);
        assert_eq!(hit.reason.as_deref(), Some("Discount of 75.0%"));

        let miss = classify(&observation(10.0, 0.0, 74.9), None, None, &thresholds).unwrap();
        assert!(!miss.amazing_deal);
        assert!(miss.reason.is_none());
    }

    #[test]
    fn test_near_low_boundary_is_inclusive() {
        let thresholds = DealThresholds::default();

        // 9.50 against a 10.00 low is exactly 5.0% away
        let hit = classify(&observation(9.50, 0.0, 0.0), Some(&low(10.0)), None, &thresholds).unwrap();
        assert!(hit.amazing_deal);
        assert_eq!(hit.reason.as_deref(), Some("Price near historical low ($10.00)"));

        // 9.499 is 5.01% away, just outside tolerance
        let miss = classify(&observation(9.499, 0.0, 0.0), Some(&low(10.0)), None, &thresholds).unwrap();
        assert!(!miss.amazing_deal);
    }

    #[test]
    fn test_fallback_requires_absent_history() {
        let thresholds = DealThresholds::default();
        let obs = observation(4.99, 0.0, 60.0);

        // With a recorded low the fallback never fires, and 4.99 against a
        // 4.00 low is outside tolerance, and 60% is below the discount bar
        let with_history = classify(&obs, Some(&low(4.0)), None, &thresholds).unwrap();
        assert_eq!(with_history, DealClassification::none());

        let without_history = classify(&obs, None, None, &thresholds).unwrap();
        assert!(without_history.amazing_deal);
        assert_eq!(
            without_history.reason.as_deref(),
            Some("Very low price ($4.99) with good discount")
        );
    }

    #[test]
    fn test_zero_low_is_ignored() {
        let thresholds = DealThresholds::default();
        let result = classify(&observation(0.01, 0.0, 0.0), Some(&low(0.0)), None, &thresholds).unwrap();
        assert!(!result.amazing_deal);
    }

    #[test]
    fn test_target_met_combines_with_amazing() {
        let thresholds = DealThresholds::default();

        // 80% discount and below target at once
        let both = classify(&observation(12.0, 60.0, 0.0), None, Some(15.0), &thresholds).unwrap();
        assert!(both.amazing_deal);
        assert!(both.target_met);
        assert!(both.reason.unwrap().contains("80.0%"));

        // Target alone does not make a deal amazing
        let target_only = classify(&observation(14.0, 20.0, 0.0), Some(&low(8.0)), Some(15.0), &thresholds).unwrap();
        assert!(!target_only.amazing_deal);
        assert!(target_only.target_met);
        assert!(target_only.is_noteworthy());
    }

    #[test]
    fn test_reasons_are_concatenated() {
        let thresholds = DealThresholds::default();
        let result = classify(&observation(10.0, 50.0, 0.0), Some(&low(10.0)), None, &thresholds).unwrap();
        assert_eq!(
            result.reason.as_deref(),
            Some("Discount of 80.0% | Price near historical low ($10.00)")
        );
    }

    #[test]
    fn test_invalid_price_rejected() {
        let thresholds = DealThresholds::default();
        assert_eq!(
            classify(&observation(0.0, 10.0, 0.0), None, None, &thresholds),
            Err(DealError::InvalidPrice(0.0))
        );
        assert!(classify(&observation(-1.0, 10.0, 0.0), None, None, &thresholds).is_err());
    }
}
