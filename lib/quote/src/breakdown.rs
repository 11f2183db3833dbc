//! The quote breakdown and its hard invariants.

use crate::error::QuoteError;
use serde::{Deserialize, Serialize};

/// Minimum total charge in CHF, covering business overhead when the
/// computed allocation would otherwise be negligible.
pub const BUSINESS_FLOOR_CHF: f64 = 10.0;

/// No single category may carry more than this share of the total.
pub const CATEGORY_CAP: f64 = 0.6;

/// Tolerance for comparing CHF amounts that were computed in integer cents.
const HALF_CENT: f64 = 0.005;

/// A four-category cost breakdown anchored to a reference price.
///
/// Serde field names follow the reasoning-provider wire format, so this type
/// parses provider responses directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    #[serde(rename = "Base Material")]
    pub base_material: f64,
    #[serde(rename = "Size Adjustment")]
    pub size_adjustment: f64,
    #[serde(rename = "Operations Fee")]
    pub operations_fee: f64,
    #[serde(rename = "Finish Fee")]
    pub finish_fee: f64,
    #[serde(rename = "Total Quote")]
    pub total_quote: f64,
    #[serde(rename = "Explanation", default)]
    pub explanation: String,
}

impl QuoteBreakdown {
    /// The four category amounts in canonical order: base material, size
    /// adjustment, operations fee, finish fee.
    pub fn categories(&self) -> [f64; 4] {
        [
            self.base_material,
            self.size_adjustment,
            self.operations_fee,
            self.finish_fee,
        ]
    }

    /// Verify the hard constraints: non-negative categories, categories
    /// summing to the total, and no category above 60% of the total.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if !self.total_quote.is_finite() || self.total_quote <= 0.0 {
            return Err(QuoteError::Invalid(format!(
                "total quote must be positive, got {}",
                self.total_quote
            )));
        }

        for (name, amount) in self.named_categories() {
            if !amount.is_finite() || amount < 0.0 {
                return Err(QuoteError::Invalid(format!(
                    "{name} must be non-negative, got {amount}"
                )));
            }
            if amount > self.total_quote * CATEGORY_CAP + HALF_CENT {
                return Err(QuoteError::Invalid(format!(
                    "{name} ({amount}) exceeds 60% of total ({})",
                    self.total_quote
                )));
            }
        }

        let sum: f64 = self.categories().iter().sum();
        if (sum - self.total_quote).abs() > HALF_CENT {
            return Err(QuoteError::Invalid(format!(
                "categories sum to {sum}, total is {}",
                self.total_quote
            )));
        }

        if self.explanation.trim().is_empty() {
            return Err(QuoteError::Invalid("explanation is empty".to_string()));
        }

        Ok(())
    }

    fn named_categories(&self) -> [(&'static str, f64); 4] {
        [
            ("base material", self.base_material),
            ("size adjustment", self.size_adjustment),
            ("operations fee", self.operations_fee),
            ("finish fee", self.finish_fee),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_breakdown() -> QuoteBreakdown {
        QuoteBreakdown {
            base_material: 20.0,
            size_adjustment: 10.0,
            operations_fee: 20.0,
            finish_fee: 10.0,
            total_quote: 60.0,
            explanation: "Same features as reference, distributed by standard business logic."
                .to_string(),
        }
    }

    #[test]
    fn test_valid_breakdown_passes() {
        valid_breakdown().validate().unwrap();
    }

    #[test]
    fn test_sum_mismatch_rejected() {
        let mut b = valid_breakdown();
        b.finish_fee = 11.0;
        assert!(matches!(b.validate(), Err(QuoteError::Invalid(_))));
    }

    #[test]
    fn test_negative_category_rejected() {
        let mut b = valid_breakdown();
        b.base_material = -1.0;
        b.operations_fee = 41.0;
        assert!(matches!(b.validate(), Err(QuoteError::Invalid(_))));
    }

    #[test]
    fn test_category_cap_rejected() {
        let b = QuoteBreakdown {
            base_material: 40.0,
            size_adjustment: 10.0,
            operations_fee: 5.0,
            finish_fee: 5.0,
            total_quote: 60.0,
            explanation: "Material dominates.".to_string(),
        };
        // 40 > 0.6 * 60 = 36
        assert!(matches!(b.validate(), Err(QuoteError::Invalid(_))));
    }

    #[test]
    fn test_wire_format_round_trip() {
        let json = serde_json::to_string(&valid_breakdown()).unwrap();
        assert!(json.contains("\"Base Material\""));
        assert!(json.contains("\"Total Quote\""));

        let parsed: QuoteBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, valid_breakdown());
    }
}
