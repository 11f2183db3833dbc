//! Deterministic allocation and constraint enforcement.
//!
//! A proposal (rule-based or parsed from a reasoning provider) only carries
//! relative category weights. This module turns weights into integer-cent
//! amounts that satisfy every hard constraint: the total is anchored to the
//! reference price (or the business floor), ineligible categories stay at
//! zero, no category exceeds the 60% cap, and the cents sum exactly.

use crate::breakdown::{QuoteBreakdown, CATEGORY_CAP};
use crate::rank::{finish_complexity, material_rank, operations_complexity};
use quotx_features::{PartFeatures, SizeLabel};
use std::cmp::Ordering;
use tracing::debug;

/// Raw category weights plus an optional explanation, before enforcement.
#[derive(Debug, Clone, Default)]
pub struct Proposal {
    pub base_material: f64,
    pub size_adjustment: f64,
    pub operations_fee: f64,
    pub finish_fee: f64,
    pub explanation: Option<String>,
}

impl Proposal {
    /// Treat a provider-produced breakdown's absolute amounts as weights.
    pub fn from_breakdown(breakdown: &QuoteBreakdown) -> Self {
        Self {
            base_material: breakdown.base_material,
            size_adjustment: breakdown.size_adjustment,
            operations_fee: breakdown.operations_fee,
            finish_fee: breakdown.finish_fee,
            explanation: Some(breakdown.explanation.clone()),
        }
    }

    pub fn weights(&self) -> [f64; 4] {
        [
            self.base_material,
            self.size_adjustment,
            self.operations_fee,
            self.finish_fee,
        ]
    }
}

/// The enforced allocation, in cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// base material, size adjustment, operations fee, finish fee.
    pub cents: [i64; 4],
    pub total_cents: i64,
    pub floor_applied: bool,
}

fn size_factor(label: SizeLabel) -> f64 {
    match label {
        SizeLabel::Small => 0.5,
        SizeLabel::Medium => 1.0,
        SizeLabel::Large => 1.5,
        SizeLabel::Unknown => 0.8,
    }
}

/// Rule-based proposal: base material scales with material rank and size,
/// size adjustment with the size bucket, operations and finish with their
/// complexity tiers.
pub fn propose(query: &PartFeatures) -> Proposal {
    let size = size_factor(query.size_label);
    let operations = if query.has_operations() {
        operations_complexity(&query.operations)
    } else {
        0.0
    };
    let finish = if query.has_finish() {
        finish_complexity(&query.finish)
    } else {
        0.0
    };

    Proposal {
        base_material: 2.0 * material_rank(&query.material) * size,
        size_adjustment: size,
        operations_fee: operations,
        finish_fee: finish,
        explanation: None,
    }
}

fn complexity_score(features: &PartFeatures) -> f64 {
    let operations = if features.has_operations() {
        operations_complexity(&features.operations)
    } else {
        0.0
    };
    let finish = if features.has_finish() {
        finish_complexity(&features.finish)
    } else {
        0.0
    };
    // The 1.0 baseline stands for setup and handling every job carries.
    1.0 + size_factor(features.size_label) + operations + finish
}

/// How much smaller/simpler the query part is relative to the match, in
/// (0, 1]. A more complex query never scales above 1: the total must not
/// rise past the reference price.
pub fn scale_ratio(query: &PartFeatures, matched: &PartFeatures) -> f64 {
    let feature_ratio = complexity_score(query) / complexity_score(matched);
    let volume_ratio = match (query.volume_mm3, matched.volume_mm3) {
        // sqrt dampening: machining cost grows sublinearly with volume
        (Some(q), Some(m)) if m > 0.0 => (q / m).sqrt(),
        _ => 1.0,
    };
    (feature_ratio * volume_ratio).clamp(0.01, 1.0)
}

/// Anchor the total to the reference price. The one permitted divergence is
/// downward: when the scaled estimate falls below the business floor, the
/// floor becomes the total.
pub fn derived_total_cents(reference_cents: i64, ratio: f64, floor_cents: i64) -> (i64, bool) {
    let estimate = (reference_cents as f64 * ratio).round() as i64;
    if estimate < floor_cents {
        (floor_cents, true)
    } else {
        (reference_cents, false)
    }
}

/// Enforce every hard constraint on a proposal.
pub fn allocate(
    proposal: &Proposal,
    query: &PartFeatures,
    matched: &PartFeatures,
    reference_cents: i64,
    floor_cents: i64,
) -> Allocation {
    // Zero-fee rule: a category whose driving attribute is absent stays 0.
    let eligible = [true, true, query.has_operations(), query.has_finish()];

    let mut weights = proposal.weights();
    let eligible_sum: f64 = (0..4)
        .filter(|&i| eligible[i] && weights[i].is_finite() && weights[i] > 0.0)
        .map(|i| weights[i])
        .sum();
    if eligible_sum <= f64::EPSILON {
        // Degenerate proposal (e.g. a provider zeroing everything): fall
        // back to the rule-based weights.
        weights = propose(query).weights();
    }

    let ratio = scale_ratio(query, matched);
    let (total_cents, floor_applied) = derived_total_cents(reference_cents, ratio, floor_cents);
    if floor_applied {
        debug!(ratio, total_cents, "business floor applied");
    }

    let cents = distribute(total_cents, weights, eligible);
    Allocation {
        cents,
        total_cents,
        floor_applied,
    }
}

/// Proportional distribution with cap enforcement and largest-remainder
/// rounding. `eligible` must contain at least two `true` entries (base
/// material and size adjustment always qualify).
fn distribute(total_cents: i64, weights: [f64; 4], eligible: [bool; 4]) -> [i64; 4] {
    let mut w = weights;
    for i in 0..4 {
        if !eligible[i] || !w[i].is_finite() || w[i] < 0.0 {
            w[i] = 0.0;
        }
    }

    let sum: f64 = w.iter().sum();
    let mut shares = [0.0f64; 4];
    if sum <= f64::EPSILON {
        let n = eligible.iter().filter(|e| **e).count().max(1) as f64;
        for i in 0..4 {
            if eligible[i] {
                shares[i] = 1.0 / n;
            }
        }
    } else {
        for i in 0..4 {
            shares[i] = w[i] / sum;
        }
    }

    let shares = cap_shares(shares, eligible);
    round_to_cents(total_cents, shares, eligible)
}

/// Clamp shares at the category cap, spreading the excess across uncapped
/// eligible categories proportionally to their headroom.
fn cap_shares(mut shares: [f64; 4], eligible: [bool; 4]) -> [f64; 4] {
    for _ in 0..4 {
        let mut excess = 0.0;
        for i in 0..4 {
            if shares[i] > CATEGORY_CAP {
                excess += shares[i] - CATEGORY_CAP;
                shares[i] = CATEGORY_CAP;
            }
        }
        if excess <= 1e-9 {
            break;
        }

        let headroom: f64 = (0..4)
            .filter(|&i| eligible[i])
            .map(|i| CATEGORY_CAP - shares[i])
            .sum();
        if headroom <= f64::EPSILON {
            break;
        }
        for i in 0..4 {
            if eligible[i] && shares[i] < CATEGORY_CAP {
                shares[i] += excess * (CATEGORY_CAP - shares[i]) / headroom;
            }
        }
    }
    shares
}

fn round_to_cents(total_cents: i64, shares: [f64; 4], eligible: [bool; 4]) -> [i64; 4] {
    let cap_cents = ((total_cents as f64) * CATEGORY_CAP).floor() as i64;
    let cap_cents = cap_cents.max(1);

    let mut cents = [0i64; 4];
    let mut fractions: Vec<(usize, f64)> = Vec::with_capacity(4);
    for i in 0..4 {
        let exact = total_cents as f64 * shares[i];
        cents[i] = exact.floor() as i64;
        fractions.push((i, exact - exact.floor()));
    }

    fractions.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let mut remaining = total_cents - cents.iter().sum::<i64>();
    while remaining > 0 {
        let mut placed = false;
        for &(i, _) in &fractions {
            if remaining == 0 {
                break;
            }
            if eligible[i] && cents[i] < cap_cents {
                cents[i] += 1;
                remaining -= 1;
                placed = true;
            }
        }
        if !placed {
            // Every eligible category is at the cap; with two or more
            // eligible categories the caps sum past the total, so this only
            // guards against degenerate inputs.
            if let Some(i) = (0..4).find(|&i| eligible[i]) {
                cents[i] += remaining;
            }
            break;
        }
    }

    cents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(material: &str, size: &str, operations: &str, finish: &str) -> PartFeatures {
        PartFeatures::from_fields(material, size, operations, finish, None)
    }

    fn bracket() -> PartFeatures {
        features("Aluminum", "100x50x5", "drilling", "anodized")
    }

    #[test]
    fn test_allocation_sums_exactly() {
        let query = bracket();
        let allocation = allocate(&propose(&query), &query, &bracket(), 6000, 1000);

        assert_eq!(allocation.total_cents, 6000);
        assert_eq!(allocation.cents.iter().sum::<i64>(), 6000);
        assert!(!allocation.floor_applied);
    }

    #[test]
    fn test_same_features_keep_reference_total() {
        let query = bracket();
        let (total, floored) = derived_total_cents(6000, scale_ratio(&query, &bracket()), 1000);
        assert_eq!(total, 6000);
        assert!(!floored);
    }

    #[test]
    fn test_much_smaller_part_hits_floor() {
        let query = features("Aluminum", "10x5x0.5", "drilling", "anodized");
        let allocation = allocate(&propose(&query), &query, &bracket(), 6000, 1000);

        assert!(allocation.floor_applied);
        assert_eq!(allocation.total_cents, 1000);
        assert_eq!(allocation.cents.iter().sum::<i64>(), 1000);
    }

    #[test]
    fn test_more_complex_part_never_exceeds_reference() {
        let query = features(
            "Steel",
            "200x100x20",
            "drilling, milling, cnc machining",
            "anodized, polished",
        );
        let allocation = allocate(&propose(&query), &query, &bracket(), 6000, 1000);
        assert_eq!(allocation.total_cents, 6000);
    }

    #[test]
    fn test_zero_fee_rule() {
        let query = features("Plastic", "80x60x3", "none", "raw");
        let allocation = allocate(&propose(&query), &query, &bracket(), 6000, 1000);

        assert_eq!(allocation.cents[2], 0, "operations fee must be zero");
        assert_eq!(allocation.cents[3], 0, "finish fee must be zero");
        assert_eq!(allocation.cents.iter().sum::<i64>(), allocation.total_cents);
    }

    #[test]
    fn test_category_cap_enforced_on_lopsided_proposal() {
        let query = bracket();
        let lopsided = Proposal {
            base_material: 100.0,
            size_adjustment: 0.0,
            operations_fee: 0.0,
            finish_fee: 0.0,
            explanation: None,
        };
        let allocation = allocate(&lopsided, &query, &bracket(), 6000, 1000);

        let cap = (allocation.total_cents as f64 * CATEGORY_CAP) as i64;
        for (i, &cents) in allocation.cents.iter().enumerate() {
            assert!(cents <= cap, "category {i} at {cents} exceeds cap {cap}");
        }
        assert_eq!(allocation.cents.iter().sum::<i64>(), 6000);
    }

    #[test]
    fn test_cap_with_forced_zero_categories() {
        // Only base material and size adjustment are eligible; the split
        // must still respect the 60% cap.
        let query = features("Steel", "80x60x3", "none", "raw");
        let lopsided = Proposal {
            base_material: 100.0,
            size_adjustment: 0.0,
            operations_fee: 0.0,
            finish_fee: 0.0,
            explanation: None,
        };
        let allocation = allocate(&lopsided, &query, &bracket(), 6000, 1000);

        let cap = (allocation.total_cents as f64 * CATEGORY_CAP) as i64;
        assert!(allocation.cents[0] <= cap);
        assert_eq!(allocation.cents[2], 0);
        assert_eq!(allocation.cents[3], 0);
        assert_eq!(allocation.cents.iter().sum::<i64>(), allocation.total_cents);
    }

    #[test]
    fn test_degenerate_proposal_falls_back_to_rules() {
        let query = bracket();
        let empty = Proposal::default();
        let allocation = allocate(&empty, &query, &bracket(), 6000, 1000);

        assert_eq!(allocation.cents.iter().sum::<i64>(), 6000);
        assert!(allocation.cents[0] > 0, "base material should be funded");
    }

    #[test]
    fn test_low_reference_price_is_floored() {
        let query = bracket();
        let allocation = allocate(&propose(&query), &query, &bracket(), 500, 1000);
        assert!(allocation.floor_applied);
        assert_eq!(allocation.total_cents, 1000);
    }
}
