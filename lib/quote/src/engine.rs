//! Quote derivation: propose, then enforce.
//!
//! The proposal step is pluggable (rule-based allocator or an injected
//! reasoning provider); the enforcement step is always the deterministic
//! allocator, so the hard constraints hold no matter what the provider
//! returned.

use crate::allocator::{self, Allocation, Proposal};
use crate::breakdown::{QuoteBreakdown, BUSINESS_FLOOR_CHF};
use crate::error::QuoteError;
use crate::parse::parse_breakdown;
use crate::prompt::quote_prompt;
use quotx_features::PartFeatures;
use quotx_providers::Completion;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_FLOOR_CENTS: i64 = (BUSINESS_FLOOR_CHF * 100.0) as i64;

/// The matched historical part a quote is anchored to.
#[derive(Debug, Clone)]
pub struct ReferencePart {
    /// The stored document of the match, shown to the reasoning provider.
    pub document: String,
    pub features: PartFeatures,
    pub reference_price: f64,
}

/// Derives a constrained breakdown for a query part against a reference.
pub struct QuoteEngine {
    completion: Option<Arc<dyn Completion>>,
    floor_cents: i64,
}

impl QuoteEngine {
    /// Engine using only the deterministic allocator.
    pub fn rule_based() -> Self {
        Self {
            completion: None,
            floor_cents: DEFAULT_FLOOR_CENTS,
        }
    }

    /// Engine that asks a reasoning provider for the distribution, then
    /// enforces the constraints on whatever comes back.
    pub fn with_completion(completion: Arc<dyn Completion>) -> Self {
        Self {
            completion: Some(completion),
            floor_cents: DEFAULT_FLOOR_CENTS,
        }
    }

    /// Override the business floor (in whole cents).
    #[must_use]
    pub fn with_floor_cents(mut self, floor_cents: i64) -> Self {
        self.floor_cents = floor_cents.max(0);
        self
    }

    /// Produce the breakdown for `query` anchored to `reference`.
    ///
    /// Fails with [`QuoteError::MissingReferencePrice`] when the match has
    /// no usable price, [`QuoteError::Provider`] on provider failure, or
    /// [`QuoteError::UnparseableResponse`] when the provider text does not
    /// parse. Never retries; the caller owns that decision.
    pub fn derive(
        &self,
        query_text: &str,
        query: &PartFeatures,
        reference: &ReferencePart,
    ) -> Result<QuoteBreakdown, QuoteError> {
        let reference_cents =
            to_cents(reference.reference_price).ok_or(QuoteError::MissingReferencePrice)?;

        let proposal = match &self.completion {
            Some(provider) => {
                let prompt = quote_prompt(
                    query_text,
                    &reference.document,
                    &reference.features,
                    reference.reference_price,
                );
                let raw = provider.complete(&prompt)?;
                debug!(bytes = raw.len(), "received provider proposal");
                Proposal::from_breakdown(&parse_breakdown(&raw)?)
            }
            None => allocator::propose(query),
        };

        let allocation = allocator::allocate(
            &proposal,
            query,
            &reference.features,
            reference_cents,
            self.floor_cents,
        );

        let explanation = proposal
            .explanation
            .as_deref()
            .map(first_line)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.synthesize_explanation(&allocation));

        let breakdown = QuoteBreakdown {
            base_material: chf(allocation.cents[0]),
            size_adjustment: chf(allocation.cents[1]),
            operations_fee: chf(allocation.cents[2]),
            finish_fee: chf(allocation.cents[3]),
            total_quote: chf(allocation.total_cents),
            explanation,
        };

        breakdown.validate()?;
        Ok(breakdown)
    }

    fn synthesize_explanation(&self, allocation: &Allocation) -> String {
        if allocation.floor_applied {
            return format!(
                "Part is much smaller or simpler than the reference, so the CHF {} minimum charge covers setup and handling.",
                chf(allocation.total_cents)
            );
        }

        const DRIVERS: [&str; 4] = [
            "base material",
            "size adjustment",
            "machining operations",
            "surface finish",
        ];
        let mut order: Vec<usize> = (0..4).collect();
        order.sort_by(|&a, &b| allocation.cents[b].cmp(&allocation.cents[a]).then(a.cmp(&b)));

        let top = order[0];
        let second = order[1];
        // Name a second driver when it carries a comparable share.
        if allocation.cents[second] * 4 >= allocation.cents[top] * 3 && allocation.cents[second] > 0
        {
            format!(
                "Price is driven mainly by {} and {}.",
                DRIVERS[top], DRIVERS[second]
            )
        } else {
            format!("Price is driven mainly by {}.", DRIVERS[top])
        }
    }
}

fn to_cents(price: f64) -> Option<i64> {
    if price.is_finite() && price > 0.0 {
        Some((price * 100.0).round() as i64)
    } else {
        None
    }
}

fn chf(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}
