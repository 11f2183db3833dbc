//! # quotx Quote
//!
//! Constrained quote derivation: given a query part's engineered features and
//! the closest historical part with its reference price, produce a
//! four-category breakdown that is internally consistent, bounded, and
//! anchored to the reference price.
//!
//! The design splits derivation into two steps:
//!
//! 1. **Proposal** — raw category weights and a rationale, from the
//!    deterministic [`allocator`] or from an injected
//!    [`Completion`](quotx_providers::Completion) provider seeded with worked
//!    examples ([`prompt`]).
//! 2. **Enforcement** — the allocator re-derives amounts in integer cents so
//!    the hard constraints hold regardless of the proposal: total anchored to
//!    the reference (business floor aside), zero fees for absent attributes,
//!    the 60% category cap, and cent-exact summation.

pub mod allocator;
pub mod breakdown;
pub mod engine;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod rank;

pub use allocator::{Allocation, Proposal};
pub use breakdown::{QuoteBreakdown, BUSINESS_FLOOR_CHF, CATEGORY_CAP};
pub use engine::{QuoteEngine, ReferencePart};
pub use error::QuoteError;
pub use parse::parse_breakdown;
pub use prompt::quote_prompt;
