//! Option neighbor comparisons for CallTrack
//!
//! Given a target expiration or strike, find the adjacent listed entries and
//! package their quotes for side-by-side comparison.
//!
//! # Core Components
//!
//! - [`neighbor`] - exact-or-nearest index lookup with boundary-aware neighbors
//! - [`context`] - [`OptionsComparator`], a per-request view over one ticker
//! - [`comparison`] - date mode and strike mode
//! - [`chain`] - full chain filtered to a band around the current price
//! - [`contract`] - single contract detail with breakeven
//! - [`summary`] - stock price summary
//! - `api` - axum HTTP surface (feature `api`)

pub mod chain;
pub mod comparison;
pub mod context;
pub mod contract;
pub mod error;
pub mod neighbor;
pub mod summary;

#[cfg(feature = "api")]
pub mod api;

pub use chain::{strike_band, within_band, ChainDate, ChainStrike, FullChain, DEFAULT_CHAIN_BAND};
pub use comparison::{Comparison, ComparisonMode, QuoteData, SeriesEntry};
pub use context::OptionsComparator;
pub use contract::{breakeven, ContractDetail, ContractQuote, CONTRACT_MULTIPLIER};
pub use error::ComparatorError;
pub use neighbor::{find_neighbors, Axis, Neighbors, Slot};
pub use summary::PriceSummary;

/// Result type for comparator operations
pub type Result<T> = std::result::Result<T, ComparatorError>;
