//! Market data access for CallTrack
//!
//! Thin shim over an external market-data provider: spot quotes with
//! fundamentals, expiration dates, option chains and daily closes.
//!
//! # Core Components
//!
//! - [`provider`] - the [`MarketDataProvider`] trait and an in-memory [`StaticProvider`]
//! - [`yahoo`] - Yahoo Finance implementation over `reqwest`
//! - [`types`] - quotes, strikes, option side
//! - [`sanitize`] - missing/NaN/inf normalization applied at the boundary
//!
//! # Key Invariants
//!
//! - Nothing is cached here; every call is an upstream round trip
//! - Every number leaving this crate is finite (or an explicit `None`)
//! - Strikes are compared through [`StrikeKey`] (integer cents), never `f64 ==`

pub mod error;
pub mod provider;
pub mod sanitize;
pub mod types;
pub mod yahoo;

pub use error::MarketDataError;
pub use provider::{MarketDataProvider, StaticProvider};
pub use sanitize::{finite, mid_price, or_zero, sanitize};
pub use types::{
    find_by_strike, parse_date, OptionQuote, OptionSide, PricePoint, RawOptionQuote, StrikeKey,
    TickerQuote,
};
pub use yahoo::{YahooConfig, YahooProvider};

pub type Result<T> = std::result::Result<T, MarketDataError>;
