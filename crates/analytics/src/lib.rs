//! # Tradebook Analytics
//!
//! Derives the numbers the journal displays from the trade ledger.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate with no knowledge of storage, HTTP or
//!   configuration. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** `AnalyticsEngine` takes a slice of trades and returns
//!   plain report values. Open positions (no realized P/L) never contribute.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: summary statistics, per-day P/L buckets and the equity curve.
//! - `TradeStats`, `DailyPnl`, `EquityPoint`: the report values.
//! - `AnalyticsError`: the errors this crate can return.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{DailyPnl, EquityPoint, TradeStats};
