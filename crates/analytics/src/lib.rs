//! # Dugout Analytics
//!
//! Turns raw counting stats into the rate stats a player actually reads:
//! AVG, OBP, SLG and OPS for batting; ERA, WHIP, K/BB and BAA for pitching.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of storage or
//!   the web. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** `StatsCalculator` sums a slice of records into totals
//!   and derives formatted rates from those totals. No operation fails: every
//!   zero denominator produces the fixed zero string (`"0.000"` or `"0.00"`).
//!
//! ## Public API
//!
//! - `StatsCalculator`: aggregation and every rate formula.
//! - `AggregateBattingTotals` / `AggregatePitchingTotals`: field-wise sums.
//! - `DerivedBattingMetrics` / `DerivedPitchingMetrics` / `StatSummary`: formatted output.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod report;
pub mod totals;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{INFINITE_RATIO, StatsCalculator};
pub use report::{DerivedBattingMetrics, DerivedPitchingMetrics, StatSummary};
pub use totals::{AggregateBattingTotals, AggregatePitchingTotals};
