//! pos-timing
//!
//! The two pieces of arithmetic every screen shares:
//! - [`estimate`]: the counter's wait-time guess from piece counts.
//! - [`countdown`]: remaining time on an order's allotted prep window.
//!
//! Both are pure; callers supply `now`.

pub mod countdown;
pub mod estimate;

pub use countdown::{countdown, BandRule, ColorBand, TimerReading, TimerTheme, RING_DASH_ARRAY};
pub use estimate::{estimate_wait_minutes, pieces_for_item, resolve_wait_time, total_pieces, WaitEstimate};
