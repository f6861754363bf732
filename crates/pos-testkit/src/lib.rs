//! pos-testkit
//!
//! Test doubles for the order backend plus fixtures, and the end-to-end
//! scenarios under `tests/` that drive the screens against them without a
//! network.

mod backend;
pub mod fixtures;

pub use backend::{
    analytics_of, queue_stats_of, server_pieces, server_wait_minutes, FakeBackend,
    MAX_ORDER_NUMBER,
};
pub use fixtures::{default_assets, default_config, order, order_created_at, RecordingSink};
