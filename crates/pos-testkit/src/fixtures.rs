//! Ready-made values for tests.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use pos_config::{load_layered_yaml_from_strings, PosConfig, DEFAULTS_YAML};
use pos_schemas::{Order, OrderItem, OrderStatus, PaymentMethod};
use pos_screens::{AssetCatalog, FrameSink, ReadyAlert};

/// A two-piece-combo order (`2x Combo 8`, ₡18,000, 20 min) created now.
pub fn order(id: &str, order_number: u32, status: OrderStatus) -> Order {
    order_created_at(id, order_number, status, Utc::now())
}

pub fn order_created_at(
    id: &str,
    order_number: u32,
    status: OrderStatus,
    created_at: DateTime<Utc>,
) -> Order {
    Order {
        id: id.to_string(),
        order_number,
        items: vec![OrderItem::new("Combo 8", 2, 9_000)],
        total_price: 18_000,
        payment_method: PaymentMethod::Cash,
        customer_name: Some(String::new()),
        status,
        // Naive local time, the way the backend writes it.
        created_at: created_at
            .with_timezone(&Local)
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
        estimated_wait_time: 20,
    }
}

/// Built-in defaults, typed and validated.
pub fn default_config() -> Result<PosConfig> {
    load_layered_yaml_from_strings(&[DEFAULTS_YAML])?.typed()
}

pub fn default_assets() -> Result<AssetCatalog> {
    Ok(AssetCatalog::from_config(&default_config()?.assets))
}

/// A [`FrameSink`] that keeps everything it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<String>,
    pub chimes: Vec<ReadyAlert>,
    pub notices: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    pub fn chimed_numbers(&self) -> Vec<u32> {
        self.chimes.iter().map(|a| a.order_number).collect()
    }
}

impl FrameSink for RecordingSink {
    fn frame(&mut self, text: &str) {
        self.frames.push(text.to_string());
    }

    fn chime(&mut self, alerts: &[ReadyAlert]) {
        self.chimes.extend_from_slice(alerts);
    }

    fn notice(&mut self, text: &str) {
        self.notices.push(text.to_string());
    }
}
