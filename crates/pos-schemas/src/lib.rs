//! pos-schemas
//!
//! Wire types shared by every screen: the order record served by the backend,
//! the POST body for new orders, queue stats and the analytics payload.
//!
//! Amounts are whole colones (`i64`). The backend stores prices as floats, so
//! decoding accepts `18000.0` and rounds; encoding always emits integers.

pub mod amount;
mod timestamp;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use amount::format_amount;
pub use timestamp::parse_timestamp;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while interpreting wire values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A status string that is not one of the five lifecycle states.
    UnknownStatus(String),
    /// A payment method string that is not CASH | CARD | OTHER.
    UnknownPaymentMethod(String),
    /// A `created_at` value that is neither RFC 3339 nor a naive ISO timestamp.
    InvalidTimestamp(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnknownStatus(s) => write!(
                f,
                "invalid status '{s}'. expected one of: PENDING | PREPARING | READY | COMPLETED | CANCELLED"
            ),
            SchemaError::UnknownPaymentMethod(s) => write!(
                f,
                "invalid payment method '{s}'. expected one of: CASH | CARD | OTHER"
            ),
            SchemaError::InvalidTimestamp(s) => write!(f, "invalid timestamp '{s}'"),
        }
    }
}

impl std::error::Error for SchemaError {}

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of an order. The backend owns every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Taken at the counter, not yet started.
    Pending,
    /// On the fryer.
    Preparing,
    /// Waiting for pickup.
    Ready,
    /// Picked up. **Terminal.**
    Completed,
    /// Abandoned. **Terminal.**
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "READY" => Ok(OrderStatus::Ready),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(SchemaError::UnknownStatus(other.to_string())),
        }
    }

    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Still in the kitchen queue (counts toward queue stats).
    pub fn is_in_queue(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PaymentMethod
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CARD" => Ok(PaymentMethod::Card),
            "OTHER" => Ok(PaymentMethod::Other),
            other => Err(SchemaError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// One line of an order, e.g. `2x Combo 8`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Unit price in colones.
    #[serde(with = "amount")]
    pub price: i64,
    /// Per-item prep time hint (15, 20, 25 or 30). Carried, never computed here.
    #[serde(
        rename = "prepTimeMinutes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub prep_time_minutes: Option<u32>,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, quantity: u32, price: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
            prep_time_minutes: None,
        }
    }

    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }
}

/// POST `/api/orders` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    #[serde(with = "amount")]
    pub total_price: i64,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    /// Operator-confirmed wait in minutes; `None` lets the backend decide.
    pub estimated_wait_time: Option<u32>,
}

/// An order as served by `GET /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Short display number shown on every screen (`#12`).
    pub order_number: u32,
    pub items: Vec<OrderItem>,
    #[serde(with = "amount")]
    pub total_price: i64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    /// Raw creation timestamp; see [`Order::created_at_utc`].
    pub created_at: String,
    /// Allotted preparation time in minutes.
    pub estimated_wait_time: u32,
}

impl Order {
    /// Customer name, if one was given. The backend stores "" for none.
    pub fn display_name(&self) -> Option<&str> {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn created_at_utc(&self) -> Result<DateTime<Utc>, SchemaError> {
        parse_timestamp(&self.created_at)
    }

    /// Allotted preparation time in seconds.
    pub fn allotted_secs(&self) -> u64 {
        u64::from(self.estimated_wait_time) * 60
    }

    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }
}

// ---------------------------------------------------------------------------
// Queue stats
// ---------------------------------------------------------------------------

/// `GET /api/queue-stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Minutes a new customer should expect to wait.
    pub total_estimated_wait_time: u32,
    pub active_orders_count: u32,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// `GET /api/analytics`. Monetary figures stay floats here: they are
/// server-side aggregates shown as-is, never fed back into an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub average_order_value: f64,
    /// Revenue keyed by hour of day (0-23).
    #[serde(default)]
    pub hourly_sales: BTreeMap<u32, f64>,
    /// Units sold for the five best sellers.
    #[serde(default)]
    pub top_items: BTreeMap<String, u64>,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
    #[serde(default)]
    pub status_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub payment_mix: BTreeMap<String, u64>,
    /// Revenue keyed by ISO date for the last seven trading days.
    #[serde(default)]
    pub daily_sales: BTreeMap<String, f64>,
    #[serde(default)]
    pub average_items_per_order: f64,
    /// Percentage of orders cancelled.
    #[serde(default)]
    pub cancel_rate: f64,
}

impl AnalyticsReport {
    /// Best sellers, most units first; ties by name.
    pub fn top_items_ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .top_items
            .iter()
            .map(|(name, units)| (name.as_str(), *units))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

// -----------------
// Tests
// -----------------
