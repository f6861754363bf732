use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, Timelike};
use pos_client::{ApiError, OrderApi};
use pos_schemas::{
    AnalyticsReport, NewOrder, Order, OrderItem, OrderStatus, PaymentMethod, QueueStats,
};
use pos_timing::estimate_wait_minutes;
use tracing::debug;

/// Highest display number before the counter rolls back to 1.
pub const MAX_ORDER_NUMBER: u32 = 99;

/// Share of the summed queue waits quoted to a new customer.
const QUEUE_OVERLAP_FACTOR: f64 = 0.7;

/// Pieces the backend assumes for unrecognised item names.
const SERVER_FALLBACK_PIECES: u32 = 4;

/// In-memory stand-in for the order backend. Test use only.
///
/// Mirrors the real service's observable behaviour: sequential display
/// numbers rolling over after 99, server-side wait estimation when the client
/// sends none, queue stats over PENDING/PREPARING orders, 404 on unknown ids.
/// Failures and delays can be queued per call to exercise the poll loop.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    orders: Vec<Order>,
    next_id: u64,
    posted: Vec<NewOrder>,
    status_calls: Vec<(String, OrderStatus)>,
    list_calls: u64,
    list_failures: u32,
    list_delays: VecDeque<Duration>,
    create_failures: u32,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert an order directly, bypassing POST. Returns the stored order.
    pub fn seed(&self, mut order: Order) -> Order {
        let mut st = self.lock();
        if order.id.is_empty() {
            order.id = st.fresh_id();
        }
        st.orders.push(order.clone());
        order
    }

    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    pub fn order(&self, id: &str) -> Option<Order> {
        self.lock().orders.iter().find(|o| o.id == id).cloned()
    }

    /// Move an order as another screen would, without recording a call.
    pub fn force_status(&self, id: &str, status: OrderStatus) -> bool {
        let mut st = self.lock();
        match st.orders.iter_mut().find(|o| o.id == id) {
            Some(o) => {
                o.status = status;
                true
            }
            None => false,
        }
    }

    /// Every POST body received, in order.
    pub fn posted(&self) -> Vec<NewOrder> {
        self.lock().posted.clone()
    }

    /// Every PATCH received, in order.
    pub fn status_calls(&self) -> Vec<(String, OrderStatus)> {
        self.lock().status_calls.clone()
    }

    pub fn list_calls(&self) -> u64 {
        self.lock().list_calls
    }

    /// Fail the next `n` order-list fetches with a transport error.
    pub fn fail_next_lists(&self, n: u32) {
        self.lock().list_failures = n;
    }

    /// Fail the next `n` POSTs with a 500.
    pub fn fail_next_creates(&self, n: u32) {
        self.lock().create_failures = n;
    }

    /// Delay the next order-list fetch. The response still reflects the data
    /// at the moment the call arrived, like a slow network would.
    pub fn delay_next_list(&self, delay: Duration) {
        self.lock().list_delays.push_back(delay);
    }
}

impl State {
    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:08x}", self.next_id)
    }

    fn next_order_number(&self) -> u32 {
        match self.orders.last() {
            None => 1,
            Some(last) if last.order_number >= MAX_ORDER_NUMBER => 1,
            Some(last) => last.order_number + 1,
        }
    }
}

/// The backend's own piece count: case-insensitive and with a larger
/// fallback than the counter's estimate.
pub fn server_pieces(items: &[OrderItem]) -> u32 {
    items
        .iter()
        .map(|item| {
            let name = item.name.to_lowercase();
            let per_unit = if name.contains('4') {
                4
            } else if name.contains('8') {
                8
            } else if name.contains("12") {
                12
            } else if name.contains("16") {
                16
            } else if name.contains("personal") {
                2
            } else if name.contains("familiar") {
                8
            } else {
                SERVER_FALLBACK_PIECES
            };
            per_unit * item.quantity
        })
        .sum()
}

pub fn server_wait_minutes(items: &[OrderItem]) -> u32 {
    estimate_wait_minutes(server_pieces(items))
}

pub fn queue_stats_of(orders: &[Order]) -> QueueStats {
    let active: Vec<&Order> = orders.iter().filter(|o| o.status.is_in_queue()).collect();
    let summed: u32 = active.iter().map(|o| o.estimated_wait_time).sum();
    QueueStats {
        total_estimated_wait_time: (f64::from(summed) * QUEUE_OVERLAP_FACTOR) as u32,
        active_orders_count: active.len() as u32,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn analytics_of(orders: &[Order]) -> AnalyticsReport {
    let mut status_counts: BTreeMap<String, u64> = OrderStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let mut payment_mix: BTreeMap<String, u64> =
        [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Other]
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();
    let mut revenue = 0.0;
    let mut items_sold: BTreeMap<String, u64> = BTreeMap::new();
    let mut hourly_sales: BTreeMap<u32, f64> = BTreeMap::new();
    let mut daily_sales: BTreeMap<String, f64> = BTreeMap::new();
    let mut total_items = 0u64;

    for o in orders {
        *status_counts.entry(o.status.as_str().to_string()).or_default() += 1;
        *payment_mix.entry(o.payment_method.as_str().to_string()).or_default() += 1;
        if o.status == OrderStatus::Cancelled {
            continue;
        }
        let amount = o.total_price as f64;
        revenue += amount;

        let created = NaiveDateTime::parse_from_str(&o.created_at, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| o.created_at_utc().ok().map(|ts| ts.with_timezone(&Local).naive_local()));
        if let Some(ts) = created {
            *hourly_sales.entry(ts.hour()).or_default() += amount;
            *daily_sales.entry(ts.date().to_string()).or_default() += amount;
        }

        for item in &o.items {
            *items_sold.entry(item.name.clone()).or_default() += u64::from(item.quantity);
            total_items += u64::from(item.quantity);
        }
    }

    let mut ranked: Vec<(String, u64)> = items_sold.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(5);

    let keep_from = daily_sales.len().saturating_sub(7);
    let daily_sales: BTreeMap<String, f64> = daily_sales.into_iter().skip(keep_from).collect();

    let total = orders.len() as u64;
    let per_order = |v: f64| if total > 0 { round2(v / total as f64) } else { 0.0 };
    let cancelled = status_counts
        .get(OrderStatus::Cancelled.as_str())
        .copied()
        .unwrap_or(0);

    AnalyticsReport {
        total_revenue: revenue,
        total_orders: total,
        average_order_value: per_order(revenue),
        hourly_sales,
        top_items: ranked.into_iter().collect(),
        recent_orders: orders.iter().rev().take(10).rev().cloned().collect(),
        status_counts,
        payment_mix,
        daily_sales,
        average_items_per_order: per_order(total_items as f64),
        cancel_rate: if total > 0 {
            round2(cancelled as f64 / total as f64 * 100.0)
        } else {
            0.0
        },
    }
}

#[async_trait]
impl OrderApi for FakeBackend {
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let (result, delay) = {
            let mut st = self.lock();
            st.list_calls += 1;
            let delay = st.list_delays.pop_front();
            if st.list_failures > 0 {
                st.list_failures -= 1;
                (Err(ApiError::Transport("connection refused".into())), delay)
            } else {
                (Ok(st.orders.clone()), delay)
            }
        };
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        result
    }

    async fn queue_stats(&self) -> Result<QueueStats, ApiError> {
        Ok(queue_stats_of(&self.lock().orders))
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<Order, ApiError> {
        let mut st = self.lock();
        st.status_calls.push((order_id.to_string(), status));
        match st.orders.iter_mut().find(|o| o.id == order_id) {
            Some(o) => {
                o.status = status;
                debug!(order_id, status = %status, "fake backend status updated");
                Ok(o.clone())
            }
            None => Err(ApiError::Status {
                code: 404,
                body: "{\"detail\":\"Order not found\"}".into(),
            }),
        }
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let mut st = self.lock();
        st.posted.push(order.clone());
        if st.create_failures > 0 {
            st.create_failures -= 1;
            return Err(ApiError::Status {
                code: 500,
                body: "Internal Server Error".into(),
            });
        }

        let estimated_wait_time = match order.estimated_wait_time {
            Some(m) if m > 0 => m,
            _ => server_wait_minutes(&order.items),
        };
        let created = Order {
            id: st.fresh_id(),
            order_number: st.next_order_number(),
            items: order.items.clone(),
            total_price: order.total_price,
            payment_method: order.payment_method,
            customer_name: Some(order.customer_name.clone().unwrap_or_default()),
            status: OrderStatus::Pending,
            created_at: Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            estimated_wait_time,
        };
        st.orders.push(created.clone());
        Ok(created)
    }

    async fn analytics(&self) -> Result<AnalyticsReport, ApiError> {
        Ok(analytics_of(&self.lock().orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::order;

    fn body(items: Vec<OrderItem>, wait: Option<u32>) -> NewOrder {
        let total = items.iter().map(OrderItem::line_total).sum();
        NewOrder {
            items,
            total_price: total,
            payment_method: PaymentMethod::Cash,
            customer_name: None,
            estimated_wait_time: wait,
        }
    }

    #[tokio::test]
    async fn numbers_roll_over_after_99() {
        let fake = FakeBackend::new();
        let seeded = fake.seed(order("", 98, OrderStatus::Completed));
        assert!(!seeded.id.is_empty());

        let a = fake.create_order(&body(vec![OrderItem::new("Soda", 1, 1_000)], None)).await.unwrap();
        let b = fake.create_order(&body(vec![OrderItem::new("Soda", 1, 1_000)], None)).await.unwrap();
        assert_eq!(a.order_number, 99);
        assert_eq!(b.order_number, 1);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn server_estimates_when_client_sends_none() {
        let fake = FakeBackend::new();
        // Soda falls back to 4 pieces server-side: 3 sodas = 12 pieces.
        let o = fake
            .create_order(&body(vec![OrderItem::new("Soda", 3, 1_000)], Some(0)))
            .await
            .unwrap();
        assert_eq!(o.estimated_wait_time, 20);
        assert_eq!(o.customer_name.as_deref(), Some(""));

        let explicit = fake
            .create_order(&body(vec![OrderItem::new("Soda", 3, 1_000)], Some(7)))
            .await
            .unwrap();
        assert_eq!(explicit.estimated_wait_time, 7);
    }

    #[test]
    fn server_piece_count_is_case_insensitive() {
        assert_eq!(server_pieces(&[OrderItem::new("PERSONAL", 2, 1)]), 4);
        assert_eq!(server_pieces(&[OrderItem::new("combo 16", 1, 1)]), 16);
        assert_eq!(server_wait_minutes(&[OrderItem::new("Combo 16", 1, 1), OrderItem::new("Fries", 1, 1)]), 24);
    }

    #[test]
    fn queue_stats_scale_active_waits() {
        let mut a = order("a", 1, OrderStatus::Pending);
        a.estimated_wait_time = 15;
        let mut b = order("b", 2, OrderStatus::Preparing);
        b.estimated_wait_time = 20;
        let c = order("c", 3, OrderStatus::Ready);
        let stats = queue_stats_of(&[a, b, c]);
        assert_eq!(stats.active_orders_count, 2);
        // int(35 * 0.7)
        assert_eq!(stats.total_estimated_wait_time, 24);
        assert_eq!(queue_stats_of(&[]), QueueStats::default());
    }

    #[tokio::test]
    async fn unknown_id_is_404() {
        let fake = FakeBackend::new();
        let err = fake.update_status("nope", OrderStatus::Ready).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fake.status_calls().len(), 1);
    }

    #[test]
    fn analytics_skip_cancelled_revenue() {
        let mut paid = order("a", 1, OrderStatus::Completed);
        paid.total_price = 18_000;
        let mut dropped = order("b", 2, OrderStatus::Cancelled);
        dropped.total_price = 5_000;
        let report = analytics_of(&[paid, dropped]);

        assert_eq!(report.total_orders, 2);
        assert_eq!(report.total_revenue, 18_000.0);
        assert_eq!(report.average_order_value, 9_000.0);
        assert_eq!(report.cancel_rate, 50.0);
        assert_eq!(report.status_counts["CANCELLED"], 1);
        assert_eq!(report.top_items_ranked()[0], ("Combo 8", 2));
        assert_eq!(report.recent_orders.len(), 2);
    }
}
