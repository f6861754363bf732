//! Ready chime for the customer display.

use pos_lifecycle::StatusTracker;
use pos_schemas::{Order, OrderStatus};
use tracing::{debug, info};

/// One chime: an order that just became collectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyAlert {
    pub order_id: String,
    pub order_number: u32,
}

/// Decides when to chime.
///
/// The first snapshot only primes the notifier: orders already READY when the
/// screen starts are not announced. After that every order id entering READY
/// chimes exactly once, including an order first seen already READY.
#[derive(Debug, Default)]
pub struct ReadyNotifier {
    tracker: StatusTracker,
}

impl ReadyNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_primed(&self) -> bool {
        self.tracker.snapshots() > 0
    }

    pub fn observe(&mut self, orders: &[Order]) -> Vec<ReadyAlert> {
        let priming = !self.is_primed();
        let transitions = self.tracker.observe(orders);

        if priming {
            debug!(orders = orders.len(), "ready notifier primed");
            return Vec::new();
        }

        let alerts: Vec<ReadyAlert> = transitions
            .into_iter()
            .filter(|t| t.entered(OrderStatus::Ready))
            .map(|t| ReadyAlert {
                order_id: t.order_id,
                order_number: t.order_number,
            })
            .collect();

        for a in &alerts {
            info!(order_id = %a.order_id, order_number = a.order_number, "order ready");
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pos_schemas::PaymentMethod;

    fn order(id: &str, number: u32, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            order_number: number,
            items: vec![],
            total_price: 0,
            payment_method: PaymentMethod::Cash,
            customer_name: None,
            status,
            created_at: "2025-01-10T12:00:00Z".to_string(),
            estimated_wait_time: 15,
        }
    }

    #[test]
    fn startup_snapshot_does_not_chime() {
        let mut n = ReadyNotifier::new();
        assert!(!n.is_primed());
        assert!(n.observe(&[order("a", 1, OrderStatus::Ready)]).is_empty());
        assert!(n.is_primed());
    }

    #[test]
    fn chimes_once_per_order_entering_ready() {
        let mut n = ReadyNotifier::new();
        n.observe(&[order("a", 1, OrderStatus::Preparing)]);

        let alerts = n.observe(&[order("a", 1, OrderStatus::Ready)]);
        assert_eq!(
            alerts,
            vec![ReadyAlert {
                order_id: "a".into(),
                order_number: 1
            }]
        );

        for _ in 0..5 {
            assert!(n.observe(&[order("a", 1, OrderStatus::Ready)]).is_empty());
        }
    }

    #[test]
    fn order_first_seen_ready_after_priming_chimes() {
        let mut n = ReadyNotifier::new();
        n.observe(&[]);
        let alerts = n.observe(&[order("b", 2, OrderStatus::Ready)]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].order_number, 2);
    }

    #[test]
    fn other_transitions_are_silent() {
        let mut n = ReadyNotifier::new();
        n.observe(&[order("a", 1, OrderStatus::Pending)]);
        assert!(n.observe(&[order("a", 1, OrderStatus::Preparing)]).is_empty());
        n.observe(&[order("a", 1, OrderStatus::Ready)]);
        assert!(n.observe(&[order("a", 1, OrderStatus::Completed)]).is_empty());
        assert!(n.observe(&[]).is_empty());
    }
}
