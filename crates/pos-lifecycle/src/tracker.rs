use std::collections::HashMap;

use pos_schemas::{Order, OrderStatus};
use tracing::warn;

use crate::{classify, TransitionKind};

/// A status change seen between two applied snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedTransition {
    pub order_id: String,
    pub order_number: u32,
    /// `None` when the order was not in the previous snapshot.
    pub from: Option<OrderStatus>,
    pub to: OrderStatus,
    pub kind: TransitionKind,
}

impl ObservedTransition {
    /// `true` when this observation is the order arriving in `status`.
    pub fn entered(&self, status: OrderStatus) -> bool {
        self.to == status && self.from != Some(status)
    }
}

/// Last-seen status per order id, carried across polls.
///
/// Only orders present in the latest snapshot are remembered, so memory
/// tracks the backend's list rather than the screen's lifetime.
#[derive(Debug, Default)]
pub struct StatusTracker {
    last: HashMap<String, OrderStatus>,
    snapshots: u64,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots observed so far.
    pub fn snapshots(&self) -> u64 {
        self.snapshots
    }

    pub fn last_status(&self, order_id: &str) -> Option<OrderStatus> {
        self.last.get(order_id).copied()
    }

    /// Fold a fresh snapshot in and report every order whose status differs
    /// from what was seen before (including orders seen for the first time).
    pub fn observe(&mut self, orders: &[Order]) -> Vec<ObservedTransition> {
        let mut next: HashMap<String, OrderStatus> = HashMap::with_capacity(orders.len());
        let mut out = Vec::new();

        for order in orders {
            let from = self.last.get(&order.id).copied();
            next.insert(order.id.clone(), order.status);

            let kind = match from {
                Some(prev) => classify(prev, order.status),
                None => TransitionKind::Forward,
            };
            if kind == TransitionKind::Unchanged {
                continue;
            }
            if kind == TransitionKind::Backward {
                warn!(
                    order_id = %order.id,
                    order_number = order.order_number,
                    from = ?from,
                    to = %order.status,
                    "backend moved order status backward"
                );
            }

            out.push(ObservedTransition {
                order_id: order.id.clone(),
                order_number: order.order_number,
                from,
                to: order.status,
                kind,
            });
        }

        self.last = next;
        self.snapshots += 1;
        out
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
    fn first_snapshot_reports_every_order_as_new() {
        let mut t = StatusTracker::new();
        let seen = t.observe(&[order("a", 1, OrderStatus::Pending), order("b", 2, OrderStatus::Ready)]);
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|o| o.from.is_none()));
        assert!(seen[1].entered(OrderStatus::Ready));
        assert_eq!(t.snapshots(), 1);
    }

    #[test]
    fn unchanged_orders_are_quiet() {
        let mut t = StatusTracker::new();
        let snap = [order("a", 1, OrderStatus::Preparing)];
        t.observe(&snap);
        assert!(t.observe(&snap).is_empty());
        assert!(t.observe(&snap).is_empty());
    }

    #[test]
    fn reports_forward_and_backward_moves() {
        let mut t = StatusTracker::new();
        t.observe(&[order("a", 1, OrderStatus::Preparing)]);

        let fwd = t.observe(&[order("a", 1, OrderStatus::Ready)]);
        assert_eq!(fwd.len(), 1);
        assert_eq!(fwd[0].kind, TransitionKind::Forward);
        assert!(fwd[0].entered(OrderStatus::Ready));

        let back = t.observe(&[order("a", 1, OrderStatus::Preparing)]);
        assert_eq!(back[0].kind, TransitionKind::Backward);
        assert_eq!(back[0].from, Some(OrderStatus::Ready));
    }

    #[test]
    fn vanished_orders_are_forgotten() {
        let mut t = StatusTracker::new();
        t.observe(&[order("a", 1, OrderStatus::Ready)]);
        assert_eq!(t.last_status("a"), Some(OrderStatus::Ready));

        t.observe(&[]);
        assert_eq!(t.last_status("a"), None);
    }
}
