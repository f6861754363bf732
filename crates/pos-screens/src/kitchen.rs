//! Kitchen display: one ticket per live order with the button for its next
//! step.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use pos_lifecycle::{offered_actions, StatusAction, StatusTracker, Surface};
use pos_schemas::{Order, OrderStatus};
use pos_timing::TimerTheme;

use crate::assets::AssetCatalog;
use crate::notify::ReadyAlert;
use crate::poller::{ScreenModel, Snapshot};
use crate::render::{heading, timer_cell, OrderTimer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketLine {
    pub quantity: u32,
    pub name: String,
    pub badge: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KitchenTicket {
    pub order_id: String,
    pub order_number: u32,
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub timer: OrderTimer,
    /// Units across all lines.
    pub item_count: u32,
    pub lines: Vec<TicketLine>,
    pub actions: &'static [StatusAction],
}

/// Live orders, lowest number first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KitchenView {
    pub tickets: Vec<KitchenTicket>,
}

impl KitchenView {
    pub fn build(orders: &[Order], assets: &AssetCatalog) -> Self {
        let mut tickets: Vec<KitchenTicket> = orders
            .iter()
            .filter(|o| !o.status.is_terminal())
            .map(|o| KitchenTicket {
                order_id: o.id.clone(),
                order_number: o.order_number,
                customer_name: o.display_name().map(str::to_string),
                status: o.status,
                timer: OrderTimer::for_order(o),
                item_count: o.item_count(),
                lines: o
                    .items
                    .iter()
                    .map(|i| TicketLine {
                        quantity: i.quantity,
                        name: i.name.clone(),
                        badge: assets.badge_for_item(&i.name),
                    })
                    .collect(),
                actions: offered_actions(Surface::Kitchen, o.status),
            })
            .collect();
        tickets.sort_by_key(|t| t.order_number);
        Self { tickets }
    }

    pub fn render(&self, now: DateTime<Utc>, theme: &TimerTheme) -> String {
        if self.tickets.is_empty() {
            return "No active orders\n".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", heading(&format!("KITCHEN ({} active)", self.tickets.len())));
        for t in &self.tickets {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "#{:<3} {:<16} [{:<9}] {:<9} {}",
                t.order_number,
                t.customer_name.as_deref().unwrap_or(""),
                t.status.as_str(),
                item_count_label(t.item_count),
                timer_cell(t.timer.reading(now, theme))
            );
            for line in &t.lines {
                let badge = if line.badge.is_empty() {
                    String::new()
                } else {
                    format!("  {}", line.badge)
                };
                let _ = writeln!(out, "     {}x {}{}", line.quantity, line.name, badge);
            }

            let mut footer = Vec::new();
            if t.status == OrderStatus::Ready {
                footer.push("WAITING PICKUP".to_string());
            }
            for a in t.actions {
                footer.push(format!("> {} {}", a.label(Surface::Kitchen), t.order_number));
            }
            if let Some(hm) = t.timer.created_local_hm() {
                footer.push(format!("Created {hm}"));
            }
            let _ = writeln!(out, "     {}", footer.join("   "));
        }
        out
    }
}

fn item_count_label(count: u32) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}

/// Kitchen screen state owned by the poll loop.
pub struct KitchenScreen {
    assets: AssetCatalog,
    theme: TimerTheme,
    orders: Vec<Order>,
    view: Option<KitchenView>,
    tracker: StatusTracker,
}

impl KitchenScreen {
    pub fn new(assets: AssetCatalog, theme: TimerTheme) -> Self {
        Self {
            assets,
            theme,
            orders: Vec::new(),
            view: None,
            tracker: StatusTracker::new(),
        }
    }

    pub fn view(&self) -> Option<&KitchenView> {
        self.view.as_ref()
    }
}

impl ScreenModel for KitchenScreen {
    const SURFACE: Surface = Surface::Kitchen;

    fn wants_queue_stats(&self) -> bool {
        false
    }

    fn apply(&mut self, snapshot: Snapshot) -> Vec<ReadyAlert> {
        // Observed only so backward moves get logged; the kitchen never chimes.
        self.tracker.observe(&snapshot.orders);
        self.view = Some(KitchenView::build(&snapshot.orders, &self.assets));
        self.orders = snapshot.orders;
        Vec::new()
    }

    fn render(&self, now: DateTime<Utc>) -> String {
        match &self.view {
            Some(view) => view.render(now, &self.theme),
            None => "Connecting to order service...\n".to_string(),
        }
    }

    fn order_by_number(&self, order_number: u32) -> Option<&Order> {
        self.orders
            .iter()
            .find(|o| o.order_number == order_number && !o.status.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pos_config::AssetConfig;
    use pos_schemas::{OrderItem, PaymentMethod};

    fn order(id: &str, n: u32, status: OrderStatus) -> Order {
        Order {
            id: id.into(),
            order_number: n,
            items: vec![OrderItem::new("Combo 8", 2, 9_000)],
            total_price: 18_000,
            payment_method: PaymentMethod::Card,
            customer_name: None,
            status,
            created_at: "2025-01-10T12:00:00Z".into(),
            estimated_wait_time: 20,
        }
    }

    fn assets() -> AssetCatalog {
        let mut cfg = AssetConfig::default();
        cfg.images
            .insert("Combo 8".into(), "/static/images/combo_8.png".into());
        AssetCatalog::from_config(&cfg)
    }

    #[test]
    fn active_orders_sorted_by_number() {
        let orders = vec![
            order("c", 9, OrderStatus::Ready),
            order("a", 2, OrderStatus::Pending),
            order("x", 1, OrderStatus::Completed),
            order("b", 4, OrderStatus::Preparing),
            order("y", 3, OrderStatus::Cancelled),
        ];
        let view = KitchenView::build(&orders, &assets());
        let numbers: Vec<u32> = view.tickets.iter().map(|t| t.order_number).collect();
        assert_eq!(numbers, vec![2, 4, 9]);

        assert_eq!(view.tickets[0].actions, &[StatusAction::Start]);
        assert_eq!(view.tickets[1].actions, &[StatusAction::MarkReady]);
        assert_eq!(view.tickets[2].actions, &[StatusAction::Complete]);
        assert_eq!(view.tickets[0].lines[0].badge, "[combo_8]");
        assert_eq!(view.tickets[0].item_count, 2);
    }

    #[test]
    fn render_ticket_details() {
        let orders = vec![order("a", 2, OrderStatus::Pending), order("c", 9, OrderStatus::Ready)];
        let view = KitchenView::build(&orders, &assets());
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 12, 25, 0).unwrap();
        let text = view.render(now, &TimerTheme::kitchen());

        assert!(text.contains("KITCHEN (2 active)"), "{text}");
        assert!(text.contains("[PENDING"));
        assert!(text.contains("[PENDING  ] 2 items"), "{text}");
        assert!(text.contains("2x Combo 8  [combo_8]"), "{text}");
        assert!(text.contains("> START 2"));
        assert!(text.contains("WAITING PICKUP"));
        assert!(text.contains("> CLEAR 9"));
        // 20 minute window, 25 minutes in.
        assert!(text.contains("OVERDUE"), "{text}");
        assert!(text.contains("Created "));
    }

    #[test]
    fn empty_kitchen_placeholder() {
        let view = KitchenView::build(&[order("x", 1, OrderStatus::Completed)], &assets());
        assert_eq!(view.render(Utc::now(), &TimerTheme::kitchen()), "No active orders\n");
    }

    #[test]
    fn screen_never_chimes() {
        let mut screen = KitchenScreen::new(assets(), TimerTheme::kitchen());
        screen.apply(Snapshot {
            orders: vec![order("a", 1, OrderStatus::Preparing)],
            stats: None,
        });
        let alerts = screen.apply(Snapshot {
            orders: vec![order("a", 1, OrderStatus::Ready)],
            stats: None,
        });
        assert!(alerts.is_empty());
        assert_eq!(screen.order_by_number(1).map(|o| o.status), Some(OrderStatus::Ready));
    }
}
