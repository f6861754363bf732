//! Customer display: what is cooking, what is ready, how long a new order
//! would wait.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use pos_lifecycle::Surface;
use pos_schemas::{Order, OrderStatus, QueueStats};
use pos_timing::TimerTheme;

use crate::assets::AssetCatalog;
use crate::notify::{ReadyAlert, ReadyNotifier};
use crate::poller::{ScreenModel, Snapshot};
use crate::render::{heading, timer_cell, OrderTimer};

#[derive(Debug, Clone, PartialEq)]
pub struct PreparingCard {
    pub order_id: String,
    pub order_number: u32,
    pub customer_name: Option<String>,
    pub timer: OrderTimer,
    /// One badge per item line that has an image.
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyCard {
    pub order_id: String,
    pub order_number: u32,
    pub customer_name: Option<String>,
    pub badges: Vec<String>,
}

/// Built from scratch on every applied snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerView {
    /// PENDING and PREPARING orders, in backend order.
    pub preparing: Vec<PreparingCard>,
    pub ready: Vec<ReadyCard>,
    pub stats: QueueStats,
}

fn badges(order: &Order, assets: &AssetCatalog) -> Vec<String> {
    order
        .items
        .iter()
        .map(|i| assets.badge_for_item(&i.name))
        .filter(|b| !b.is_empty())
        .collect()
}

impl CustomerView {
    pub fn build(orders: &[Order], stats: QueueStats, assets: &AssetCatalog) -> Self {
        let mut view = CustomerView {
            stats,
            ..Default::default()
        };
        for order in orders {
            let customer_name = order.display_name().map(str::to_string);
            match order.status {
                OrderStatus::Pending | OrderStatus::Preparing => view.preparing.push(PreparingCard {
                    order_id: order.id.clone(),
                    order_number: order.order_number,
                    customer_name,
                    timer: OrderTimer::for_order(order),
                    badges: badges(order, assets),
                }),
                OrderStatus::Ready => view.ready.push(ReadyCard {
                    order_id: order.id.clone(),
                    order_number: order.order_number,
                    customer_name,
                    badges: badges(order, assets),
                }),
                OrderStatus::Completed | OrderStatus::Cancelled => {}
            }
        }
        view
    }

    pub fn render(&self, now: DateTime<Utc>, theme: &TimerTheme) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Estimated wait: {} min   ({} in queue)",
            self.stats.total_estimated_wait_time, self.stats.active_orders_count
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "{}", heading("PREPARING"));
        if self.preparing.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for card in &self.preparing {
            let _ = writeln!(
                out,
                "  #{:<3} {:<16} {}",
                card.order_number,
                card.customer_name.as_deref().unwrap_or(""),
                timer_cell(card.timer.reading(now, theme))
            );
            if !card.badges.is_empty() {
                let _ = writeln!(out, "        {}", card.badges.join(" "));
            }
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "{}", heading("READY"));
        if self.ready.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for card in &self.ready {
            let _ = writeln!(
                out,
                "  #{:<3} {:<16} PLEASE COLLECT",
                card.order_number,
                card.customer_name.as_deref().unwrap_or("")
            );
            if !card.badges.is_empty() {
                let _ = writeln!(out, "        {}", card.badges.join(" "));
            }
        }
        out
    }
}

/// Customer screen state owned by the poll loop.
pub struct CustomerScreen {
    assets: AssetCatalog,
    theme: TimerTheme,
    orders: Vec<Order>,
    view: Option<CustomerView>,
    notifier: ReadyNotifier,
}

impl CustomerScreen {
    pub fn new(assets: AssetCatalog, theme: TimerTheme) -> Self {
        Self {
            assets,
            theme,
            orders: Vec::new(),
            view: None,
            notifier: ReadyNotifier::new(),
        }
    }

    pub fn view(&self) -> Option<&CustomerView> {
        self.view.as_ref()
    }
}

impl ScreenModel for CustomerScreen {
    const SURFACE: Surface = Surface::Customer;

    fn wants_queue_stats(&self) -> bool {
        true
    }

    fn apply(&mut self, snapshot: Snapshot) -> Vec<ReadyAlert> {
        let alerts = self.notifier.observe(&snapshot.orders);
        let stats = snapshot.stats.unwrap_or_default();
        self.view = Some(CustomerView::build(&snapshot.orders, stats, &self.assets));
        self.orders = snapshot.orders;
        alerts
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
