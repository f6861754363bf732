//! Scenario: ready chime fires once per order
//!
//! # Invariants under test
//!
//! 1. Orders already READY on the first applied snapshot do not chime.
//! 2. An order moving PREPARING → READY chimes exactly once, however many
//!    polls later observe it READY.
//! 3. An order that leaves the snapshot and comes back READY under a reused
//!    number chimes again.

use std::sync::Arc;

use pos_client::OrderApi;
use pos_schemas::OrderStatus;
use pos_screens::{CustomerScreen, ScreenDriver};
use pos_testkit::{default_assets, order, FakeBackend, RecordingSink};
use pos_timing::TimerTheme;

fn customer_driver(backend: &Arc<FakeBackend>) -> ScreenDriver<CustomerScreen> {
    let api: Arc<dyn OrderApi> = backend.clone();
    ScreenDriver::new(
        CustomerScreen::new(default_assets().unwrap(), TimerTheme::customer()),
        api,
    )
}

async fn poll(driver: &mut ScreenDriver<CustomerScreen>, sink: &mut RecordingSink) {
    driver.request_poll();
    driver.process_next_event(sink).await;
}

#[tokio::test]
async fn initial_ready_orders_stay_silent() {
    let backend = Arc::new(FakeBackend::new());
    backend.seed(order("a", 1, OrderStatus::Ready));
    backend.seed(order("b", 2, OrderStatus::Ready));

    let mut driver = customer_driver(&backend);
    let mut sink = RecordingSink::new();
    poll(&mut driver, &mut sink).await;
    poll(&mut driver, &mut sink).await;

    assert!(sink.chimes.is_empty());
    assert_eq!(sink.frames.len(), 2);
    assert!(sink.last_frame().unwrap().contains("PLEASE COLLECT"));
}

#[tokio::test]
async fn transition_to_ready_chimes_once() {
    let backend = Arc::new(FakeBackend::new());
    backend.seed(order("a", 1, OrderStatus::Preparing));
    backend.seed(order("b", 2, OrderStatus::Pending));

    let mut driver = customer_driver(&backend);
    let mut sink = RecordingSink::new();
    poll(&mut driver, &mut sink).await;
    assert!(sink.chimes.is_empty());

    backend.force_status("a", OrderStatus::Ready);
    for _ in 0..4 {
        poll(&mut driver, &mut sink).await;
    }
    assert_eq!(sink.chimed_numbers(), vec![1]);
    assert_eq!(driver.report().applied, 5);

    let view = driver.model().view().unwrap();
    assert_eq!(view.ready.len(), 1);
    assert_eq!(view.preparing.len(), 1);
    assert_eq!(view.stats.active_orders_count, 1);
}

#[tokio::test]
async fn reappearing_order_chimes_again() {
    let backend = Arc::new(FakeBackend::new());
    backend.seed(order("a", 5, OrderStatus::Preparing));

    let mut driver = customer_driver(&backend);
    let mut sink = RecordingSink::new();
    poll(&mut driver, &mut sink).await;

    backend.force_status("a", OrderStatus::Ready);
    poll(&mut driver, &mut sink).await;
    assert_eq!(sink.chimed_numbers(), vec![5]);

    // Collected, then a new order with the same display number is cooked.
    backend.force_status("a", OrderStatus::Completed);
    poll(&mut driver, &mut sink).await;
    backend.seed(order("z", 5, OrderStatus::Preparing));
    poll(&mut driver, &mut sink).await;
    backend.force_status("z", OrderStatus::Ready);
    poll(&mut driver, &mut sink).await;

    assert_eq!(sink.chimed_numbers(), vec![5, 5]);
    assert_eq!(sink.chimes[1].order_id, "z");
}
