//! Scenario: counter order end to end
//!
//! # Invariants under test
//!
//! 1. Two "Combo 8" at ₡9,000 paid in cash reach the backend as one line of
//!    quantity 2, total ₡18,000, with the pre-filled 20 minute wait.
//! 2. The receipt carries the backend's display number and the cart is
//!    emptied only after the backend accepted the order.
//! 3. A rejected POST leaves the cart untouched so the operator can retry.
//! 4. The submitted order shows on the kitchen ticket list and in the
//!    customer screen's PREPARING column with the backend's queue stats.

use std::sync::Arc;

use pos_client::OrderApi;
use pos_schemas::OrderStatus;
use pos_screens::{
    CustomerScreen, KitchenScreen, ScreenDriver, StaffCommand, StaffReply, StaffSession,
};
use pos_testkit::{default_assets, default_config, FakeBackend, RecordingSink};
use pos_timing::TimerTheme;

async fn staff(session: &mut StaffSession, api: &dyn OrderApi, line: &str) -> StaffReply {
    let cmd = StaffCommand::parse(line).unwrap();
    session.execute(cmd, api).await.unwrap()
}

#[tokio::test]
async fn two_combo_eights_become_one_line() {
    let cfg = default_config().unwrap();
    let backend = Arc::new(FakeBackend::new());
    let mut session = StaffSession::new(cfg.menu.clone(), default_assets().unwrap());

    staff(&mut session, backend.as_ref(), "add Combo 8").await;
    staff(&mut session, backend.as_ref(), "add combo 8").await;
    assert_eq!(session.cart().total(), 18_000);

    let reply = staff(&mut session, backend.as_ref(), "pay cash name Ana").await;
    let StaffReply::Submitted(receipt) = reply else {
        panic!("expected a receipt, got {reply:?}");
    };
    assert_eq!(receipt.order_number, 1);
    assert_eq!(receipt.wait_minutes, 20);
    assert!(session.cart().is_empty());

    let posted = backend.posted();
    assert_eq!(posted.len(), 1);
    let body = &posted[0];
    assert_eq!(body.total_price, 18_000);
    assert_eq!(body.items.len(), 1);
    assert_eq!(body.items[0].name, "Combo 8");
    assert_eq!(body.items[0].quantity, 2);
    assert_eq!(body.items[0].price, 9_000);
    assert_eq!(body.estimated_wait_time, Some(20));

    let stored = backend.orders();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, OrderStatus::Pending);
    assert_eq!(stored[0].display_name(), Some("Ana"));
}

#[tokio::test]
async fn submitted_order_reaches_both_displays() {
    let cfg = default_config().unwrap();
    let backend = Arc::new(FakeBackend::new());
    let mut session = StaffSession::new(cfg.menu.clone(), default_assets().unwrap());
    staff(&mut session, backend.as_ref(), "add 2x Combo 8").await;
    staff(&mut session, backend.as_ref(), "add Fries").await;
    staff(&mut session, backend.as_ref(), "pay card").await;

    let api: Arc<dyn OrderApi> = backend.clone();

    let mut kitchen = ScreenDriver::new(
        KitchenScreen::new(default_assets().unwrap(), TimerTheme::kitchen()),
        Arc::clone(&api),
    );
    let mut ksink = RecordingSink::new();
    kitchen.request_poll();
    kitchen.process_next_event(&mut ksink).await;
    let frame = ksink.last_frame().unwrap();
    assert!(frame.contains("#1"), "{frame}");
    assert!(frame.contains("2x Combo 8  [combo_8]"), "{frame}");
    assert!(frame.contains("1x Fries  🍟"), "{frame}");
    assert!(frame.contains("> START 1"), "{frame}");

    let mut customer = ScreenDriver::new(
        CustomerScreen::new(default_assets().unwrap(), TimerTheme::customer()),
        api,
    );
    let mut csink = RecordingSink::new();
    customer.request_poll();
    customer.process_next_event(&mut csink).await;
    let frame = csink.last_frame().unwrap();
    // 16 + 2 pieces quoted 22 min; queue stats report int(22 * 0.7).
    assert!(frame.contains("Estimated wait: 15 min"), "{frame}");
    assert_eq!(customer.model().view().unwrap().preparing.len(), 1);
}

#[tokio::test]
async fn rejected_submission_keeps_cart() {
    let cfg = default_config().unwrap();
    let backend = Arc::new(FakeBackend::new());
    backend.fail_next_creates(1);
    let mut session = StaffSession::new(cfg.menu.clone(), default_assets().unwrap());
    staff(&mut session, backend.as_ref(), "add 2x Combo 8").await;

    let cmd = StaffCommand::parse("pay cash").unwrap();
    let err = session.execute(cmd, backend.as_ref()).await.unwrap_err();
    assert!(err.to_string().contains("500"), "{err}");
    assert_eq!(session.cart().total(), 18_000);
    assert!(backend.orders().is_empty());

    // Retry goes through and gets the first number.
    let reply = staff(&mut session, backend.as_ref(), "pay cash").await;
    assert!(matches!(reply, StaffReply::Submitted(ref r) if r.order_number == 1));
    assert!(session.cart().is_empty());
    assert_eq!(backend.posted().len(), 2);
}
