//! Order lifecycle as the screens see it.
//!
//! # Design
//!
//! The backend owns every transition. Screens only decide which buttons to
//! offer for an order's current status and fire a PATCH when an operator
//! presses one; they never validate legality themselves.
//!
//! ```text
//!   PENDING ──START──► PREPARING ──READY──► READY ──CLEAR/DONE──► COMPLETED
//!      │                   │                  │
//!      └───────────────────┴──────────────────┴──► CANCELLED (side exit)
//! ```
//!
//! Between polls the [`StatusTracker`] compares snapshots and classifies what
//! it sees. A backward move is logged, never acted on.

mod tracker;

use pos_schemas::{Order, OrderStatus};

pub use tracker::{ObservedTransition, StatusTracker};

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// Which screen is asking. Each offers a different set of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Customer,
    Kitchen,
}

// ---------------------------------------------------------------------------
// StatusAction
// ---------------------------------------------------------------------------

/// An operator action that requests a status change from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusAction {
    /// PENDING → PREPARING.
    Start,
    /// PREPARING → READY.
    MarkReady,
    /// READY → COMPLETED.
    Complete,
    /// Any live state → CANCELLED. Modelled; no screen offers it today.
    Cancel,
}

impl StatusAction {
    /// Status the backend is asked to move the order to.
    pub fn target(&self) -> OrderStatus {
        match self {
            StatusAction::Start => OrderStatus::Preparing,
            StatusAction::MarkReady => OrderStatus::Ready,
            StatusAction::Complete => OrderStatus::Completed,
            StatusAction::Cancel => OrderStatus::Cancelled,
        }
    }

    /// Button caption on a given screen.
    pub fn label(&self, surface: Surface) -> &'static str {
        match (self, surface) {
            (StatusAction::Start, _) => "START",
            (StatusAction::MarkReady, _) => "READY",
            (StatusAction::Complete, Surface::Kitchen) => "CLEAR",
            (StatusAction::Complete, Surface::Customer) => "DONE",
            (StatusAction::Cancel, _) => "CANCEL",
        }
    }

    /// Parse an operator keyword (`start`, `ready`, `clear`, `done`, ...).
    pub fn parse(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "start" => Some(StatusAction::Start),
            "ready" => Some(StatusAction::MarkReady),
            "clear" | "done" | "complete" => Some(StatusAction::Complete),
            "cancel" => Some(StatusAction::Cancel),
            _ => None,
        }
    }
}

/// Actions a screen offers for an order in `status`.
pub fn offered_actions(surface: Surface, status: OrderStatus) -> &'static [StatusAction] {
    use OrderStatus::*;

    match (surface, status) {
        (Surface::Kitchen, Pending) => &[StatusAction::Start],
        (Surface::Kitchen, Preparing) => &[StatusAction::MarkReady],
        (Surface::Kitchen, Ready) => &[StatusAction::Complete],
        (Surface::Customer, Ready) => &[StatusAction::Complete],
        (Surface::Customer, Pending | Preparing) => &[],
        (_, Completed | Cancelled) => &[],
    }
}

// ---------------------------------------------------------------------------
// StatusUpdate
// ---------------------------------------------------------------------------

/// A PATCH the client is about to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub order_id: String,
    pub order_number: u32,
    pub action: StatusAction,
}

impl StatusUpdate {
    /// Build the request for a button press, or `None` when `surface` does
    /// not show that button for the order's current status.
    pub fn for_order(order: &Order, surface: Surface, action: StatusAction) -> Option<Self> {
        if !offered_actions(surface, order.status).contains(&action) {
            return None;
        }
        Some(Self {
            order_id: order.id.clone(),
            order_number: order.order_number,
            action,
        })
    }

    pub fn target(&self) -> OrderStatus {
        self.action.target()
    }
}

// ---------------------------------------------------------------------------
// Transition classification
// ---------------------------------------------------------------------------

/// How an observed status change relates to the forward-only lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Unchanged,
    /// Further along the main line (steps may be skipped between polls).
    Forward,
    /// Into CANCELLED from a live state.
    SideExit,
    /// Anything else, including leaving a terminal state.
    Backward,
}

/// Position on the main line. CANCELLED is off the line.
fn rank(status: OrderStatus) -> Option<u8> {
    match status {
        OrderStatus::Pending => Some(0),
        OrderStatus::Preparing => Some(1),
        OrderStatus::Ready => Some(2),
        OrderStatus::Completed => Some(3),
        OrderStatus::Cancelled => None,
    }
}

pub fn classify(from: OrderStatus, to: OrderStatus) -> TransitionKind {
    if from == to {
        return TransitionKind::Unchanged;
    }
    if from.is_terminal() {
        return TransitionKind::Backward;
    }
    if to == OrderStatus::Cancelled {
        return TransitionKind::SideExit;
    }
    match (rank(from), rank(to)) {
        (Some(a), Some(b)) if b > a => TransitionKind::Forward,
        _ => TransitionKind::Backward,
    }
}

// -----------------
// Tests
// -----------------
