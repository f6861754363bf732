//! Poll loop shared by the customer and kitchen displays.
//!
//! One task owns the screen model. Fetches and status PATCHes run as spawned
//! tasks and report back over an mpsc channel, so the owner is the only
//! writer. Each fetch carries a [`PollTicket`]; responses older than the last
//! applied one are dropped.
//!
//! ```text
//!   poll tick ──► spawn fetch(ticket) ──┐
//!   operator  ──► spawn PATCH ──────────┤──► events ──► apply / refetch ──► frame
//!   timer tick ───────────────────────────────────────────────────────────► frame
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pos_client::{ApiError, OrderApi};
use pos_config::PollingConfig;
use pos_lifecycle::{StatusAction, StatusUpdate, Surface};
use pos_schemas::{Order, QueueStats};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::notify::ReadyAlert;
use crate::sequencer::{PollSequencer, PollTicket};

// ---------------------------------------------------------------------------
// Model seam
// ---------------------------------------------------------------------------

/// One successful poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub orders: Vec<Order>,
    /// Present when the screen asked for queue stats.
    pub stats: Option<QueueStats>,
}

/// A screen that can be driven by [`ScreenDriver`].
pub trait ScreenModel {
    const SURFACE: Surface;

    /// Fetch queue stats alongside the order list.
    fn wants_queue_stats(&self) -> bool;

    /// Rebuild the view from a fresh snapshot; return orders worth a chime.
    fn apply(&mut self, snapshot: Snapshot) -> Vec<ReadyAlert>;

    fn render(&self, now: DateTime<Utc>) -> String;

    /// The live order behind a display number in the last applied snapshot.
    fn order_by_number(&self, order_number: u32) -> Option<&Order>;
}

/// Where frames and chimes go.
pub trait FrameSink {
    fn frame(&mut self, text: &str);
    fn chime(&mut self, alerts: &[ReadyAlert]);
    /// One-line operator feedback (rejected input, failed PATCH).
    fn notice(&mut self, text: &str);
}

/// Fetch the order list, plus queue stats when asked, concurrently. Both
/// must succeed for the snapshot to count.
pub async fn fetch_snapshot(api: &dyn OrderApi, with_stats: bool) -> Result<Snapshot, ApiError> {
    if with_stats {
        let (orders, stats) = tokio::try_join!(api.list_orders(), api.queue_stats())?;
        Ok(Snapshot {
            orders,
            stats: Some(stats),
        })
    } else {
        Ok(Snapshot {
            orders: api.list_orders().await?,
            stats: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Operator input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenInput {
    Action {
        action: StatusAction,
        order_number: u32,
    },
    /// Fetch now instead of waiting for the next tick.
    Refresh,
}

impl ScreenInput {
    /// `start 12`, `ready #12`, `clear 12`, `done 12`, `refresh`.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| "empty input".to_string())?;
        if verb.eq_ignore_ascii_case("refresh") || verb.eq_ignore_ascii_case("r") {
            return Ok(ScreenInput::Refresh);
        }
        let action =
            StatusAction::parse(verb).ok_or_else(|| format!("unknown command '{verb}'"))?;
        let raw = words
            .next()
            .ok_or_else(|| format!("usage: {verb} <order number>"))?;
        let order_number = raw
            .trim_start_matches('#')
            .parse::<u32>()
            .map_err(|_| format!("'{raw}' is not an order number"))?;
        Ok(ScreenInput::Action {
            action,
            order_number,
        })
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timer_tick: Duration,
}

impl PollSettings {
    pub fn from_config(cfg: &PollingConfig) -> Self {
        Self {
            interval: cfg.interval(),
            timer_tick: cfg.timer_tick(),
        }
    }
}

/// Counters for one screen session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub issued: u64,
    pub applied: u64,
    pub stale: u64,
    pub failed: u64,
    pub actions_sent: u64,
    pub actions_failed: u64,
}

#[derive(Debug)]
enum Event {
    Fetched {
        ticket: PollTicket,
        result: Result<Snapshot, ApiError>,
    },
    ActionDone {
        update: StatusUpdate,
        result: Result<Order, ApiError>,
    },
}

pub struct ScreenDriver<M> {
    model: M,
    api: Arc<dyn OrderApi>,
    sequencer: PollSequencer,
    report: PollReport,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl<M: ScreenModel> ScreenDriver<M> {
    pub fn new(model: M, api: Arc<dyn OrderApi>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            model,
            api,
            sequencer: PollSequencer::new(),
            report: PollReport::default(),
            events_tx,
            events_rx,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn report(&self) -> PollReport {
        self.report
    }

    /// Take a ticket and spawn the fetch.
    pub fn request_poll(&mut self) -> PollTicket {
        let ticket = self.sequencer.issue();
        self.report.issued += 1;

        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        let with_stats = self.model.wants_queue_stats();
        tokio::spawn(async move {
            let result = fetch_snapshot(api.as_ref(), with_stats).await;
            let _ = tx.send(Event::Fetched { ticket, result });
        });
        ticket
    }

    /// Apply a fetch result. Returns `true` when the view was rebuilt.
    ///
    /// Failures are logged and swallowed; stale responses are dropped. In both
    /// cases the previous view stays on screen.
    pub fn apply_fetch<S: FrameSink>(
        &mut self,
        ticket: PollTicket,
        result: Result<Snapshot, ApiError>,
        sink: &mut S,
    ) -> bool {
        let snapshot = match result {
            Ok(s) => s,
            Err(e) => {
                self.report.failed += 1;
                warn!(ticket = ticket.seq(), error = %e, "poll failed; keeping last view");
                return false;
            }
        };

        if !self.sequencer.accept(ticket) {
            self.report.stale += 1;
            debug!(
                ticket = ticket.seq(),
                last_applied = self.sequencer.last_applied().map(|t| t.seq()),
                "stale poll response dropped"
            );
            return false;
        }

        self.report.applied += 1;
        debug!(ticket = ticket.seq(), orders = snapshot.orders.len(), "poll applied");
        let alerts = self.model.apply(snapshot);
        if !alerts.is_empty() {
            sink.chime(&alerts);
        }
        sink.frame(&self.model.render(Utc::now()));
        true
    }

    /// Resolve an operator input and, for a status action, spawn the PATCH.
    /// Nothing is sent unless the screen offers that action for the order.
    pub fn handle_input<S: FrameSink>(&mut self, input: ScreenInput, sink: &mut S) -> Option<StatusUpdate> {
        let (action, order_number) = match input {
            ScreenInput::Refresh => {
                self.request_poll();
                return None;
            }
            ScreenInput::Action {
                action,
                order_number,
            } => (action, order_number),
        };

        let Some(order) = self.model.order_by_number(order_number) else {
            sink.notice(&format!("no active order #{order_number}"));
            return None;
        };
        let Some(update) = StatusUpdate::for_order(order, M::SURFACE, action) else {
            sink.notice(&format!(
                "#{order_number} is {}; {} is not available",
                order.status,
                action.label(M::SURFACE)
            ));
            return None;
        };

        info!(
            order_id = %update.order_id,
            order_number = update.order_number,
            target = %update.target(),
            "status change requested"
        );
        self.report.actions_sent += 1;

        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        let sent = update.clone();
        tokio::spawn(async move {
            let result = api.update_status(&sent.order_id, sent.target()).await;
            let _ = tx.send(Event::ActionDone {
                update: sent,
                result,
            });
        });
        Some(update)
    }

    fn on_action_done<S: FrameSink>(
        &mut self,
        update: StatusUpdate,
        result: Result<Order, ApiError>,
        sink: &mut S,
    ) {
        match result {
            Ok(order) => {
                info!(
                    order_id = %order.id,
                    order_number = order.order_number,
                    status = %order.status,
                    "status change accepted"
                );
            }
            Err(e) => {
                self.report.actions_failed += 1;
                warn!(order_id = %update.order_id, error = %e, "status change failed");
                sink.notice(&format!(
                    "#{}: could not set {}: {e}",
                    update.order_number,
                    update.target()
                ));
            }
        }
        // Refetch either way so the screen shows what the backend holds.
        self.request_poll();
    }

    /// Wait for and handle the next background result.
    pub async fn process_next_event<S: FrameSink>(&mut self, sink: &mut S) {
        if let Some(event) = self.events_rx.recv().await {
            self.dispatch(event, sink);
        }
    }

    fn dispatch<S: FrameSink>(&mut self, event: Event, sink: &mut S) {
        match event {
            Event::Fetched { ticket, result } => {
                self.apply_fetch(ticket, result, sink);
            }
            Event::ActionDone { update, result } => self.on_action_done(update, result, sink),
        }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run<S: FrameSink>(
        mut self,
        settings: PollSettings,
        mut inputs: mpsc::Receiver<ScreenInput>,
        mut shutdown: watch::Receiver<bool>,
        sink: &mut S,
    ) -> PollReport {
        let mut poll = tokio::time::interval(settings.interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut timer = tokio::time::interval(settings.timer_tick);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut inputs_open = true;

        info!(
            surface = ?M::SURFACE,
            interval_ms = settings.interval.as_millis() as u64,
            "screen started"
        );

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    self.request_poll();
                }
                _ = timer.tick() => {
                    sink.frame(&self.model.render(Utc::now()));
                }
                Some(event) = self.events_rx.recv() => {
                    self.dispatch(event, sink);
                }
                input = inputs.recv(), if inputs_open => match input {
                    Some(input) => {
                        self.handle_input(input, sink);
                    }
                    None => inputs_open = false,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(surface = ?M::SURFACE, report = ?self.report, "screen stopped");
        self.report
    }
}
