//! Text building blocks shared by the screens.

use chrono::{DateTime, Local, Utc};
use pos_schemas::Order;
use pos_timing::{countdown, ColorBand, TimerReading, TimerTheme, RING_DASH_ARRAY};
use tracing::warn;

/// Cells in the text stand-in for the progress ring.
pub const RING_CELLS: usize = 10;

const FULL: char = '█';
const EMPTY: char = '░';

/// The countdown inputs carried on a card: the allotted window and when it
/// opened. `created_at` is `None` when the backend sent a timestamp we could
/// not read; such cards show `--:--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTimer {
    pub total_secs: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderTimer {
    pub fn for_order(order: &Order) -> Self {
        let created_at = match order.created_at_utc() {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "unreadable created_at; timer hidden");
                None
            }
        };
        Self {
            total_secs: order.allotted_secs(),
            created_at,
        }
    }

    pub fn reading(&self, now: DateTime<Utc>, theme: &TimerTheme) -> Option<TimerReading> {
        self.created_at
            .map(|created| countdown(self.total_secs, created, now, theme))
    }

    /// `HH:MM` in local time, as printed on kitchen tickets.
    pub fn created_local_hm(&self) -> Option<String> {
        self.created_at
            .map(|ts| ts.with_timezone(&Local).format("%H:%M").to_string())
    }
}

/// Remaining time as a bar: full when the window just opened, empty when it
/// has run out.
pub fn ring_bar(reading: &TimerReading, cells: usize) -> String {
    let drained = reading.stroke_offset(RING_DASH_ARRAY) / RING_DASH_ARRAY;
    let remaining = (1.0 - drained).clamp(0.0, 1.0);
    let filled = (remaining * cells as f64).round() as usize;
    let mut out = String::with_capacity(cells * 3);
    out.extend(std::iter::repeat(FULL).take(filled));
    out.extend(std::iter::repeat(EMPTY).take(cells - filled));
    out
}

pub fn band_label(band: ColorBand) -> &'static str {
    match band {
        ColorBand::Expired => "OVERDUE",
        ColorBand::Critical => "hurry",
        ColorBand::Warning => "soon",
        ColorBand::OnTrack => "on track",
    }
}

/// `12:54 [██████░░░░] soon`, or `--:-- [░░░░░░░░░░]` without a reading.
pub fn timer_cell(reading: Option<TimerReading>) -> String {
    match reading {
        Some(r) => format!(
            "{:>5} [{}] {}",
            r.clock_text(),
            ring_bar(&r, RING_CELLS),
            band_label(r.band)
        ),
        None => format!(
            "--:-- [{}]",
            std::iter::repeat(EMPTY).take(RING_CELLS).collect::<String>()
        ),
    }
}

pub fn heading(title: &str) -> String {
    format!("=== {title} ===")
}
