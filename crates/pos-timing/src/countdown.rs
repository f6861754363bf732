//! Countdown on an order's allotted prep window.
//!
//! One pure function, [`countdown`], turns `(total, created_at, now)` into a
//! [`TimerReading`]. Screens decide how a reading looks through their own
//! [`TimerTheme`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Circumference of the r=36 progress ring the displays draw.
pub const RING_DASH_ARRAY: f64 = 226.0;

// ---------------------------------------------------------------------------
// Bands and themes
// ---------------------------------------------------------------------------

/// Colour band a timer falls into. Mapping to actual colours is per screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBand {
    /// Remaining time is zero.
    Expired,
    Critical,
    Warning,
    OnTrack,
}

impl ColorBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorBand::Expired => "expired",
            ColorBand::Critical => "critical",
            ColorBand::Warning => "warning",
            ColorBand::OnTrack => "on_track",
        }
    }
}

/// Remaining time strictly below `below_secs` selects `band`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandRule {
    pub below_secs: u64,
    pub band: ColorBand,
}

/// A screen's band thresholds. Rules are checked tightest first; anything
/// above every threshold is [`ColorBand::OnTrack`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimerTheme {
    /// Give a finished countdown its own band instead of the tightest rule's.
    #[serde(default)]
    pub expired_band: bool,
    pub bands: Vec<BandRule>,
}

impl TimerTheme {
    /// Three bands: red under a minute, orange under five, green otherwise.
    pub fn customer() -> Self {
        Self {
            expired_band: false,
            bands: vec![
                BandRule {
                    below_secs: 60,
                    band: ColorBand::Critical,
                },
                BandRule {
                    below_secs: 300,
                    band: ColorBand::Warning,
                },
            ],
        }
    }

    /// Customer bands plus a distinct overdue band for the line cooks.
    pub fn kitchen() -> Self {
        Self {
            expired_band: true,
            ..Self::customer()
        }
    }

    pub fn band_for(&self, remaining_ms: u64) -> ColorBand {
        if self.expired_band && remaining_ms == 0 {
            return ColorBand::Expired;
        }
        let mut rules: Vec<&BandRule> = self.bands.iter().collect();
        rules.sort_by_key(|r| r.below_secs);
        rules
            .into_iter()
            .find(|r| remaining_ms < r.below_secs.saturating_mul(1000))
            .map(|r| r.band)
            .unwrap_or(ColorBand::OnTrack)
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Derived display state for one tick. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerReading {
    pub total_secs: u64,
    /// Clamped to `[0, total]`.
    pub remaining_ms: u64,
    /// 0.0 at creation, 1.0 once the window has elapsed.
    pub fraction_complete: f64,
    pub band: ColorBand,
}

impl TimerReading {
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms / 1000
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_ms == 0
    }

    /// `m:ss`, minutes unpadded.
    pub fn clock_text(&self) -> String {
        let secs = self.remaining_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    /// Stroke offset for a ring of circumference `dash_array`: 0 when full,
    /// `dash_array` when empty.
    pub fn stroke_offset(&self, dash_array: f64) -> f64 {
        dash_array * self.fraction_complete
    }
}

/// Remaining time on a `total_secs` window opened at `created_at`.
///
/// A `created_at` in the future (clock skew between hosts) reads as a full
/// window. A zero-length window reads as already complete.
pub fn countdown(
    total_secs: u64,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    theme: &TimerTheme,
) -> TimerReading {
    let total_ms = total_secs.saturating_mul(1000);
    let elapsed_ms = (now - created_at).num_milliseconds();

    let remaining_ms = if elapsed_ms <= 0 {
        total_ms
    } else {
        total_ms.saturating_sub(elapsed_ms as u64)
    };

    let fraction_complete = if total_ms == 0 {
        1.0
    } else {
        1.0 - (remaining_ms as f64 / total_ms as f64)
    };

    TimerReading {
        total_secs,
        remaining_ms,
        fraction_complete,
        band: theme.band_for(remaining_ms),
    }
}
