//! Wait-time heuristic used to pre-fill the counter's wait field.
//!
//! Non-authoritative: the operator may overwrite the number, and whatever is
//! submitted is what the backend keeps.

/// Minutes quoted for small orders.
pub const BASELINE_WAIT_MINUTES: u32 = 15;
/// Minutes quoted once the order exceeds [`BUSY_PIECES_THRESHOLD`].
pub const BUSY_WAIT_MINUTES: u32 = 20;
pub const BUSY_PIECES_THRESHOLD: u32 = 8;
/// Past this many pieces every extra piece adds a minute.
pub const LARGE_PIECES_THRESHOLD: u32 = 16;

/// Pieces assumed for names that match nothing in [`PIECE_TABLE`].
pub const FALLBACK_PIECES: u32 = 2;

/// Name substrings and the chicken pieces they imply, checked in order.
/// Matching is case-sensitive on the display name.
const PIECE_TABLE: &[(&str, u32)] = &[
    ("4", 4),
    ("8", 8),
    ("12", 12),
    ("16", 16),
    ("Personal", 2),
    ("Familiar", 8),
];

/// Pieces in one unit of the named item.
pub fn pieces_for_item(name: &str) -> u32 {
    PIECE_TABLE
        .iter()
        .find(|(needle, _)| name.contains(needle))
        .map(|(_, pieces)| *pieces)
        .unwrap_or(FALLBACK_PIECES)
}

/// Total pieces across `(name, quantity)` lines.
pub fn total_pieces<'a, I>(lines: I) -> u32
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    lines
        .into_iter()
        .map(|(name, qty)| pieces_for_item(name).saturating_mul(qty))
        .fold(0u32, u32::saturating_add)
}

pub fn estimate_wait_minutes(pieces: u32) -> u32 {
    if pieces > LARGE_PIECES_THRESHOLD {
        BUSY_WAIT_MINUTES.saturating_add(pieces - LARGE_PIECES_THRESHOLD)
    } else if pieces > BUSY_PIECES_THRESHOLD {
        BUSY_WAIT_MINUTES
    } else {
        BASELINE_WAIT_MINUTES
    }
}

/// Value sent to the backend: the operator's number when they typed a
/// positive one, otherwise the heuristic.
pub fn resolve_wait_time(operator: Option<u32>, heuristic: u32) -> u32 {
    match operator {
        Some(m) if m > 0 => m,
        _ => heuristic,
    }
}

/// Pieces and the minutes they imply, shown together on the payment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitEstimate {
    pub pieces: u32,
    pub minutes: u32,
}

impl WaitEstimate {
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let pieces = total_pieces(lines);
        Self {
            pieces,
            minutes: estimate_wait_minutes(pieces),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_lookup_order_matters() {
        assert_eq!(pieces_for_item("Combo 4"), 4);
        assert_eq!(pieces_for_item("Combo 8"), 8);
        assert_eq!(pieces_for_item("Combo 12"), 12);
        assert_eq!(pieces_for_item("Combo 16"), 16);
        assert_eq!(pieces_for_item("Personal"), 2);
        assert_eq!(pieces_for_item("Familiar"), 8);
        assert_eq!(pieces_for_item("Soda"), FALLBACK_PIECES);
        // "4" is checked before anything else.
        assert_eq!(pieces_for_item("Custom (₡14,000)"), 4);
        // Case-sensitive.
        assert_eq!(pieces_for_item("personal"), FALLBACK_PIECES);
    }

    #[test]
    fn threshold_edges() {
        assert_eq!(estimate_wait_minutes(0), 15);
        assert_eq!(estimate_wait_minutes(8), 15);
        assert_eq!(estimate_wait_minutes(9), 20);
        assert_eq!(estimate_wait_minutes(16), 20);
        assert_eq!(estimate_wait_minutes(17), 21);
        assert_eq!(estimate_wait_minutes(20), 24);
    }

    #[test]
    fn huge_orders_saturate() {
        assert_eq!(estimate_wait_minutes(u32::MAX), u32::MAX);

        let est = WaitEstimate::from_lines([("Combo 8", 600_000_000)]);
        assert_eq!(est.pieces, u32::MAX);
        assert_eq!(est.minutes, u32::MAX);
    }

    #[test]
    fn pieces_scale_with_quantity() {
        let est = WaitEstimate::from_lines([("Combo 8", 2), ("Soda", 2)]);
        assert_eq!(est.pieces, 20);
        assert_eq!(est.minutes, 24);
    }

    #[test]
    fn operator_value_wins_when_positive() {
        assert_eq!(resolve_wait_time(Some(30), 20), 30);
        assert_eq!(resolve_wait_time(Some(0), 20), 20);
        assert_eq!(resolve_wait_time(None, 20), 20);
    }
}
