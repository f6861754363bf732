//! pos-cart
//!
//! The counter's working order. A [`Cart`] lives inside one staff session,
//! is edited line by line, and becomes a [`NewOrder`] at checkout. The
//! session drops it after a successful submission or an explicit reset.

use std::fmt;

use pos_schemas::{format_amount, NewOrder, OrderItem, PaymentMethod};
use pos_timing::{resolve_wait_time, WaitEstimate};
use tracing::debug;

/// Image reference given to hand-keyed lines.
pub const MANUAL_IMAGE: &str = "placeholder_manual";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Checkout with nothing in the cart.
    EmptyCart,
    /// A hand-keyed price that is zero or negative.
    InvalidPrice(i64),
    /// Edit of a line that is not in the cart.
    NotInCart(String),
    /// The order total does not fit in an `i64` amount.
    Overflow,
}

impl fmt::Display for CartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartError::EmptyCart => write!(f, "please add items to the order first"),
            CartError::InvalidPrice(p) => write!(f, "please enter a valid price (got {p})"),
            CartError::NotInCart(name) => write!(f, "'{name}' is not in the order"),
            CartError::Overflow => write!(f, "order total is too large"),
        }
    }
}

impl std::error::Error for CartError {}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

/// One cart line, keyed by display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    /// Unit price in colones.
    pub price: i64,
    pub quantity: u32,
    pub image: Option<String>,
}

impl CartLine {
    /// Saturates at `i64::MAX`; checkout uses [`CartLine::checked_total`].
    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }

    pub fn checked_total(&self) -> Option<i64> {
        self.price.checked_mul(i64::from(self.quantity))
    }
}

/// Lines in the order they were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

/// What the operator chose on the payment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    /// Minutes typed over the pre-filled estimate, if any.
    pub wait_override: Option<u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, name: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.name == name)
    }

    pub fn quantity_of(&self, name: &str) -> u32 {
        self.line(name).map(|l| l.quantity).unwrap_or(0)
    }

    /// Add one unit. A line already in the cart keeps its original price.
    /// Returns the line's new quantity.
    pub fn add(&mut self, name: &str, price: i64, image: Option<&str>) -> u32 {
        self.add_n(name, price, image, 1)
    }

    /// Add `count` units at once; quantities saturate at `u32::MAX`.
    /// Returns the line's new quantity.
    pub fn add_n(&mut self, name: &str, price: i64, image: Option<&str>, count: u32) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|l| l.name == name) {
            line.quantity = line.quantity.saturating_add(count);
            return line.quantity;
        }
        if count == 0 {
            return 0;
        }
        debug_assert!(price > 0, "cart prices must be positive");
        self.lines.push(CartLine {
            name: name.to_string(),
            price,
            quantity: count,
            image: image.map(str::to_string),
        });
        count
    }

    /// Take one unit off; the line disappears at zero.
    /// Returns the remaining quantity.
    pub fn remove_one(&mut self, name: &str) -> Result<u32, CartError> {
        let idx = self
            .lines
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| CartError::NotInCart(name.to_string()))?;

        let line = &mut self.lines[idx];
        line.quantity = line.quantity.saturating_sub(1);
        let left = line.quantity;
        if left == 0 {
            self.lines.remove(idx);
        }
        Ok(left)
    }

    /// Drop a line regardless of quantity.
    pub fn remove_all(&mut self, name: &str) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.name != name);
        if self.lines.len() == before {
            return Err(CartError::NotInCart(name.to_string()));
        }
        Ok(())
    }

    /// Add a hand-keyed price as its own line, e.g. `Custom (₡2,500)`.
    /// Returns the generated line name.
    pub fn add_manual(&mut self, price: i64) -> Result<String, CartError> {
        if price <= 0 {
            return Err(CartError::InvalidPrice(price));
        }
        let name = manual_item_name(price);
        self.add(&name, price, Some(MANUAL_IMAGE));
        Ok(name)
    }

    /// Display total, saturating at `i64::MAX`.
    pub fn total(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |acc, l| acc.saturating_add(l.line_total()))
    }

    /// Exact total, or [`CartError::Overflow`] when it does not fit.
    pub fn checked_total(&self) -> Result<i64, CartError> {
        self.lines.iter().try_fold(0i64, |acc, l| {
            l.checked_total()
                .and_then(|t| acc.checked_add(t))
                .ok_or(CartError::Overflow)
        })
    }

    /// `2x Combo 8, 1x Soda`, or `Cart Empty`.
    pub fn summary(&self) -> String {
        if self.lines.is_empty() {
            return "Cart Empty".to_string();
        }
        self.lines
            .iter()
            .map(|l| format!("{}x {}", l.quantity, l.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn estimate(&self) -> WaitEstimate {
        WaitEstimate::from_lines(self.lines.iter().map(|l| (l.name.as_str(), l.quantity)))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Build the POST body. The wait time is always explicit: the operator's
    /// override when positive, otherwise the heuristic the field showed.
    pub fn checkout(&self, checkout: &Checkout) -> Result<NewOrder, CartError> {
        if self.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let total_price = self.checked_total()?;
        let estimate = self.estimate();
        let wait = resolve_wait_time(checkout.wait_override, estimate.minutes);

        let items = self
            .lines
            .iter()
            .map(|l| OrderItem::new(l.name.clone(), l.quantity, l.price))
            .collect();

        let customer_name = checkout
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let order = NewOrder {
            items,
            total_price,
            payment_method: checkout.payment_method,
            customer_name,
            estimated_wait_time: Some(wait),
        };
        debug!(
            lines = order.items.len(),
            total = order.total_price,
            wait_minutes = wait,
            "cart checked out"
        );
        Ok(order)
    }
}

pub fn manual_item_name(price: i64) -> String {
    format!("Custom ({})", format_amount(price))
}

// -----------------
// Tests
// -----------------
