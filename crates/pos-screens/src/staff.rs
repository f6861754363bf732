//! Staff order entry.
//!
//! A [`StaffSession`] owns the cart for one counter. Operator lines are parsed
//! into [`StaffCommand`]s and executed against it; only `pay` talks to the
//! backend. The cart is cleared after a successful submission and kept
//! untouched when the POST fails, so the operator can retry.

use std::fmt;
use std::fmt::Write as _;

use pos_cart::{Cart, CartError, Checkout};
use pos_client::{ApiError, OrderApi};
use pos_config::{find_menu_item, MenuItem};
use pos_schemas::{format_amount, Order, PaymentMethod};
use tracing::{info, warn};

use crate::assets::AssetCatalog;

pub const HELP: &str = "\
commands:
  menu                          show the menu with cart quantities
  add [<n>x] <item>             add one (or n) of a menu item
  remove <item>                 take one unit off a line
  drop <item>                   remove a line entirely
  manual <price>                add a custom line at a typed price
  review                        review the order and see the wait estimate
  pay <cash|card|other> [wait <minutes>] [name <customer>]
                                submit the order
  reset                         empty the cart
  help                          this text
  quit                          leave";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffError {
    /// The line could not be understood.
    Parse(String),
    /// `add` named something that is not on the menu.
    UnknownItem(String),
    Cart(CartError),
    /// Submission failed; the cart is untouched.
    Api(ApiError),
}

impl fmt::Display for StaffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffError::Parse(msg) => write!(f, "{msg}"),
            StaffError::UnknownItem(name) => write!(f, "'{name}' is not on the menu"),
            StaffError::Cart(e) => write!(f, "{e}"),
            StaffError::Api(e) => write!(f, "error placing order: {e}"),
        }
    }
}

impl std::error::Error for StaffError {}

impl From<CartError> for StaffError {
    fn from(e: CartError) -> Self {
        StaffError::Cart(e)
    }
}

impl From<ApiError> for StaffError {
    fn from(e: ApiError) -> Self {
        StaffError::Api(e)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffCommand {
    Menu,
    Add { item: String, quantity: u32 },
    Remove(String),
    Drop(String),
    Manual(i64),
    Review,
    Pay(Checkout),
    Reset,
    Help,
    Quit,
}

impl StaffCommand {
    pub fn parse(line: &str) -> Result<Self, StaffError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((v, r)) => (v, r.trim()),
            None => (line, ""),
        };

        let need_item = |what: &str| -> Result<String, StaffError> {
            if rest.is_empty() {
                Err(StaffError::Parse(format!("usage: {what} <item>")))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "menu" | "m" => Ok(StaffCommand::Menu),
            "add" | "a" => {
                let (quantity, item) = split_quantity(rest)?;
                if item.is_empty() {
                    return Err(StaffError::Parse("usage: add [<n>x] <item>".into()));
                }
                Ok(StaffCommand::Add {
                    item: item.to_string(),
                    quantity,
                })
            }
            "remove" | "rm" => Ok(StaffCommand::Remove(need_item("remove")?)),
            "drop" => Ok(StaffCommand::Drop(need_item("drop")?)),
            "manual" => Ok(StaffCommand::Manual(parse_price(rest)?)),
            "review" => Ok(StaffCommand::Review),
            "pay" => parse_pay(rest).map(StaffCommand::Pay),
            "reset" => Ok(StaffCommand::Reset),
            "help" | "?" => Ok(StaffCommand::Help),
            "quit" | "exit" | "q" => Ok(StaffCommand::Quit),
            "" => Err(StaffError::Parse("type 'help' for commands".into())),
            other => Err(StaffError::Parse(format!(
                "unknown command '{other}'; type 'help'"
            ))),
        }
    }
}

/// `2x Combo 8` → (2, "Combo 8"); `Combo 8` → (1, "Combo 8").
pub fn split_quantity(rest: &str) -> Result<(u32, &str), StaffError> {
    if let Some((first, tail)) = rest.split_once(char::is_whitespace) {
        if let Some(n) = first.strip_suffix(['x', 'X']) {
            if let Ok(q) = n.parse::<u32>() {
                if q == 0 {
                    return Err(StaffError::Parse("quantity must be at least 1".into()));
                }
                return Ok((q, tail.trim()));
            }
        }
    }
    Ok((1, rest))
}

/// Accepts `2500`, `2,500` and `₡2,500`.
fn parse_price(raw: &str) -> Result<i64, StaffError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₡')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned
        .parse::<i64>()
        .map_err(|_| StaffError::Cart(CartError::InvalidPrice(0)))
        .and_then(|p| {
            if p <= 0 {
                Err(StaffError::Cart(CartError::InvalidPrice(p)))
            } else {
                Ok(p)
            }
        })
}

fn parse_pay(rest: &str) -> Result<Checkout, StaffError> {
    let usage = || StaffError::Parse("usage: pay <cash|card|other> [wait <minutes>] [name <customer>]".into());

    let mut words = rest.split_whitespace();
    let method = words.next().ok_or_else(usage)?;
    let payment_method =
        PaymentMethod::parse(method).map_err(|e| StaffError::Parse(e.to_string()))?;

    let mut wait_override = None;
    let mut customer_name = None;
    while let Some(word) = words.next() {
        match word.to_ascii_lowercase().as_str() {
            "wait" => {
                let raw = words.next().ok_or_else(usage)?;
                let minutes = raw
                    .parse::<u32>()
                    .map_err(|_| StaffError::Parse(format!("'{raw}' is not a number of minutes")))?;
                wait_override = Some(minutes);
            }
            "name" => {
                let name: Vec<&str> = words.by_ref().collect();
                customer_name = Some(name.join(" "));
            }
            _ => return Err(usage()),
        }
    }

    Ok(Checkout {
        payment_method,
        customer_name,
        wait_override,
    })
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What the operator sees after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub order_id: String,
    pub order_number: u32,
    pub wait_minutes: u32,
    pub total: i64,
}

impl Receipt {
    fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            order_number: order.order_number,
            wait_minutes: order.estimated_wait_time,
            total: order.total_price,
        }
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order #{} placed. Total {}. Estimated wait: {} mins",
            self.order_number,
            format_amount(self.total),
            self.wait_minutes
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffReply {
    Text(String),
    Submitted(Receipt),
    Quit,
}

pub struct StaffSession {
    menu: Vec<MenuItem>,
    assets: AssetCatalog,
    cart: Cart,
    last_receipt: Option<Receipt>,
}

impl StaffSession {
    pub fn new(menu: Vec<MenuItem>, assets: AssetCatalog) -> Self {
        Self {
            menu,
            assets,
            cart: Cart::new(),
            last_receipt: None,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn last_receipt(&self) -> Option<&Receipt> {
        self.last_receipt.as_ref()
    }

    /// Cart line names are matched case-insensitively too.
    fn cart_name(&self, name: &str) -> String {
        let wanted = name.trim();
        self.cart
            .lines()
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(wanted))
            .map(|l| l.name.clone())
            .unwrap_or_else(|| wanted.to_string())
    }

    pub async fn execute(
        &mut self,
        cmd: StaffCommand,
        api: &dyn OrderApi,
    ) -> Result<StaffReply, StaffError> {
        let text = match cmd {
            StaffCommand::Menu => self.render_menu(),
            StaffCommand::Help => HELP.to_string(),
            StaffCommand::Quit => return Ok(StaffReply::Quit),
            StaffCommand::Add { item, quantity } => {
                let entry = find_menu_item(&self.menu, &item)
                    .cloned()
                    .ok_or(StaffError::UnknownItem(item))?;
                self.cart
                    .add_n(&entry.name, entry.price, entry.image.as_deref(), quantity);
                self.status_line()
            }
            StaffCommand::Remove(item) => {
                let name = self.cart_name(&item);
                self.cart.remove_one(&name)?;
                self.status_line()
            }
            StaffCommand::Drop(item) => {
                let name = self.cart_name(&item);
                self.cart.remove_all(&name)?;
                self.status_line()
            }
            StaffCommand::Manual(price) => {
                self.cart.add_manual(price)?;
                self.status_line()
            }
            StaffCommand::Review => self.render_review()?,
            StaffCommand::Reset => {
                self.cart.clear();
                self.status_line()
            }
            StaffCommand::Pay(checkout) => {
                let receipt = self.submit(api, &checkout).await?;
                return Ok(StaffReply::Submitted(receipt));
            }
        };
        Ok(StaffReply::Text(text))
    }

    /// POST the cart. Clears it only once the backend has accepted the order.
    pub async fn submit(
        &mut self,
        api: &dyn OrderApi,
        checkout: &Checkout,
    ) -> Result<Receipt, StaffError> {
        let body = self.cart.checkout(checkout)?;
        match api.create_order(&body).await {
            Ok(order) => {
                let receipt = Receipt::from_order(&order);
                info!(
                    order_id = %order.id,
                    order_number = order.order_number,
                    total = order.total_price,
                    wait_minutes = order.estimated_wait_time,
                    "order submitted"
                );
                self.cart.clear();
                self.last_receipt = Some(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, lines = body.items.len(), "order submission failed; cart kept");
                Err(StaffError::Api(e))
            }
        }
    }

    /// `Cart: 2x Combo 8, 1x Soda | Total ₡19,000`
    pub fn status_line(&self) -> String {
        format!(
            "Cart: {} | Total {}",
            self.cart.summary(),
            format_amount(self.cart.total())
        )
    }

    pub fn render_menu(&self) -> String {
        let mut out = String::new();
        for item in &self.menu {
            let badge = item
                .image
                .as_deref()
                .and_then(|r| self.assets.resolve(r))
                .map(|a| a.badge())
                .unwrap_or_default();
            let qty = self.cart.quantity_of(&item.name);
            let _ = writeln!(
                out,
                "  {:<10} {:>8}  {:<12} {}",
                item.name,
                format_amount(item.price),
                badge,
                if qty > 0 { format!("x{qty}") } else { String::new() }
            );
        }
        let _ = write!(out, "{}", self.status_line());
        out
    }

    /// Per-line price and line total, grand total, then the pre-filled wait.
    pub fn render_review(&self) -> Result<String, StaffError> {
        if self.cart.is_empty() {
            return Err(StaffError::Cart(CartError::EmptyCart));
        }
        let mut out = String::new();
        for line in self.cart.lines() {
            let _ = writeln!(
                out,
                "  {}x {:<20} {:>9} each {:>10}",
                line.quantity,
                line.name,
                format_amount(line.price),
                format_amount(line.line_total())
            );
        }
        let estimate = self.cart.estimate();
        let _ = writeln!(out, "  Total: {}", format_amount(self.cart.total()));
        let _ = write!(
            out,
            "  Estimated wait: {} min ({} pieces). pay <cash|card|other> [wait <minutes>] [name <customer>]",
            estimate.minutes, estimate.pieces
        );
        Ok(out)
    }
}
