//! One-shot commands against the order service. Output is `key=value`.

use std::path::Path;

use anyhow::{Context as _, Result};
use pos_cart::Checkout;
use pos_client::OrderApi;
use pos_schemas::{format_amount, Order, OrderStatus, PaymentMethod};
use tracing::info;

use super::{cart_from_items, Context};

/// Column order of `export`.
pub const EXPORT_HEADER: [&str; 9] = [
    "id",
    "order_number",
    "items",
    "total_price",
    "payment_method",
    "customer_name",
    "status",
    "created_at",
    "estimated_wait_time",
];

pub struct SubmitArgs {
    pub items: Vec<String>,
    pub manual: Vec<i64>,
    pub pay: String,
    pub name: Option<String>,
    pub wait: Option<u32>,
}

fn items_text(order: &Order) -> String {
    order
        .items
        .iter()
        .map(|i| format!("{}x {}", i.quantity, i.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_order(order: &Order) {
    println!(
        "order_number={} id={} status={} total={} payment={} name=\"{}\" wait_min={} created_at={} items=\"{}\"",
        order.order_number,
        order.id,
        order.status,
        order.total_price,
        order.payment_method,
        order.display_name().unwrap_or(""),
        order.estimated_wait_time,
        order.created_at,
        items_text(order)
    );
}

pub async fn list(ctx: &Context, all: bool) -> Result<()> {
    let api = ctx.api()?;
    let orders = api.list_orders().await.context("list orders failed")?;
    let shown: Vec<&Order> = orders
        .iter()
        .filter(|o| all || !o.status.is_terminal())
        .collect();

    println!("orders={}", shown.len());
    for o in shown {
        print_order(o);
    }
    Ok(())
}

pub async fn set_status(ctx: &Context, id: &str, status: &str) -> Result<()> {
    let status = OrderStatus::parse(status)?;
    let api = ctx.api()?;
    let order = api
        .update_status(id, status)
        .await
        .with_context(|| format!("set status {status} on order {id} failed"))?;
    info!(order_id = %order.id, status = %order.status, "status set from cli");
    println!(
        "updated=true id={} order_number={} status={}",
        order.id, order.order_number, order.status
    );
    Ok(())
}

pub async fn submit(ctx: &Context, args: SubmitArgs) -> Result<()> {
    let mut cart = cart_from_items(&ctx.config, &args.items)?;
    for price in &args.manual {
        cart.add_manual(*price)?;
    }
    let checkout = Checkout {
        payment_method: PaymentMethod::parse(&args.pay)?,
        customer_name: args.name,
        wait_override: args.wait,
    };
    let body = cart.checkout(&checkout)?;

    let api = ctx.api()?;
    let order = api.create_order(&body).await.context("submit order failed")?;
    info!(order_id = %order.id, order_number = order.order_number, "order submitted from cli");

    println!("order_id={}", order.id);
    println!("order_number={}", order.order_number);
    println!("total_price={}", order.total_price);
    println!("total={}", format_amount(order.total_price));
    println!("estimated_wait_time={}", order.estimated_wait_time);
    Ok(())
}

pub async fn stats(ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let stats = api.queue_stats().await.context("queue stats failed")?;
    println!("total_estimated_wait_time={}", stats.total_estimated_wait_time);
    println!("active_orders_count={}", stats.active_orders_count);
    Ok(())
}

pub async fn analytics(ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let r = api.analytics().await.context("analytics failed")?;

    println!("total_orders={}", r.total_orders);
    println!("total_revenue={:.2}", r.total_revenue);
    println!("average_order_value={:.2}", r.average_order_value);
    println!("average_items_per_order={:.2}", r.average_items_per_order);
    println!("cancel_rate={:.2}", r.cancel_rate);
    for (name, units) in r.top_items_ranked() {
        println!("top_item=\"{name}\" units={units}");
    }
    for (status, n) in &r.status_counts {
        println!("status_count={status} n={n}");
    }
    for (method, n) in &r.payment_mix {
        println!("payment={method} n={n}");
    }
    for (hour, revenue) in &r.hourly_sales {
        println!("hour={hour:02} revenue={revenue:.2}");
    }
    for (day, revenue) in &r.daily_sales {
        println!("day={day} revenue={revenue:.2}");
    }
    println!("recent_orders={}", r.recent_orders.len());
    Ok(())
}

pub async fn export(ctx: &Context, out: &Path) -> Result<()> {
    let api = ctx.api()?;
    let orders = api.list_orders().await.context("list orders failed")?;

    let mut w = csv::Writer::from_path(out)
        .with_context(|| format!("create csv failed: {}", out.display()))?;
    w.write_record(EXPORT_HEADER)?;
    for o in &orders {
        let items = serde_json::to_string(&o.items).context("serialize items failed")?;
        w.write_record([
            o.id.clone(),
            o.order_number.to_string(),
            items,
            o.total_price.to_string(),
            o.payment_method.to_string(),
            o.customer_name.clone().unwrap_or_default(),
            o.status.to_string(),
            o.created_at.clone(),
            o.estimated_wait_time.to_string(),
        ])?;
    }
    w.flush().context("flush csv failed")?;

    println!("exported={} path={}", orders.len(), out.display());
    Ok(())
}

/// Offline: the same heuristic the counter pre-fills.
pub fn estimate(ctx: &Context, items: &[String]) -> Result<()> {
    let cart = cart_from_items(&ctx.config, items)?;
    let e = cart.estimate();
    println!("pieces={}", e.pieces);
    println!("minutes={}", e.minutes);
    println!("total={}", format_amount(cart.total()));
    Ok(())
}
