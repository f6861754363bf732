use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pos")]
#[command(about = "Chicken shop counter, kitchen and customer screens", long_about = None)]
struct Cli {
    /// Config overlays merged over the built-in defaults, in order
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    /// Order service base URL (wins over config and POS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Customer display. Type `done <n>` to mark a ready order collected.
    Customer,

    /// Kitchen display. Type `start <n>`, `ready <n>` or `clear <n>`.
    Kitchen,

    /// Counter order entry (type `help` inside)
    Staff,

    /// One-shot order commands
    Orders {
        #[command(subcommand)]
        cmd: OrdersCmd,
    },

    /// Print queue stats
    Stats,

    /// Print the sales analytics report
    Analytics,

    /// Write every order to a CSV file
    Export {
        #[arg(long)]
        out: PathBuf,
    },

    /// Offline wait estimate for a set of items
    Estimate {
        /// Menu item, optionally with a quantity: "2x Combo 8"
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },

    /// Print the merged config hash and canonical JSON
    ConfigHash,
}

#[derive(Subcommand)]
enum OrdersCmd {
    /// List live orders (PENDING, PREPARING, READY)
    List {
        /// Include COMPLETED and CANCELLED orders
        #[arg(long, default_value_t = false)]
        all: bool,
    },

    /// Set an order's status by id
    SetStatus {
        #[arg(long)]
        id: String,

        /// PENDING | PREPARING | READY | COMPLETED | CANCELLED
        #[arg(long)]
        status: String,
    },

    /// Place an order without the interactive screen
    Submit {
        /// Menu item, optionally with a quantity: "2x Combo 8"
        #[arg(long = "item")]
        items: Vec<String>,

        /// Hand-keyed price line (repeatable)
        #[arg(long = "manual")]
        manual: Vec<i64>,

        /// CASH | CARD | OTHER
        #[arg(long)]
        pay: String,

        #[arg(long)]
        name: Option<String>,

        /// Wait in minutes; defaults to the estimate
        #[arg(long)]
        wait: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Optional local overrides; a missing file is fine.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    let ctx = commands::Context::load(&cli.config_paths, cli.api_url.as_deref())?;

    match cli.cmd {
        Commands::Customer => commands::screen::run_customer(&ctx).await?,
        Commands::Kitchen => commands::screen::run_kitchen(&ctx).await?,
        Commands::Staff => commands::staff::run_staff(&ctx).await?,

        Commands::Orders { cmd } => match cmd {
            OrdersCmd::List { all } => commands::orders::list(&ctx, all).await?,
            OrdersCmd::SetStatus { id, status } => {
                commands::orders::set_status(&ctx, &id, &status).await?
            }
            OrdersCmd::Submit {
                items,
                manual,
                pay,
                name,
                wait,
            } => {
                commands::orders::submit(
                    &ctx,
                    commands::orders::SubmitArgs {
                        items,
                        manual,
                        pay,
                        name,
                        wait,
                    },
                )
                .await?
            }
        },

        Commands::Stats => commands::orders::stats(&ctx).await?,
        Commands::Analytics => commands::orders::analytics(&ctx).await?,
        Commands::Export { out } => commands::orders::export(&ctx, &out).await?,
        Commands::Estimate { items } => commands::orders::estimate(&ctx, &items)?,

        Commands::ConfigHash => {
            println!("config_hash={}", ctx.loaded.config_hash);
            println!("{}", ctx.loaded.canonical_json);
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries frames and `key=value` output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
