//! Terminal front end for the customer and kitchen displays.
//!
//! stdin lines become [`ScreenInput`]s; frames are drawn to stdout after a
//! clear-screen. Ctrl-C, `quit` or end of input stops the loop.

use std::io::Write as _;
use std::sync::Arc;

use anyhow::Result;
use pos_client::OrderApi;
use pos_screens::{
    CustomerScreen, FrameSink, KitchenScreen, PollSettings, ReadyAlert, ScreenDriver,
    ScreenInput, ScreenModel,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use super::Context;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const BELL: &str = "\x07";

/// Draws frames on stdout. The latest notice is kept under the frame until
/// the next one replaces it.
struct TerminalSink {
    notice: Option<String>,
}

impl TerminalSink {
    fn new() -> Self {
        Self { notice: None }
    }
}

impl FrameSink for TerminalSink {
    fn frame(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{CLEAR_SCREEN}{text}");
        if let Some(n) = &self.notice {
            let _ = writeln!(out, "\n! {n}");
        }
        let _ = out.flush();
    }

    fn chime(&mut self, alerts: &[ReadyAlert]) {
        let numbers: Vec<String> = alerts.iter().map(|a| format!("#{}", a.order_number)).collect();
        self.notice = Some(format!("Ready: {}", numbers.join(", ")));
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{BELL}");
        let _ = out.flush();
    }

    fn notice(&mut self, text: &str) {
        self.notice = Some(text.to_string());
    }
}

pub async fn run_customer(ctx: &Context) -> Result<()> {
    let model = CustomerScreen::new(ctx.assets(), ctx.config.timers.customer.clone());
    run_screen(ctx, model).await
}

pub async fn run_kitchen(ctx: &Context) -> Result<()> {
    let model = KitchenScreen::new(ctx.assets(), ctx.config.timers.kitchen.clone());
    run_screen(ctx, model).await
}

async fn run_screen<M: ScreenModel>(ctx: &Context, model: M) -> Result<()> {
    let api: Arc<dyn OrderApi> = Arc::new(ctx.api()?);
    let driver = ScreenDriver::new(model, api);
    let settings = PollSettings::from_config(&ctx.config.polling);

    let (input_tx, input_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let stdin_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        forward_stdin(input_tx).await;
        let _ = stdin_shutdown.send(true);
    });
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut sink = TerminalSink::new();
    let report = driver.run(settings, input_rx, shutdown_rx, &mut sink).await;
    info!(
        applied = report.applied,
        stale = report.stale,
        failed = report.failed,
        actions_sent = report.actions_sent,
        "screen exited"
    );
    Ok(())
}

/// Read operator lines until EOF or `quit`.
async fn forward_stdin(tx: mpsc::Sender<ScreenInput>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit" | "q") {
            break;
        }
        match ScreenInput::parse(line) {
            Ok(input) => {
                if tx.send(input).await.is_err() {
                    break;
                }
            }
            Err(msg) => eprintln!("{msg}"),
        }
    }
}
