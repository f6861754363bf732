//! Counter order entry on stdin/stdout.

use std::io::Write as _;

use anyhow::{Context as _, Result};
use pos_screens::{StaffCommand, StaffReply, StaffSession, HELP};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::Context;

pub async fn run_staff(ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let mut session = StaffSession::new(ctx.config.menu.clone(), ctx.assets());

    println!("{}", session.render_menu());
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("flush stdout failed")?;

        let Some(line) = lines.next_line().await.context("read stdin failed")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let cmd = match StaffCommand::parse(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        match session.execute(cmd, &api).await {
            Ok(StaffReply::Text(text)) => println!("{text}"),
            Ok(StaffReply::Submitted(receipt)) => {
                println!("{receipt}");
                println!("{}", session.status_line());
            }
            Ok(StaffReply::Quit) => break,
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}
