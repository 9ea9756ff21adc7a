//! Tip Page Example
//!
//! A line-driven rendition of the tip page against the Kaia Kairos testnet.
//! Put a funded testnet key in `TIPJAR_PRIVATE_KEY` (or a `.env` file).
//!
//! Run with:
//! ```bash
//! cargo run -p tipjar --example tip_page --features "evm,logging"
//! ```

use anyhow::Result;
use tipjar::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    tipjar::init_logging();

    let config = ClientConfig::from_env()?;
    let locale = match std::env::var("TIPJAR_LOCALE").as_deref() {
        Ok("ko") => Locale::Korean,
        _ => Locale::English,
    };
    let (jar, _wallet) = tipjar::evm_tip_jar(&config, locale)?;
    let _follower = jar.follow_account_updates();

    let page = Page::new(jar);
    println!("{}", page.view().await);
    println!("commands: connect <id> | amount <value> | send | disconnect | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        let accepted = match (words.next(), words.next()) {
            (Some("connect"), Some(id)) => page.click_connect(id).await,
            (Some("amount"), value) => {
                page.type_amount(value.unwrap_or("")).await;
                true
            }
            (Some("send"), _) => page.click_submit().await,
            (Some("disconnect"), _) => page.click_disconnect().await,
            (Some("quit"), _) => break,
            _ => {
                println!("unknown command");
                continue;
            }
        };
        if !accepted {
            println!("(control disabled)");
        }
        println!("{}", page.view().await);
    }

    Ok(())
}
