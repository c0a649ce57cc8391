use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;

use mooze_depix::logging::init_logging;
use mooze_depix::ui::client::ProxyClient;
use mooze_depix::ui::clipboard::default_clipboard;
use mooze_depix::ui::console::{self, Console};

#[derive(Parser)]
#[command(version, about = "Terminal panel for the Depix deposit proxy", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    api_url: String,
    #[arg(long, default_value = "log4rs.console.yaml")]
    log4rs: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log4rs, "depix-console.log", false)?;
    log::info!("Starting Depix console against {}.", args.api_url);

    let (input_tx, input_rx) = mpsc::channel(16);
    // Blocking reads on a plain thread, so quitting does not wait on stdin.
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if input_tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });

    let gateway = Arc::new(ProxyClient::new(&args.api_url));
    console::run(
        Console::new(default_clipboard()),
        gateway,
        input_rx,
        std::io::stdout(),
    )
    .await?;

    log::info!("Depix console closed.");
    Ok(())
}
