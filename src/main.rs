use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use mooze_depix::credentials::EnvCredentials;
use mooze_depix::logging::init_logging;
use mooze_depix::services;
use mooze_depix::settings::Settings;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "depix.toml")]
    config: String,
    #[arg(short, long)]
    listen: Option<String>,
    #[arg(long, default_value = "log4rs.yaml")]
    log4rs: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let mut settings = Settings::load(&args.config).expect("Failed to load settings.");
    if let Some(listen) = args.listen {
        settings.server.listen = listen;
    }

    init_logging(&args.log4rs, "mooze-depix.log", true).expect("Failed to initialize logging.");
    log::info!("Starting Mooze Depix proxy.");

    let credentials = Arc::new(EnvCredentials::new(&settings.depix.token_env));
    if std::env::var(&settings.depix.token_env).is_err() {
        log::warn!(
            "{} is not set, Depix requests will fail until it is.",
            settings.depix.token_env
        );
    }

    services::start_services(settings, credentials).await
}
