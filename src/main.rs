use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use oracle_turret::{bot, config::settings, config::Settings};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Register slash commands in every guild, then exit
    #[arg(long)]
    update_commands: bool,
}

fn banner(label: &str) -> String {
    format!(
        "--- {} {} ---",
        label,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let log_path = settings::log_file_path();
    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_path.display(), e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    // Load settings
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    if cli.update_commands {
        info!("{}", banner("UPDATE COMMANDS START"));
        let result = bot::framework::update_commands(settings).await;
        info!("{}", banner("UPDATE COMMANDS END"));
        if let Err(e) = result {
            error!("Failed to update commands: {}", e);
            std::process::exit(1);
        }
        return;
    }

    info!("{}", banner("BOT START"));
    let result = bot::framework::run(settings).await;
    info!("{}", banner("BOT END"));

    if let Err(e) = result {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}
