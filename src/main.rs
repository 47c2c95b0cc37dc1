use std::sync::Arc;

use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vacancy_guard::{bot::data::Data, config::Settings, handlers::console, services::spam::sweeper};

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting vacancy bot message guard");

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Limits: {} messages/minute, {} identical messages, {} minute blocks",
        settings.messages_per_minute, settings.max_similar_messages, settings.block_minutes
    );

    let data = Arc::new(Data::new(settings));
    let _sweeper = sweeper::spawn_idle_sweeper(data.clone());

    let stdin = BufReader::new(tokio::io::stdin());
    if let Err(e) = console::run(data, stdin, tokio::io::stdout()).await {
        error!("Console error: {}", e);
        std::process::exit(1);
    }
}
