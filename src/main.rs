use appt_watch::utils::logger;
use appt_watch::{app, CliConfig, WatchError};
use clap::Parser;

fn fail_startup(stage: &str, e: WatchError) -> ! {
    tracing::error!("❌ {} failed: {}", stage, e);
    eprintln!("❌ {}: {}", stage, e);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting appt-watch");

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => fail_startup("Configuration", e),
    };

    match serde_json::to_string(&config) {
        Ok(summary) => tracing::debug!("Resolved config: {}", summary),
        Err(e) => tracing::debug!("Could not render config summary: {}", e),
    }

    let poller = match app::bootstrap(&config).await {
        Ok(poller) => poller,
        Err(e) => fail_startup("Startup", e),
    };

    if cli.once {
        poller.run_once().await;
        return;
    }

    poller.run().await;
}
