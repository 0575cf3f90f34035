use bank_agent::prelude::*;
use std::env;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logger();
    let once = env::args().skip(1).any(|arg| arg == "--once");

    let config = Config::new();
    info!("bank-agent {} starting for {}", version(), config.bank);

    let pool = config.pg_pool().await?;
    let repository = PgPriceRepository::new(pool);
    repository.initialize_tables().await?;

    let updater = Arc::new(PriceUpdater::from_config(&config, Arc::new(repository))?);

    if once {
        let report = updater.run_once().await?;
        println!("{report}");
        if !report.is_success() {
            error!("Price update finished with failed stages");
        }
        return Ok(());
    }

    updater
        .run_forever(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
            }
        })
        .await;

    info!("bank-agent stopped");
    Ok(())
}
