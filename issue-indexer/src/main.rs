//! Issue indexer service.
//!
//! Creates the issue index if needed, then keeps the backend (and its
//! recovery prober) alive until Ctrl-C.

use issue_indexer::config::LogFormat;
use issue_indexer::{Dependencies, IndexingError, Settings};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Plain => builder.init(),
    }
}

async fn run(settings: Settings) -> Result<(), IndexingError> {
    let dependencies = Dependencies::new(&settings)?;
    let indexer = dependencies.indexer;

    indexer.set_availability_change_callback(Box::new(|available| {
        if available {
            info!("Search engine is available again");
        } else {
            warn!("Search engine became unavailable");
        }
    }));

    let existed = indexer.init().await?;
    info!(
        index = %settings.indexer.index_name,
        already_existed = existed,
        "Issue index ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    indexer.close();
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(LogFormat::Plain);
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    init_tracing(settings.log_format);

    info!("Starting issue indexer");

    if let Err(e) = run(settings).await {
        error!(error = %e, "Issue indexer failed");
        std::process::exit(1);
    }

    info!("Issue indexer stopped");
}
