//! Mynah: desktop chat assistant entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at the configured level
//!   4. Build the completion client and router
//!   5. Run the console channel until Ctrl-C or :quit

use tokio_util::sync::CancellationToken;
use tracing::info;

use mynah::error::AppError;
use mynah::router::Router;
use mynah::{config, console, llm, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level)?;

    info!(
        assistant = %config.assistant_name,
        work_dir = %config.work_dir.display(),
        provider = %config.llm.provider,
        "config loaded"
    );

    let client = llm::providers::build(&config.llm, config.llm_api_key.clone())?;
    let router = Router::new(&config, client)?;

    let shutdown = CancellationToken::new();
    {
        let token = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }

    console::run(router, shutdown, config.work_dir.clone()).await
}
