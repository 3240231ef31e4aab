mod cli;

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;
use wanderlust::AppError;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wanderlust=info")),
        )
        .init();

    let cli = cli::Cli::parse();

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AppError>() {
                Some(app) => {
                    error!(error = %app, status = app.status_code(), "Request failed");
                    eprintln!("{}", app.user_message());
                }
                None => {
                    error!(error = ?err, "Unexpected failure");
                    eprintln!("There was an error on our side");
                }
            }
            ExitCode::FAILURE
        }
    }
}
