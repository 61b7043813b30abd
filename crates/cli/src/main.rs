use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    docforge_observability::init();

    let cli = docforge_cli::Cli::parse();

    match docforge_cli::run(cli).await {
        Ok(status) => status.into(),
        Err(e) => {
            tracing::error!(error = ?e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
