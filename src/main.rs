use clap::Parser;
use std::process::ExitCode;

use ticketdesk::cli::Cli;
use ticketdesk::logging;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("{}", e);
    }

    let cli = Cli::parse();

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
