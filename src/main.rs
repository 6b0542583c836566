use covgate::{cli, reporting::console};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            console::error(format!("Error: {e:#}"));
            ExitCode::FAILURE
        }
    }
}
