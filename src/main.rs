use history_cleaner::api::DiscordClient;
use history_cleaner::cleaner::{self, RunOutcome};
use history_cleaner::config::Config;
use history_cleaner::delete::TokioPacer;
use history_cleaner::prompt::{Console, TextConsole};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so they stay out of the prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    info!("Using API at {}", config.api_base);

    let mut console = TextConsole::stdio();
    let outcome = cleaner::run(&mut console, &TokioPacer, &config, |credentials| {
        DiscordClient::new(&config, credentials)
    })
    .await;

    match outcome {
        Ok(RunOutcome::Halted { .. }) => Ok(ExitCode::FAILURE),
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("Run failed: {:#}", e);
            console.say(&format!("{:#}", e))?;
            Ok(ExitCode::FAILURE)
        }
    }
}
