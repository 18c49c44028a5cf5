//! Scenewright CLI binary.
//!
//! Generates a screenplay from a story idea, optionally illustrates every scene,
//! and writes the script, transitions, keyframes and title card to a directory.

use clap::Parser;
use scenewright::{ScenewrightConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, run_generate};

    // Pick up GEMINI_API_KEY from a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScenewrightConfig::from_file(path)?,
        None => ScenewrightConfig::load()?,
    };

    let mut logging = config.logging().clone();
    if cli.verbose {
        logging = logging.with_log_level("debug");
    }
    if cli.json_logs {
        logging = logging.with_json_logs(true);
    }
    init_logging(&logging)?;
    let config = config.with_logging(logging);

    match cli.command {
        Commands::Generate(args) => {
            run_generate(&args, &config).await?;
        }
    }

    Ok(())
}
