//! Panda - a voice assistant that learns its commands

use panda_assistant::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging is initialized by the CLI once the log level flag is parsed
    cli::run().await
}
