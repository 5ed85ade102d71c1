use clap::Parser;
use scripts::{cli::Cli, env::ProcessEnv, errors::ScriptError};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    // A missing `.env` file is not an error
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    Cli::parse().run(&ProcessEnv).await
}
