use chat_archiver::config::Config;
use chat_archiver::error::Result;
use chat_archiver::orchestrator::Orchestrator;

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    Orchestrator::new(config)?.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    if let Err(e) = run().await {
        eprintln!("Fatal error: {}", e);
        std::process::exit(1);
    }
}
