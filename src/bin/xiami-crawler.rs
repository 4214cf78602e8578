mod commands;

use clap::Parser;
use commands::{execute_command, Commands};
use xiami_crawler::{ClientConfig, XiamiClient, DEFAULT_BASE_URL};

/// xiami.com catalog extraction tool
#[derive(Parser)]
#[command(
    name = "xiami-crawler",
    about = "Extract collections, artists and listings from xiami.com as JSON",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Catalog host to read from
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = ClientConfig::new().with_base_url(args.base_url);
    let http_client = http_client::native::NativeClient::new();
    let client = XiamiClient::with_config(Box::new(http_client), config);

    if let Err(e) = execute_command(args.command, &client).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
