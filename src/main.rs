use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use promptforge::api::ApiClient;
use promptforge::app::App;
use promptforge::config::Config;
use promptforge::error::ModelError;
use promptforge::input::LineEditor;
use promptforge::output::OutputHandler;

#[derive(Parser)]
#[command(name = "promptforge")]
#[command(about = "Conversational prompt refinement CLI", long_about = None)]
struct Cli {
    /// Model to use for all completion calls
    #[arg(short, long)]
    model: Option<String>,

    /// Override the API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Enable debug output (raw parse logs, usage/cost summary)
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.debug { "promptforge=debug" } else { "promptforge=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load_or_default();
    if let Some(model) = cli.model {
        config.ai.model = model;
    }
    if let Some(api_url) = cli.api_url {
        config.ai.api_url = api_url;
    }

    let client = match ApiClient::new(&config.ai) {
        Ok(client) => Arc::new(client),
        Err(err @ ModelError::MissingApiKey) => {
            eprintln!("{} {}", style("Error:").red().bold(), err);
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let output = OutputHandler::new().with_debug(cli.debug);
    let mut app = App::new(client.clone(), output, LineEditor::new());
    let result = app.run().await;

    if cli.debug {
        let _ = OutputHandler::new().print_usage_summary(&client.usage_summary());
    }

    if let Err(err) = result {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(1);
    }

    Ok(())
}
