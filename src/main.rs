use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

mod app;
mod config;
mod editor;
mod handler;
mod highlight;
mod logging;
mod ollama;
mod prompt;
mod status;
mod tui;
mod ui;

#[cfg(test)]
mod testing;

use app::App;
use config::Config;
use ollama::OllamaClient;
use prompt::{build_prompt, Action, PromptError};

#[derive(Parser)]
#[command(name = "codefixer", version)]
#[command(about = "Find errors in code and get fixes from a local Ollama model")]
struct Cli {
    /// Ollama server URL
    #[arg(long, global = true)]
    url: Option<String>,
    /// Model to query
    #[arg(short, long, global = true)]
    model: Option<String>,
    /// max_tokens sent with each request
    #[arg(long, global = true)]
    max_tokens: Option<u32>,
    /// Log file used while the TUI is running
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List models installed on the Ollama server
    Models,
    /// Send code from a file (or stdin) and print the reply
    Analyze {
        #[arg(short, long, value_enum, default_value = "find-errors")]
        action: Action,
        /// Source file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Write the effective configuration to the config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let log_path = match &cli.log_file {
                Some(path) => path.clone(),
                None => logging::default_log_path()?,
            };
            logging::init_file(&log_path)?;
            let config = effective_config(&cli);
            run_tui(&config).await
        }
        Some(Commands::Models) => {
            logging::init_stderr()?;
            let config = effective_config(&cli);
            list_models(&config).await
        }
        Some(Commands::Analyze { action, ref file }) => {
            logging::init_stderr()?;
            let config = effective_config(&cli);
            analyze(&config, action, file.as_deref()).await
        }
        Some(Commands::InitConfig) => {
            logging::init_stderr()?;
            let config = effective_config(&cli);
            config.save()?;
            println!("Saved configuration for {} at {}", config.model, config.base_url);
            Ok(())
        }
    }
}

/// Config file values with command-line overrides applied
fn effective_config(cli: &Cli) -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config, using defaults");
        Config::default()
    });

    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.max_tokens = max_tokens;
    }
    config
}

async fn run_tui(config: &Config) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    tracing::info!(model = %config.model, url = %config.base_url, "starting codefixer");

    let mut app = App::new(config);
    let mut events = tui::EventHandler::new(Duration::from_millis(config.tick_ms.max(1)));

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            let Some(event) = events.next().await else {
                break;
            };
            handler::handle_event(&mut app, event);
            app.poll_request().await;
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    let result = session_result(result, tui::restore());
    tracing::info!("codefixer exited");
    result
}

/// The event loop's outcome wins over a failed terminal restore, which is only logged
fn session_result(result: Result<()>, restored: Result<()>) -> Result<()> {
    if let Err(e) = restored {
        tracing::warn!(error = %e, "failed to restore terminal");
    }
    result
}

async fn list_models(config: &Config) -> Result<()> {
    let client = OllamaClient::new(&config.base_url, &config.model, config.max_tokens);

    let models = client
        .list_models()
        .await
        .with_context(|| format!("Could not reach Ollama at {}. Is `ollama serve` running?", config.base_url))?;

    if models.is_empty() {
        println!("No models found. Pull one with: ollama pull {}", config.model);
    }
    for model in models {
        let marker = if model == config.model { "*" } else { " " };
        println!("{} {}", marker, model);
    }
    Ok(())
}

async fn analyze(config: &Config, action: Action, file: Option<&std::path::Path>) -> Result<()> {
    let code = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?,
        None => {
            let mut code = String::new();
            std::io::stdin().read_to_string(&mut code)?;
            code
        }
    };

    let prompt = match build_prompt(&code, action, &config.language) {
        Ok(prompt) => prompt,
        Err(PromptError::EmptyInput) => bail!(action.empty_warning()),
    };

    tracing::info!(action = action.as_str(), model = %config.model, "sending request");

    let client = OllamaClient::new(&config.base_url, &config.model, config.max_tokens);
    let response = client
        .generate(&prompt)
        .await
        .with_context(|| format!("Could not connect to {}", config.model))?;

    println!("{}", response);
    Ok(())
}
