//! Codex CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use codex::agent_loop::{AgentLoop, AgentLoopOptions, RunOutcome};
use codex::cli::{completion_script, terminal::terminal_callbacks, Cli};
use codex::config::{load_config, ConfigPaths, LoadOptions};
use codex::error::CodexError;
use codex::provider::OpenAiProvider;
use codex::types::Message;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CodexError> {
    if let Some(shell) = cli.completion.as_deref() {
        println!("{}", completion_script(shell)?);
        return Ok(());
    }

    if let Some(path) = &cli.view {
        print!("{}", tokio::fs::read_to_string(path).await?);
        return Ok(());
    }

    let paths = ConfigPaths::default_location()?;
    let mut config = load_config(
        &paths,
        LoadOptions {
            full_context: cli.full_context,
        },
    )
    .with_env_api_key();

    if cli.config {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| default_editor().to_string());
        tokio::process::Command::new(editor)
            .arg(&paths.instructions_file)
            .status()
            .await?;
        return Ok(());
    }

    cli.apply_overrides(&mut config);

    let Some(prompt) = cli.prompt.clone() else {
        return Err(CodexError::InvalidArgument("No prompt supplied".into()));
    };

    match config.provider.as_deref() {
        None | Some("openai") => {}
        Some(other) => {
            return Err(CodexError::Configuration(format!(
                "Unsupported provider '{other}'"
            )))
        }
    }

    let provider = Arc::new(OpenAiProvider::new(
        config.require_api_key()?,
        config.base_url.clone(),
    ));
    let options = AgentLoopOptions::builder()
        .model(config.model.clone())
        .instructions(config.instructions.clone())
        .approval_policy(config.approval_policy)
        .build();
    let mut agent = AgentLoop::new(provider, options, terminal_callbacks(cli.quiet));

    let outcome = agent.run(&[Message::user(prompt)]).await?;
    println!();

    if let RunOutcome::Aborted { command } = outcome {
        eprintln!("Declined: {command}");
    }

    Ok(())
}

fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}
