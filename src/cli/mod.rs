//! CLI entry point for codex.

pub mod terminal;

use std::path::PathBuf;

use clap::Parser;

use crate::agent_loop::ApprovalPolicy;
use crate::config::AppConfig;
use crate::error::CodexError;

/// Codex CLI
#[derive(Parser, Debug)]
#[command(name = "codex", version, about = "Codex CLI: a streaming AI coding assistant")]
pub struct Cli {
    /// Prompt to send to the model
    pub prompt: Option<String>,

    /// Model to use (overrides the config file)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Provider to use (only "openai" is built in)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Approval policy: suggest, auto-edit, or full-auto
    #[arg(short = 'a', long = "approval-mode")]
    pub approval_mode: Option<ApprovalPolicy>,

    /// Print a saved rollout file and exit
    #[arg(short, long)]
    pub view: Option<PathBuf>,

    /// Open the instructions file in $EDITOR
    #[arg(short = 'c', long = "config")]
    pub config: bool,

    /// Print a shell completion script (bash, zsh, fish)
    #[arg(long)]
    pub completion: Option<String>,

    /// Print only assistant text
    #[arg(short, long)]
    pub quiet: bool,

    /// Use the full-context default model
    #[arg(short, long = "full-context")]
    pub full_context: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(provider) = &self.provider {
            config.provider = Some(provider.clone());
        }
        if let Some(policy) = self.approval_mode {
            config.approval_policy = policy;
        }
    }
}

const BASH_COMPLETION: &str = r#"# bash completion for codex
_codex_completion() {
  local cur
  cur="${COMP_WORDS[COMP_CWORD]}"
  COMPREPLY=( $(compgen -o default -o filenames -- "${cur}") )
}
complete -F _codex_completion codex"#;

const ZSH_COMPLETION: &str = r#"# zsh completion for codex
#compdef codex

_codex() {
  _arguments '*:filename:_files'
}
_codex"#;

const FISH_COMPLETION: &str =
    "# fish completion for codex\ncomplete -c codex -a '(__fish_complete_path)' -d 'file path'";

/// Completion script for `shell`.
pub fn completion_script(shell: &str) -> Result<&'static str, CodexError> {
    match shell {
        "bash" => Ok(BASH_COMPLETION),
        "zsh" => Ok(ZSH_COMPLETION),
        "fish" => Ok(FISH_COMPLETION),
        other => Err(CodexError::InvalidArgument(format!(
            "Unsupported shell: {other}"
        ))),
    }
}
