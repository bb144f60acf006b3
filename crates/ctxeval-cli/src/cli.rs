//! Command-line definitions and request assembly.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use ctxeval_core::{ContextType, EvaluationRequest};
use serde_json::Value as JsonValue;

#[derive(Parser, Debug)]
#[command(name = "ctxeval")]
#[command(about = "Judge whether a context suffices to answer a question")]
#[command(version)]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Explicit config file, layered over ./ctxeval.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a context against a question
    Evaluate(EvaluateArgs),

    /// Print the liveness report
    Health {
        /// Also check that the configured provider is usable
        #[arg(long)]
        provider: bool,
    },

    /// Print the resolved settings (API keys redacted)
    Config,

    /// Print a sample request
    Example,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Request file (JSON, or YAML by extension); "-" reads stdin
    #[arg(short, long, conflicts_with_all = ["context", "context_file", "question"])]
    pub request: Option<PathBuf>,

    /// Inline context
    #[arg(long, conflicts_with = "context_file")]
    pub context: Option<String>,

    /// Read the context from a file
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// Question to evaluate against the context
    #[arg(short, long)]
    pub question: Option<String>,

    /// How to interpret the context: text, csv, list, dataframe
    #[arg(short = 't', long = "type", default_value = "text")]
    pub context_type: ContextType,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl EvaluateArgs {
    /// Assemble the request from a request file, inline flags, or stdin.
    pub fn to_request(&self) -> Result<EvaluationRequest> {
        if let Some(question) = &self.question {
            let raw = match (&self.context, &self.context_file) {
                (Some(inline), _) => inline.clone(),
                (None, Some(path)) => fs::read_to_string(path)
                    .with_context(|| format!("Failed to read context file {}", path.display()))?,
                (None, None) => read_stdin()?,
            };
            let context = context_value(&raw, self.context_type)?;
            return Ok(EvaluationRequest::new(context, question.clone(), self.context_type));
        }

        if self.context.is_some() || self.context_file.is_some() {
            anyhow::bail!("--question is required when passing --context or --context-file");
        }

        match self.request.as_deref() {
            Some(path) if path != Path::new("-") => load_request_file(path),
            _ => parse_request(&read_stdin()?, false),
        }
    }
}

/// Interpret raw context text for `context_type`.
///
/// List and dataframe contexts are structured and must be given as JSON.
pub fn context_value(raw: &str, context_type: ContextType) -> Result<JsonValue> {
    match context_type {
        ContextType::Text | ContextType::Csv => Ok(JsonValue::String(raw.to_string())),
        ContextType::List | ContextType::DataFrame => serde_json::from_str(raw)
            .with_context(|| format!("{} context must be valid JSON", context_type)),
    }
}

fn load_request_file(path: &Path) -> Result<EvaluationRequest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    parse_request(&content, yaml)
        .with_context(|| format!("Invalid request in {}", path.display()))
}

/// Parse a request document.
pub fn parse_request(content: &str, yaml: bool) -> Result<EvaluationRequest> {
    let request = if yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    Ok(request)
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}
