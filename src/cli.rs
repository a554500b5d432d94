//! CLI argument parsing for the enhancement workflow.
//!
//! The CLI is intentionally thin: it wires one interactive session without
//! embedding enhancement policy, so the same core can be reused elsewhere.
use clap::{Parser, Subcommand};

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "iscribe",
    version,
    about = "AI-assisted bilingual workplace-incident documentation helper",
    after_help = "Examples:\n  iscribe enhance --description \"Manager shouted at me in the meeting on 2024-03-01 at 10:30\"\n  iscribe enhance --description \"...\" --date 2024-03-01 --time 10:30 --json\n  iscribe extract --text \"It happened on 2024/3/5 around 9.15\"",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Enhance(EnhanceArgs),
    Extract(ExtractArgs),
}

/// Enhance command inputs for one interactive session.
#[derive(Parser, Debug)]
#[command(about = "Enhance and translate an incident description")]
pub struct EnhanceArgs {
    /// Free-text incident description
    #[arg(long, value_name = "TEXT")]
    pub description: String,

    /// Incident date override (YYYY-MM-DD); extracted from the text otherwise
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Incident time override (HH:MM); extracted from the text otherwise
    #[arg(long, value_name = "TIME")]
    pub time: Option<String>,

    /// API key; falls back to the GROQ_API_KEY environment variable
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Chat-completions endpoint
    #[arg(long, value_name = "URL", default_value = crate::ai::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Model identifier
    #[arg(long, value_name = "MODEL", default_value = crate::ai::DEFAULT_MODEL)]
    pub model: String,

    /// Accept the finalized enhancement without prompting
    #[arg(long)]
    pub yes: bool,

    /// Emit the accepted record as pretty JSON
    #[arg(long)]
    pub json: bool,
}

/// Extract command inputs (debugging aid for the recognition rules).
#[derive(Parser, Debug)]
#[command(about = "Extract date and time from free text")]
pub struct ExtractArgs {
    /// Free-text incident description
    #[arg(long, value_name = "TEXT")]
    pub text: String,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
