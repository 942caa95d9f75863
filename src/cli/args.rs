//! CLI argument definitions using clap

use crate::codegen::Style;
use clap::{ArgAction, Parser, ValueEnum};

/// curlgenie - Turn curl commands into HTTP client code
#[derive(Parser, Debug, Clone)]
#[command(name = "curlgenie", version, about, long_about = None)]
pub struct Args {
    // =========================================================================
    // POSITIONAL ARGUMENTS
    // =========================================================================

    /// The curl command, quoted as one argument or given word by word after
    /// `--`. Read from stdin when omitted.
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    // =========================================================================
    // GENERATION
    // =========================================================================

    /// Target client style
    #[arg(short = 's', long = "style", value_name = "STYLE", value_enum)]
    pub style: Option<Style>,

    /// What to print on stdout
    #[arg(long = "emit", value_name = "WHAT", value_enum, default_value_t = Emit::Code)]
    pub emit: Emit,

    /// Print parser warnings to stderr
    #[arg(long = "warnings", action = ArgAction::SetTrue)]
    pub warnings: bool,

    // =========================================================================
    // LISTINGS
    // =========================================================================

    /// List the available styles and exit
    #[arg(long = "list-styles", action = ArgAction::SetTrue)]
    pub list_styles: bool,

    /// List the recognized curl flags and exit
    #[arg(long = "list-flags", action = ArgAction::SetTrue)]
    pub list_flags: bool,

    // =========================================================================
    // TROUBLESHOOTING
    // =========================================================================

    /// Output format for structured logging: json (JSON Lines) or text (default)
    #[arg(long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Show traceback on error
    #[arg(long = "traceback", action = ArgAction::SetTrue)]
    pub traceback: bool,

    /// Debug mode (implies --traceback)
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,

    // =========================================================================
    // GENERATION (hidden)
    // =========================================================================

    /// Generate shell completions for the specified shell
    #[arg(long = "generate-completions", value_name = "SHELL", value_enum, hide = true)]
    pub generate_completions: Option<Shell>,
}

/// What the CLI prints on success
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// Generated source code
    #[default]
    Code,
    /// The parsed request as JSON
    Model,
    /// A JSON envelope with code and warnings, or the error
    Json,
}

/// Shell types for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Log format for structured output
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}

impl Args {
    /// The command text, re-quoting words the shell already split
    pub fn command_text(&self) -> Option<String> {
        match self.command.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            words => Some(
                words
                    .iter()
                    .map(|word| crate::strings::shell_quote(word))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }
}
