//! Main execution logic for the command-line host

use crate::cli::{Args, Emit, Shell};
use crate::codegen::Style;
use crate::config::Config;
use crate::context::Environment;
use crate::convert::{self, Conversion};
use crate::errors::{CurlgenieError, ErrorKind, ParseError, Result};
use crate::import::flags;
use crate::logging;
use crate::request::Warning;
use crate::status::ExitStatus;
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

/// Style used when neither `--style` nor the config names one
pub const DEFAULT_STYLE: Style = Style::ReqwestBlocking;

/// Main entry point for the CLI.
///
/// Handles argument parsing, configuration loading, and dispatches to the
/// listing or conversion handlers.
pub fn run(args: Vec<String>, mut env: Environment) -> ExitStatus {
    if let Some(name) = args.first() {
        if let Some(basename) = std::path::Path::new(name).file_stem() {
            env.program_name = basename.to_string_lossy().to_string();
        }
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}", e);
            Config::default()
        }
    };

    let merged_args = merge_default_options(args, &config);

    let traceback = wants_traceback(&merged_args);

    let parsed = match Args::try_parse_from(&merged_args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    logging::init(parsed.log_format.unwrap_or_default(), parsed.debug);

    if let Some(shell) = parsed.generate_completions {
        generate_completions(shell, &env.program_name);
        return ExitStatus::Success;
    }

    match program(parsed, &config, &mut env) {
        Ok(status) => status,
        Err(e) => handle_error(e, traceback),
    }
}

pub fn program(args: Args, config: &Config, env: &mut Environment) -> Result<ExitStatus> {
    debug!(?args, config_dir = %config.config_dir.display(), "Parsed arguments");

    if args.list_styles {
        print_styles(&mut env.stdout.lock())?;
        return Ok(ExitStatus::Success);
    }

    if args.list_flags {
        print_flags(&mut env.stdout.lock())?;
        return Ok(ExitStatus::Success);
    }

    let raw = match args.command_text() {
        Some(command) => command,
        None => env.read_stdin()?.ok_or(ParseError::EmptyCommand)?,
    };
    let style = args.style.or(config.default_style).unwrap_or(DEFAULT_STYLE);
    let mut out = env.stdout.lock();

    match args.emit {
        Emit::Code => {
            let conversion = convert::convert(&raw, style)?;
            if args.warnings {
                print_warnings(&conversion.warnings);
            }
            out.write_all(conversion.code.as_bytes())?;
        }
        Emit::Model => {
            let parsed = convert::import(&raw)?;
            if args.warnings {
                print_warnings(&parsed.warnings);
            }
            serde_json::to_writer_pretty(&mut out, &parsed.model).map_err(io::Error::from)?;
            writeln!(out)?;
        }
        Emit::Json => {
            let status = match convert::convert(&raw, style) {
                Ok(conversion) => {
                    write_envelope(&mut out, &Envelope::Success { style, conversion: &conversion })?;
                    ExitStatus::Success
                }
                Err(error) => {
                    write_envelope(&mut out, &Envelope::Failure { error: ErrorReport::from(&error) })?;
                    ExitStatus::Error
                }
            };
            return Ok(status);
        }
    }

    Ok(ExitStatus::Success)
}

/// Stdout document for `--emit json`
#[derive(Serialize)]
#[serde(untagged)]
enum Envelope<'a> {
    Success {
        style: Style,
        #[serde(flatten)]
        conversion: &'a Conversion,
    },
    Failure {
        error: ErrorReport,
    },
}

#[derive(Serialize)]
struct ErrorReport {
    kind: ErrorKind,
    message: String,
    offset: Option<usize>,
}

impl From<&CurlgenieError> for ErrorReport {
    fn from(error: &CurlgenieError) -> Self {
        let message = match error {
            CurlgenieError::Tokenize(e) => e.to_string(),
            CurlgenieError::Parse(e) => e.to_string(),
            CurlgenieError::Generation(e) => e.to_string(),
            other => other.to_string(),
        };
        Self { kind: error.kind(), message, offset: error.offset() }
    }
}

fn write_envelope(out: &mut impl Write, envelope: &Envelope<'_>) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, envelope).map_err(io::Error::from)?;
    writeln!(out)
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
}

fn print_styles(out: &mut impl Write) -> io::Result<()> {
    for style in Style::ALL {
        let marker = if style == DEFAULT_STYLE { " (default)" } else { "" };
        writeln!(out, "{:<18} {}{}", style.name(), style.description(), marker)?;
    }
    Ok(())
}

fn print_flags(out: &mut impl Write) -> io::Result<()> {
    for spec in flags::all() {
        let short = spec.short.map(|c| format!("-{},", c)).unwrap_or_default();
        let long = if spec.takes_argument() {
            format!("{} <ARG>", spec.long)
        } else {
            spec.long.to_string()
        };
        writeln!(out, "{:<4}{:<26}{:?}", short, long, spec.slot)?;
    }
    Ok(())
}

fn merge_default_options(args: Vec<String>, config: &Config) -> Vec<String> {
    if config.default_options.is_empty() {
        return args;
    }

    let (flags, positional): (Vec<_>, Vec<_>) = config.default_options.iter()
        .partition(|opt| opt.starts_with('-'));

    if !positional.is_empty() {
        eprintln!("Warning: Positional arguments in default_options are ignored: {:?}", positional);
        eprintln!("Only flags (starting with -) can be used in default_options.");
    }

    if flags.is_empty() {
        return args;
    }

    let mut merged = Vec::with_capacity(args.len() + flags.len());

    if let Some(program) = args.first() {
        merged.push(program.clone());
    }

    merged.extend(flags.into_iter().cloned());
    merged.extend(args.into_iter().skip(1));

    merged
}

/// `--traceback` or `--debug` among our own flags; words after `--`
/// belong to the curl command
fn wants_traceback(args: &[String]) -> bool {
    args.iter()
        .take_while(|a| *a != "--")
        .any(|a| a == "--traceback" || a == "--debug")
}

fn handle_error(error: CurlgenieError, traceback: bool) -> ExitStatus {
    if traceback {
        eprintln!("Error: {:?}", error);
    } else {
        eprintln!("Error: {}", error);
    }

    ExitStatus::Error
}

fn generate_completions(shell: Shell, program_name: &str) {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as ClapShell};

    let mut cmd = Args::command();
    let shell = match shell {
        Shell::Bash => ClapShell::Bash,
        Shell::Zsh => ClapShell::Zsh,
        Shell::Fish => ClapShell::Fish,
        Shell::PowerShell => ClapShell::PowerShell,
        Shell::Elvish => ClapShell::Elvish,
    };

    generate(shell, &mut cmd, program_name, &mut std::io::stdout());
}
