//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Lockgate -- advisory scanner for package installs.
///
/// Use `lockgate <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "lockgate", version, about, long_about = None)]
pub struct Cli {
    /// Path to the lockgate.toml configuration file.
    #[arg(short, long, default_value = "lockgate.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an advisory scan over a set of packages.
    Audit(AuditArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- audit ----

/// Scan packages for known security advisories.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Package specs to audit (`name@version`; scoped names like
    /// `@scope/pkg@1.0.0` are supported).
    pub packages: Vec<String>,

    /// JSON manifest holding an array of `{"name": ..., "version": ...}`
    /// objects, audited in addition to any positional specs.
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Override the registry base URL.
    #[arg(long)]
    pub registry: Option<String>,

    /// Surface scanner errors instead of failing open (diagnostics).
    #[arg(long)]
    pub strict: bool,
}

// ---- config ----

/// Inspect or validate the configuration file.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file.
    Validate,

    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Optional section to display (general, registry).
        section: Option<String>,
    },
}
