//! `lockgate config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use lockgate_core::config::LockgateConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let result = LockgateConfig::load(config_path).await;

    let report = match result {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Loads and displays the effective configuration (file + env overrides +
/// defaults), optionally filtered to one section.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = LockgateConfig::load(config_path)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;

    let report = match section.as_deref() {
        Some("general") => ConfigReport {
            source: config_path.display().to_string(),
            section: Some("general".to_owned()),
            config_toml: toml::to_string_pretty(&config.general)
                .unwrap_or_else(|e| format!("(serialization error: {})", e)),
        },
        Some("registry") => ConfigReport {
            source: config_path.display().to_string(),
            section: Some("registry".to_owned()),
            config_toml: toml::to_string_pretty(&config.registry)
                .unwrap_or_else(|e| format!("(serialization error: {})", e)),
        },
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown config section '{other}': expected general or registry"
            )));
        }
        None => ConfigReport {
            source: config_path.display().to_string(),
            section: None,
            config_toml: toml::to_string_pretty(&config)
                .unwrap_or_else(|e| format!("(serialization error: {})", e)),
        },
    };

    writer.render(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config: {}", self.source)?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    pub section: Option<String>,
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => writeln!(w, "Config: {} [{}]", self.source, section.bold())?,
            None => writeln!(w, "Config: {}", self.source)?,
        }
        writeln!(w)?;
        writeln!(w, "{}", self.config_toml)?;
        Ok(())
    }
}
