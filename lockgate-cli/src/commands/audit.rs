//! `lockgate audit` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use lockgate_advisory_scanner::{AdvisoryScanner, AdvisoryScannerConfig, AuditReport};
use lockgate_core::config::LockgateConfig;
use lockgate_core::types::PackageRef;

use crate::cli::AuditArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `audit` command.
pub async fn execute(
    args: AuditArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path).await?;

    let mut registry = config.registry.clone();
    if let Some(url) = args.registry {
        registry.url = url;
    }
    let scanner_config = AdvisoryScannerConfig::from_core(&registry);

    let packages = collect_packages(&args.packages, args.manifest.as_deref())?;
    if packages.is_empty() {
        return Err(CliError::Command(
            "no packages to audit; pass name@version specs or --manifest".to_owned(),
        ));
    }

    info!(packages = packages.len(), "starting advisory audit");

    let scanner = AdvisoryScanner::with_http(scanner_config)
        .map_err(|e| CliError::Audit(e.to_string()))?;

    let report = if args.strict {
        scanner
            .audit_strict(&packages)
            .await
            .map_err(|e| CliError::Audit(e.to_string()))?
    } else {
        scanner.audit(&packages).await
    };

    let cli_report = build_report(&report);
    writer.render(&cli_report)?;

    if cli_report.advisories.fatal > 0 {
        return Err(CliError::FatalAdvisories {
            count: cli_report.advisories.fatal,
        });
    }

    Ok(())
}

/// Load the configuration, falling back to defaults when the default config
/// file does not exist. A user-specified path that is missing is an error.
async fn load_config(config_path: &Path) -> Result<LockgateConfig, CliError> {
    match LockgateConfig::load(config_path).await {
        Ok(config) => Ok(config),
        Err(lockgate_core::error::LockgateError::Config(
            lockgate_core::error::ConfigError::FileNotFound { .. },
        )) if config_path == Path::new("lockgate.toml") => {
            let mut config = LockgateConfig::default();
            config.apply_env_overrides();
            config.validate().map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        }
        Err(e) => Err(CliError::Core(e)),
    }
}

/// Gather packages from positional specs and the optional manifest file.
fn collect_packages(
    specs: &[String],
    manifest: Option<&Path>,
) -> Result<Vec<PackageRef>, CliError> {
    let mut packages = Vec::new();

    for spec in specs {
        packages.push(parse_package_spec(spec)?);
    }

    if let Some(path) = manifest {
        let content = std::fs::read_to_string(path)?;
        let mut from_manifest: Vec<PackageRef> = serde_json::from_str(&content)
            .map_err(|e| CliError::Command(format!("invalid manifest {}: {e}", path.display())))?;
        packages.append(&mut from_manifest);
    }

    Ok(packages)
}

/// Parse a `name@version` spec, supporting scoped names (`@scope/pkg@1.0.0`).
fn parse_package_spec(spec: &str) -> Result<PackageRef, CliError> {
    let invalid = || {
        CliError::Command(format!(
            "invalid package spec '{spec}': expected name@version"
        ))
    };

    let (name, version) = spec.rsplit_once('@').ok_or_else(invalid)?;
    if name.is_empty() || version.is_empty() {
        return Err(invalid());
    }

    Ok(PackageRef::new(name, version))
}

fn build_report(report: &AuditReport) -> AuditCliReport {
    let counts = report.level_counts();
    let records = report
        .advisories
        .iter()
        .map(|a| AdvisoryEntry {
            id: a.id.clone(),
            level: a.level.to_string(),
            package: a.package.clone(),
            message: a.message.clone(),
            url: a.url.clone(),
            description: a.description.clone(),
        })
        .collect();

    AuditCliReport {
        scan_id: report.scan_id.clone(),
        total_packages: report.total_packages,
        unique_packages: report.unique_packages,
        advisories: AdvisorySummary {
            fatal: counts.fatal,
            warn: counts.warn,
            total: counts.total(),
        },
        records,
    }
}

#[derive(Serialize)]
pub struct AuditCliReport {
    pub scan_id: String,
    pub total_packages: usize,
    pub unique_packages: usize,
    pub advisories: AdvisorySummary,
    pub records: Vec<AdvisoryEntry>,
}

#[derive(Serialize, Default)]
pub struct AdvisorySummary {
    pub fatal: usize,
    pub warn: usize,
    pub total: usize,
}

#[derive(Serialize)]
pub struct AdvisoryEntry {
    pub id: String,
    pub level: String,
    pub package: String,
    pub message: String,
    pub url: String,
    pub description: Option<String>,
}

impl Render for AuditCliReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Audit: {} packages ({} unique)",
            self.total_packages, self.unique_packages
        )?;

        let summary = format!(
            "{} total (fatal:{} warn:{})",
            self.advisories.total, self.advisories.fatal, self.advisories.warn
        );
        if self.advisories.fatal > 0 {
            writeln!(w, "Advisories: {}", summary.red().bold())?;
        } else if self.advisories.warn > 0 {
            writeln!(w, "Advisories: {}", summary.yellow().bold())?;
        } else {
            writeln!(w, "Advisories: {}", summary.green().bold())?;
        }

        writeln!(w)?;

        if self.records.is_empty() {
            writeln!(w, "{}", "No advisories found.".green())?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<7} {:<28} {:<12} Advisory",
            "Level", "Package", "ID"
        )?;
        writeln!(w, "{}", "-".repeat(80))?;

        for record in &self.records {
            let level_colored = match record.level.as_str() {
                "fatal" => record.level.red().bold(),
                "warn" => record.level.yellow(),
                _ => record.level.normal(),
            };

            writeln!(
                w,
                "{:<7} {:<28} {:<12} {}",
                level_colored, record.package, record.id, record.message
            )?;

            if let Some(ref description) = record.description {
                writeln!(w, "        {}", description.dimmed())?;
            }
            writeln!(w, "        {}", record.url.dimmed())?;
        }

        Ok(())
    }
}
