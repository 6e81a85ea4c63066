use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use libscan::{
    audit::Auditor,
    cache::Cache,
    checker::{AdvisorySource, CachedAdvisorySource, GitHubAdvisoryClient},
    config::Config,
    error::ManifestError,
    logger::{AuditLogger, TracingLogger},
    manifest::load_manifest,
    model::{AuditReport, Severity},
    output::{format_result_to_string, print_result, OutputFormat},
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const CRITICAL_VULN: u8 = 2;
    pub const HIGH_VULN: u8 = 3;
    pub const MEDIUM_VULN: u8 = 4;
    pub const LOW_VULN: u8 = 5;
}

#[derive(Parser)]
#[command(name = "libscan")]
#[command(
    author,
    version,
    about = "Audit libman.json client-side libraries for known vulnerabilities"
)]
struct Cli {
    /// Config file (defaults to the per-user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "libscan=debug" (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a library manifest
    Audit {
        /// Path to the manifest
        #[arg(short, long, default_value = "libman.json")]
        manifest: PathBuf,

        /// Output format (table, json, sarif)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with error if a package at or above this severity is vulnerable
        #[arg(long, value_enum)]
        fail_on: Option<FailLevel>,

        /// Bypass the advisory cache
        #[arg(long)]
        no_cache: bool,

        /// Maximum advisory queries in flight
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Clear the advisory cache
    ClearCache,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl FailLevel {
    fn threshold(self) -> Severity {
        match self {
            FailLevel::Critical => Severity::Critical,
            FailLevel::High => Severity::High,
            FailLevel::Medium => Severity::Medium,
            FailLevel::Low => Severity::Low,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };

    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_tracing(log_level, cli.log_format)?;

    match cli.command {
        Commands::Audit {
            manifest,
            format,
            output,
            fail_on,
            no_cache,
            concurrency,
        } => {
            let format_str = format.unwrap_or(config.default_format.clone());
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
            let concurrency = concurrency.unwrap_or(config.concurrency);
            let use_cache = config.use_cache && !no_cache;

            run_audit(
                &config,
                &manifest,
                format,
                output,
                fail_on,
                use_cache,
                concurrency,
            )
            .await
        }
        Commands::Config { init, path } => {
            handle_config(cli.config.as_deref(), init, path)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ClearCache => {
            let cache = Cache::new();
            let removed = cache.clear()?;
            println!("Cache cleared ({} entries removed).", removed);
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {}", e))
}

async fn run_audit(
    config: &Config,
    manifest: &Path,
    format: OutputFormat,
    output_file: Option<PathBuf>,
    fail_on: Option<FailLevel>,
    use_cache: bool,
    concurrency: usize,
) -> Result<u8> {
    let logger = TracingLogger::shared();
    let label = manifest.display().to_string();

    let text = match load_manifest(manifest) {
        Ok(text) => text,
        Err(e) => {
            logger.log_error(&format!("Library manifest not found at: {} ({})", label, e));
            return Ok(exit_codes::ERROR);
        }
    };

    let client = GitHubAdvisoryClient::from_config(config, logger.clone())?;
    let is_interactive = format == OutputFormat::Table && output_file.is_none();

    let result = if use_cache {
        let cache = Cache::with_ttl_hours(config.cache_ttl_hours);
        let source = CachedAdvisorySource::new(client, cache);
        audit_with(source, config, logger, concurrency, &label, &text, is_interactive).await
    } else {
        audit_with(client, config, logger, concurrency, &label, &text, is_interactive).await
    };

    // The failure has already been logged by the auditor.
    let report = match result {
        Ok(report) => report,
        Err(_) => return Ok(exit_codes::ERROR),
    };

    if let Some(path) = output_file {
        std::fs::write(&path, format_result_to_string(&report, format)?)?;
        if format == OutputFormat::Table {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_result(&report, format)?;
    }

    Ok(determine_exit_code(&report, fail_on))
}

async fn audit_with<S: AdvisorySource>(
    source: S,
    config: &Config,
    logger: Arc<dyn AuditLogger>,
    concurrency: usize,
    label: &str,
    text: &str,
    is_interactive: bool,
) -> Result<AuditReport, ManifestError> {
    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Checking {} against {}...", label, source.name()));
        Some(pb)
    } else {
        None
    };

    let auditor = Auditor::new(source, logger)
        .with_concurrency(concurrency)
        .with_ignore(config.ignore.clone());
    let result = auditor.audit_manifest(label, text).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    result
}

/// Determine the exit code based on vulnerable packages and --fail-on setting
fn determine_exit_code(report: &AuditReport, fail_on: Option<FailLevel>) -> u8 {
    let Some(fail_on) = fail_on else {
        return exit_codes::SUCCESS;
    };

    match report.max_severity() {
        Some(worst) if worst >= fail_on.threshold() => match worst {
            Severity::Critical => exit_codes::CRITICAL_VULN,
            Severity::High => exit_codes::HIGH_VULN,
            Severity::Medium => exit_codes::MEDIUM_VULN,
            Severity::Low => exit_codes::LOW_VULN,
            Severity::Unknown => exit_codes::SUCCESS,
        },
        _ => exit_codes::SUCCESS,
    }
}

fn handle_config(explicit: Option<&Path>, init: bool, show_path: bool) -> Result<()> {
    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::config_path);

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        Config::default().save_to(&config_path)?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'libscan config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
