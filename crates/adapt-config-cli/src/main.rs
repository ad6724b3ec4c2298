//! Operator tool that resolves module configuration and prints the result.

use adapt_config::{ConfigError, ConfigLoader, LoadOptions, ModuleDescriptor};
use anyhow::{Context, bail};
use clap::Parser;
use log::{LevelFilter, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Command-line options for resolving a module set.
#[derive(Parser)]
#[command(name = "adapt-conf", version)]
struct Cli {
    /// Application root directory
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Deployment environment (defaults to NODE_ENV)
    #[arg(long = "env")]
    environment: Option<String>,
    /// Explicit path to the user config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Module resolved before all others
    #[arg(long)]
    core: Option<String>,
    /// Module to resolve, as name=path (repeatable)
    #[arg(long = "module", value_parser = parse_module)]
    modules: Vec<ModuleDescriptor>,
    /// Reserved environment variable prefix
    #[arg(long)]
    env_prefix: Option<String>,
    /// Schema file location relative to each module root
    #[arg(long)]
    schema_file: Option<PathBuf>,
    /// Only print public values that are also mutable
    #[arg(long, conflicts_with = "all")]
    mutable_only: bool,
    /// Print every stored value instead of the public view
    #[arg(long)]
    all: bool,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::new(&self.root).with_modules(self.modules.clone());
        if let Some(environment) = &self.environment {
            options = options.with_environment(environment.clone());
        }
        if let Some(path) = &self.config {
            options = options.with_user_config_path(path);
        }
        if let Some(core) = &self.core {
            options = options.with_core_module(core.clone());
        }
        if let Some(prefix) = &self.env_prefix {
            options = options.with_env_prefix(prefix.clone());
        }
        if let Some(schema_file) = &self.schema_file {
            options = options.with_schema_file(schema_file);
        }
        options
    }
}

/// Parse a `name=path` module argument.
fn parse_module(raw: &str) -> Result<ModuleDescriptor, String> {
    let Some((name, path)) = raw.split_once('=') else {
        return Err(format!("expected name=path, got '{raw}'"));
    };
    let name = name.trim();
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected name=path, got '{raw}'"));
    }
    Ok(ModuleDescriptor::new(name, path))
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .filter_level(log_level(cli.verbose))
        .parse_default_env()
        .try_init();

    if cli.modules.is_empty() {
        bail!("at least one --module name=path is required");
    }
    info!(
        "resolving config (root={}, modules={}, core={})",
        cli.root.display(),
        cli.modules.len(),
        cli.core.as_deref().unwrap_or("none")
    );

    let loaded = match ConfigLoader::new(cli.load_options()).load().await {
        Ok(loaded) => loaded,
        Err(ConfigError::Resolution(failure)) => {
            eprintln!("{failure}");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).context("failed to load config"),
    };

    let output = if cli.all {
        serde_json::Value::Object(loaded.store.snapshot())
    } else {
        loaded.public_view().to_json(cli.mutable_only)
    };
    let rendered = serde_json::to_string_pretty(&output).context("failed to render config")?;
    println!("{rendered}");
    Ok(ExitCode::SUCCESS)
}
