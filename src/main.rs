#![deny(unsafe_code)]

mod commands;
mod common;
mod config;
mod constants;
mod dpi;

use anyhow::Result;
use clap::{ArgGroup, Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::commands::ConfigAction;
use crate::common::debug::{SystemInfo, log_system_info};
use crate::config::{ConfigStore, StorageBackend};
use crate::dpi::{ScaleResolver, X11Probe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Lay out the application window using the resolved scale
    Run,
    /// Show, reset, import or export the configuration
    Configuration,
    /// Print scale and screen information
    Diagnostics,
}

#[derive(Parser)]
#[command(name = "dpi-config-manager")]
#[command(version)]
#[command(about = "Multi-module application with DPI and configuration support", long_about = None)]
#[command(group(ArgGroup::new("reset").multiple(false)))]
struct Cli {
    /// Operation mode
    #[arg(value_enum)]
    mode: Mode,

    /// Reset all configuration
    #[arg(long, group = "reset")]
    reset_all: bool,

    /// Reset configuration set for the given module
    #[arg(long, value_name = "MODULE", group = "reset")]
    reset_set: Option<String>,

    /// Reset a key in a configuration set (optionally with a new value)
    #[arg(long, num_args = 1.., value_names = ["MODULE", "KEY", "NEW_VALUE"], group = "reset")]
    reset_set_key: Option<Vec<String>>,

    /// Export configuration to a JSON file
    #[arg(long, value_name = "FILE")]
    export_config: Option<PathBuf>,

    /// Import configuration from a JSON file
    #[arg(long, value_name = "FILE")]
    import_config: Option<PathBuf>,

    /// Configuration file (or module directory with --separate-files)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Store each module in its own JSON file
    #[arg(long)]
    separate_files: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn backend(&self) -> StorageBackend {
        match (&self.config, self.separate_files) {
            (Some(path), false) => StorageBackend::SingleFile(path.clone()),
            (Some(path), true) => StorageBackend::PerModule(path.clone()),
            (None, false) => StorageBackend::default_single_file(),
            (None, true) => StorageBackend::default_per_module(),
        }
    }

    /// Resets take precedence over export, export over import
    fn config_action(&self) -> ConfigAction {
        if self.reset_all {
            ConfigAction::ResetAll
        } else if let Some(module) = &self.reset_set {
            ConfigAction::ResetModule(module.clone())
        } else if let Some(values) = &self.reset_set_key {
            ConfigAction::ResetKey(values.clone())
        } else if let Some(path) = &self.export_config {
            ConfigAction::Export(path.clone())
        } else if let Some(path) = &self.import_config {
            ConfigAction::Import(path.clone())
        } else {
            ConfigAction::Show
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so configuration output on stdout stays clean
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let mut store = ConfigStore::open(cli.backend());
    let seeded = store.register_plugin(constants::dpi::MODULE_NAME, ScaleResolver::default_settings());
    if seeded.is_failed() {
        warn!(
            plugin = constants::dpi::MODULE_NAME,
            "Default settings are kept in memory only for this run"
        );
    }

    let mut stdout = std::io::stdout().lock();
    let code = match cli.mode {
        Mode::Configuration => commands::configuration(&mut store, cli.config_action(), &mut stdout)?,
        Mode::Diagnostics => {
            let probe = X11Probe::query();
            let resolver = ScaleResolver::resolve(&mut store, &probe);
            let system = SystemInfo::collect();
            log_system_info(&system);
            commands::diagnostics(&store, &resolver, probe.screen_info(), &system, &mut stdout)?
        }
        Mode::Run => {
            let probe = X11Probe::query();
            let resolver = ScaleResolver::resolve(&mut store, &probe);
            let screen = probe.screen_info().map(|info| info.size_px);
            commands::run(&store, &resolver, screen, &mut stdout)?;
            commands::EXIT_OK
        }
    };

    stdout.flush()?;
    if code != commands::EXIT_OK {
        std::process::exit(i32::from(code));
    }
    Ok(())
}
