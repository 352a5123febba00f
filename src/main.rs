//! gridcfg - inspect and edit stored grid column layouts

use clap::{Parser, Subcommand};
use gridcfg::config::{ConfigError, ResolvedConfig};
use gridcfg::logging::LoggingError;
use gridcfg::model::{
    normalize_filters, ColumnFilter, GridConfiguration, GridName, InvalidGridName, StoreError,
};
use gridcfg::state::reorder_visible;
use gridcfg::store::{ColumnConfigStore, FileStore};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;

/// Inspect and edit persisted grid column layouts
#[derive(Parser, Debug)]
#[command(name = "gridcfg")]
#[command(version)]
#[command(about = "Inspect and edit persisted grid column layouts and filters")]
struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the layout store (overrides config and env)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List every grid with a stored layout
    List,
    /// Print one grid's layout
    Show { grid: String },
    /// Flip visibility of one column
    Toggle { grid: String, prop: String },
    /// Hide every toggleable column
    HideAll { grid: String },
    /// Show every toggleable column
    ShowAll { grid: String },
    /// Move a column, using positions among visible columns
    Move { grid: String, from: usize, to: usize },
    /// Forget a grid's stored layout
    Reset { grid: String },
    /// Print the normalized form of a JSON column filter list
    Normalize {
        file: PathBuf,
        /// One readable line per filter instead of JSON
        #[arg(long)]
        summary: bool,
    },
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    GridName(#[from] InvalidGridName),

    #[error("No stored layout for grid {0:?}")]
    UnknownGrid(String),

    #[error("Grid {grid:?} has no column {prop:?}")]
    UnknownColumn { grid: String, prop: String },

    #[error("Failed to read filter file {path:?}: {source}")]
    ReadFilters {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid filter JSON in {path:?}: {source}")]
    ParseFilters {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gridcfg: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Defaults → Config File → Env Vars → CLI Args
fn resolve_config(args: &Args) -> Result<ResolvedConfig, ConfigError> {
    let config_file = gridcfg::config::load_config_with_precedence(args.config.clone())?;
    let merged = gridcfg::config::merge_config(config_file);
    let with_env = gridcfg::config::apply_env_overrides(merged);
    Ok(gridcfg::config::apply_cli_overrides(
        with_env,
        args.store_dir.clone(),
    ))
}

fn run(args: Args) -> Result<(), AppError> {
    let config = resolve_config(&args)?;
    gridcfg::logging::init(&config.log_file_path)?;
    info!(config = ?config, command = ?args.command, "Configuration loaded and resolved");

    let mut store = ColumnConfigStore::new(
        FileStore::new(config.store_dir.clone()),
        config.storage_key.clone(),
    );
    let output = execute(&mut store, args.command)?;
    print!("{output}");
    Ok(())
}

/// Run one command against `store` and return what to print.
fn execute(store: &mut ColumnConfigStore, command: Command) -> Result<String, AppError> {
    match command {
        Command::List => {
            let mut out = String::new();
            for name in store.grid_names() {
                if let Some(config) = store.configuration(&name) {
                    let visible = config.visible_columns().count();
                    let _ = writeln!(out, "{name}\t{visible}/{} visible", config.columns.len());
                }
            }
            Ok(out)
        }
        Command::Show { grid } => Ok(render_layout(&stored(store, &grid)?)),
        Command::Toggle { grid, prop } => {
            let name = GridName::new(grid.clone())?;
            stored(store, &grid)?;
            if !store.toggle_column(&name, &prop)? {
                return Err(AppError::UnknownColumn { grid, prop });
            }
            Ok(render_layout(&stored(store, &grid)?))
        }
        Command::HideAll { grid } => set_all_hidden(store, grid, true),
        Command::ShowAll { grid } => set_all_hidden(store, grid, false),
        Command::Move { grid, from, to } => {
            let mut config = stored(store, &grid)?;
            let reordered = reorder_visible(&config.columns, from, to);
            if reordered != config.columns {
                config.columns = reordered;
                store.set_columns(&config)?;
            }
            Ok(render_layout(&config))
        }
        Command::Reset { grid } => {
            let name = GridName::new(grid.clone())?;
            if !store.forget(&name)? {
                return Err(AppError::UnknownGrid(grid));
            }
            Ok(format!("{grid}: layout reset\n"))
        }
        Command::Normalize { file, summary } => {
            let raw = std::fs::read_to_string(&file).map_err(|source| AppError::ReadFilters {
                path: file.clone(),
                source,
            })?;
            let filters: Vec<ColumnFilter> =
                serde_json::from_str(&raw).map_err(|source| AppError::ParseFilters {
                    path: file.clone(),
                    source,
                })?;
            let normalized = normalize_filters(&filters);
            if summary {
                return Ok(normalized.iter().map(|f| format!("{f}\n")).collect());
            }
            Ok(format!("{}\n", serde_json::to_string_pretty(&normalized)?))
        }
    }
}

fn stored(store: &ColumnConfigStore, grid: &str) -> Result<GridConfiguration, AppError> {
    store
        .configuration(grid)
        .ok_or_else(|| AppError::UnknownGrid(grid.to_string()))
}

fn set_all_hidden(
    store: &mut ColumnConfigStore,
    grid: String,
    hidden: bool,
) -> Result<String, AppError> {
    let name = GridName::new(grid.clone())?;
    if !store.toggle_all_columns(&name, hidden)? {
        return Err(AppError::UnknownGrid(grid));
    }
    Ok(render_layout(&stored(store, &grid)?))
}

/// One line per column: visibility box, prop, display name.
/// Columns that ignore "toggle all" are marked with `*`.
fn render_layout(config: &GridConfiguration) -> String {
    let width = config
        .columns
        .iter()
        .map(|c| c.prop.len())
        .max()
        .unwrap_or(0);
    let mut out = format!("{}\n", config.grid_name);
    for column in &config.columns {
        let mark = if column.hidden { ' ' } else { 'x' };
        let pinned = if column.suppress_toggle { "*" } else { "" };
        let _ = writeln!(
            out,
            "  [{mark}] {:<width$}  {}{pinned}",
            column.prop, column.name
        );
    }
    out
}
