//! axinspect - Accessibility object tree inspector.
//!
//! Usage:
//!   axinspect list TREE                 List the visible objects of a window dump
//!   axinspect path TREE EXPR            Show one object and its identifier
//!   axinspect ascendants TREE EXPR      List an object's ascendants
//!   axinspect siblings TREE EXPR        List an object's siblings
//!   axinspect children TREE EXPR        List an object's children
//!   axinspect favorite TREE EXPR        Toggle an object's favorite flag
//!   axinspect export-favorites DEST     Copy the favorites file
//!   axinspect import-favorites SRC      Merge a favorites file
//!   axinspect settings                  Show or change settings
//!   axinspect --help                    Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use itertools::Itertools;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use axinspect_analyze::{FilterState, IdentityHasher, Relation, RoleCategory};
use axinspect_core::memory::{MemoryNode, MemoryTree};
use axinspect_core::{AncestryPath, InspectConfig};
use axinspect_inspector::{Inspector, ListView, ScanProgress, Settings};

#[derive(Parser)]
#[command(
    name = "axinspect",
    version,
    about = "Inspect the accessibility object tree of a window",
    long_about = "axinspect lists the visible objects of an application window, \
                  filters and searches them, shows their relatives, and keeps a \
                  persistent set of favorite objects.\n\n\
                  Windows are read from JSON tree dumps. Objects are addressed by \
                  path expressions such as `root.child[0].child[3]`."
)]
struct Cli {
    /// Favorites file (overrides the settings file)
    #[arg(long, global = true)]
    favorites: Option<PathBuf>,

    /// Descend into document objects while scanning
    #[arg(long, global = true)]
    drill_documents: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the visible objects of a window
    List {
        /// Window tree dump (JSON)
        tree: PathBuf,

        /// Role category to show
        #[arg(short, long, default_value = "all")]
        category: RoleCategory,

        /// Case-insensitive caption search
        #[arg(short, long, default_value = "")]
        search: String,

        /// Hide objects with neither name nor description
        #[arg(long)]
        hide_untagged: bool,

        /// Show favorite objects only
        #[arg(short = 'F', long)]
        favorites_only: bool,

        /// Announce the object at this 1-based list position
        #[arg(short, long)]
        jump: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one object, its path expression and its identifier
    Path {
        /// Window tree dump (JSON)
        tree: PathBuf,

        /// Path expression, e.g. `root.child[1]`
        expr: String,
    },

    /// List the objects from the root down to an object
    Ascendants {
        tree: PathBuf,
        expr: String,
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the children of an object's parent
    Siblings {
        tree: PathBuf,
        expr: String,
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List every child of an object, visible or not
    Children {
        tree: PathBuf,
        expr: String,
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Add an object to the favorites, or remove it
    Favorite {
        /// Window tree dump (JSON)
        tree: PathBuf,

        /// Path expression of the object
        expr: String,
    },

    /// Copy the favorites to another file
    ExportFavorites {
        /// Destination file
        dest: PathBuf,

        /// Replace the destination if it exists
        #[arg(long)]
        force: bool,
    },

    /// Merge favorites from another file
    ImportFavorites {
        /// Favorites file to merge
        src: PathBuf,
    },

    /// Show or change the persistent settings
    Settings {
        /// Descend into document objects by default
        #[arg(long)]
        documents: Option<bool>,

        /// Default favorites file
        #[arg(long)]
        favorites_path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli);

    match cli.command {
        Command::List {
            tree,
            category,
            search,
            hide_untagged,
            favorites_only,
            jump,
            format,
        } => {
            let filter = FilterState::new()
                .with_role_category(category)
                .with_search(search)
                .hiding_untagged(hide_untagged)
                .only_favorites(favorites_only);
            run_list(config, &tree, filter, jump.as_deref(), format).await?;
        }
        Command::Path { tree, expr } => {
            run_path(config, &tree, &expr).await?;
        }
        Command::Ascendants { tree, expr, format } => {
            run_relatives(config, &tree, &expr, Relation::Ascendants, format).await?;
        }
        Command::Siblings { tree, expr, format } => {
            run_relatives(config, &tree, &expr, Relation::Siblings, format).await?;
        }
        Command::Children { tree, expr, format } => {
            run_relatives(config, &tree, &expr, Relation::Children, format).await?;
        }
        Command::Favorite { tree, expr } => {
            run_favorite(config, &tree, &expr).await?;
        }
        Command::ExportFavorites { dest, force } => {
            let inspector = Inspector::<MemoryNode>::open(config);
            let count = inspector
                .export_favorites(&dest, force)
                .context("Export failed")?;
            println!("Favorites have been saved correctly ({count} objects)");
        }
        Command::ImportFavorites { src } => {
            let mut inspector = Inspector::<MemoryNode>::open(config);
            let outcome = inspector
                .import_favorites(&src)
                .await
                .with_context(|| format!("Error loading {}", src.display()))?;
            println!("{}", outcome.summary.message());
            if let Some(err) = outcome.save_error {
                eprintln!("Favorites have been loaded but can not be saved on file: {err}");
            }
        }
        Command::Settings {
            documents,
            favorites_path,
        } => {
            run_settings(documents, favorites_path)?;
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `AXINSPECT_LOG` (default `warn`).
fn init_logging() {
    let filter =
        EnvFilter::try_from_env("AXINSPECT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Settings file plus command-line overrides.
fn load_config(cli: &Cli) -> InspectConfig {
    let mut config = Settings::load().to_config();
    if cli.drill_documents {
        config.drill_into_documents = true;
    }
    if let Some(path) = &cli.favorites {
        config.favorites_path = Some(path.clone());
    }
    config
}

/// Load a tree dump, scan it and wait for favorite tagging.
async fn open_window(config: InspectConfig, tree: &Path) -> Result<Inspector<MemoryNode>> {
    let root =
        MemoryTree::load(tree).with_context(|| format!("Failed to load {}", tree.display()))?;

    let mut inspector = Inspector::open(config);
    let mut progress = inspector.subscribe();
    let reporter = tokio::spawn(async move {
        loop {
            match progress.recv().await {
                Ok(update @ ScanProgress::StillWorking { .. }) => {
                    if let Some(message) = update.message() {
                        eprintln!("{message}");
                    }
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    eprintln!("Searching...");
    let scanned = inspector.scan(root).await.map(|snapshot| snapshot.len());
    reporter.abort();
    let count = scanned.context("Search failed")?;

    let favorites = inspector
        .wait_for_favorites()
        .await
        .context("Favorites could not be tagged")?;
    debug!(count, favorites, "window ready");

    Ok(inspector)
}

fn parse_expr(expr: &str) -> Result<AncestryPath> {
    expr.parse()
        .with_context(|| format!("Invalid path expression `{expr}`"))
}

/// List the window's objects through a filter.
async fn run_list(
    config: InspectConfig,
    tree: &Path,
    filter: FilterState,
    jump: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let mut inspector = open_window(config, tree).await?;
    let view = inspector.apply_filter(filter)?;

    match jump {
        Some(input) => {
            let node = view.jump_to(input)?;
            let position = view
                .entries
                .iter()
                .position(|entry| entry.path == node.path);
            println!("{}", node.caption);
            println!("{}", view.position_message(position));
        }
        None => print_view(&view, format)?,
    }

    Ok(())
}

/// Show a single object.
async fn run_path(config: InspectConfig, tree: &Path, expr: &str) -> Result<()> {
    let path = parse_expr(expr)?;
    let mut inspector = open_window(config, tree).await?;
    let node = inspector.locate(&path)?;

    let snapshot = inspector
        .snapshot()
        .ok_or_else(|| eyre!("No window has been scanned"))?;
    let id = IdentityHasher::new().identify(snapshot, &node)?;
    let is_favorite = inspector.favorites().contains(&id);

    let chain = inspector.ascendants(&node)?;

    println!("{}", node.caption);
    println!(" path:      {}", inspector.describe(&node));
    println!(
        " ancestry:  {}",
        chain.entries.iter().map(|n| n.role.label()).join(" > ")
    );
    println!(" id:        {id}");
    println!(" favorite:  {}", if is_favorite { "yes" } else { "no" });

    Ok(())
}

/// List the relatives of an object.
async fn run_relatives(
    config: InspectConfig,
    tree: &Path,
    expr: &str,
    relation: Relation,
    format: OutputFormat,
) -> Result<()> {
    let path = parse_expr(expr)?;
    let mut inspector = open_window(config, tree).await?;
    let node = inspector.locate(&path)?;
    let view = inspector.show_relatives(relation, &node)?;
    print_view(&view, format)
}

/// Toggle an object's favorite flag.
async fn run_favorite(config: InspectConfig, tree: &Path, expr: &str) -> Result<()> {
    let path = parse_expr(expr)?;
    let mut inspector = open_window(config, tree).await?;
    let node = inspector.locate(&path)?;

    let outcome = inspector
        .toggle_favorite(&node)
        .await
        .context("Object can not be favorited")?;
    println!("{}: {}", outcome.message(), node.caption);
    if let Some(err) = outcome.save_error {
        eprintln!("Can not save favorites file: {err}");
    }

    Ok(())
}

/// Show the settings, updating them first when asked.
fn run_settings(documents: Option<bool>, favorites_path: Option<PathBuf>) -> Result<()> {
    let mut settings = Settings::load();
    let changed = documents.is_some() || favorites_path.is_some();

    if let Some(drill) = documents {
        settings.drill_into_documents = drill;
    }
    if let Some(path) = favorites_path {
        settings.favorites_path = Some(path);
    }
    if changed {
        settings.save().context("Failed to save settings")?;
    }

    if let Some(path) = Settings::config_path() {
        println!(" settings file:         {}", path.display());
    }
    println!(" drill into documents:  {}", settings.drill_into_documents);
    println!(
        " favorites file:        {}",
        settings
            .favorites_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "default".to_string())
    );

    Ok(())
}

fn print_view(view: &ListView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" {}", view.title);
            println!(" {}", view.label);
            println!("{}", "─".repeat(70));
            println!();

            if view.is_empty() {
                println!(" {}", view.position_message(None));
            }
            for (i, node) in view.entries.iter().enumerate() {
                let marker = if node.favorite { "*" } else { " " };
                println!("{:>5} {marker} {:<50} {}", i + 1, node.caption, node.path);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "title": view.title,
                "label": view.label,
                "filters_enabled": view.filters_enabled,
                "entries": view.entries,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
