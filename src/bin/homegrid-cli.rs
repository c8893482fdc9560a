use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use homegrid::common::config::{self, Config};
use homegrid::common::log::init_logging;
use homegrid::layout_engine::{LayoutCommand, LayoutEngine};
use homegrid::model::{Cell, HiddenSet, Item, JsonFileStore, PlacementStore};

#[derive(Parser)]
#[command(name = "homegrid-cli")]
#[command(about = "Inspect and edit homegrid's saved state")]
struct Cli {
    /// Config file to use instead of ~/.homegrid.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
    /// Home screen layout commands
    Layout {
        /// Placement file to use instead of the default one
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(subcommand)]
        layout_cmd: LayoutCommands,
    },
    /// Apps hidden from the drawer
    Hidden {
        #[command(subcommand)]
        hidden_cmd: HiddenCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Check the config file for invalid values
    Validate,
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand)]
enum LayoutCommands {
    /// Print every page
    Show,
    /// Place an app, at a cell or in the first free slot
    Add {
        package: String,
        component: String,
        #[arg(long, requires_all = ["x", "y"])]
        page: Option<u32>,
        #[arg(long)]
        x: Option<u32>,
        #[arg(long)]
        y: Option<u32>,
    },
    /// Remove every icon of a package
    Remove { package: String },
}

#[derive(Subcommand)]
enum HiddenCommands {
    List,
    Hide { package: String },
    Unhide { package: String },
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(config::config_file);
    match cli.command {
        Commands::Config { config_cmd } => run_config(config_cmd, &config_path),
        Commands::Layout { file, layout_cmd } => {
            let config = Config::read_or_default(&config_path)?;
            let store = JsonFileStore::new(file.unwrap_or_else(config::placements_file));
            run_layout(layout_cmd, &config, &store)
        }
        Commands::Hidden { hidden_cmd } => run_hidden(hidden_cmd, &config::hidden_file()),
    }
}

fn run_config(cmd: ConfigCommands, path: &Path) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Validate => {
            let config = Config::read(path).with_context(|| format!("reading {path:?}"))?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("{path:?} is valid");
                return Ok(());
            }
            for issue in &issues {
                println!("{issue}");
            }
            anyhow::bail!("{} issue(s) found", issues.len());
        }
        ConfigCommands::Init => {
            if path.exists() {
                anyhow::bail!("{path:?} already exists");
            }
            Config::default().save(path)?;
            println!("wrote {path:?}");
        }
        ConfigCommands::Show => {
            let mut config = Config::read_or_default(path)?;
            config.auto_fix_values();
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn run_layout(cmd: LayoutCommands, config: &Config, store: &JsonFileStore) -> anyhow::Result<()> {
    let items = store.load().with_context(|| format!("loading {:?}", store.path()))?;
    let mut engine = LayoutEngine::from_items(config.settings.home, items);

    let command = match cmd {
        LayoutCommands::Show => {
            print!("{}", engine.draw_tree());
            return Ok(());
        }
        LayoutCommands::Add { package, component, page, x, y } => {
            let item = Item::app(package, component);
            match (x, y) {
                (Some(x), Some(y)) => LayoutCommand::Place { item, page: page.unwrap_or(0), cell: Cell::new(x, y) },
                _ => LayoutCommand::AddAtFirstFreeSlot(item),
            }
        }
        LayoutCommands::Remove { package } => LayoutCommand::RemovePackage(package),
    };

    let response = engine.handle_command(command);
    if response.is_empty() {
        println!("nothing changed");
        return Ok(());
    }
    for evicted in &response.evicted {
        println!("evicted {evicted}");
    }
    for removed in &response.removed {
        println!("removed {removed}");
    }
    store.save(&engine.snapshot())?;
    print!("{}", engine.draw_tree());
    Ok(())
}

fn run_hidden(cmd: HiddenCommands, path: &Path) -> anyhow::Result<()> {
    let mut hidden = HiddenSet::load(path)?;
    let (package, hide) = match cmd {
        HiddenCommands::List => {
            for package in hidden.iter() {
                println!("{package}");
            }
            return Ok(());
        }
        HiddenCommands::Hide { package } => (package, true),
        HiddenCommands::Unhide { package } => (package, false),
    };
    if hidden.set_hidden(&package, hide) {
        hidden.save(path)?;
    }
    Ok(())
}
