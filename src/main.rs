//! Foreman data inspector
//!
//! Loads game and mod data and prints what the ingestion pass produced.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use foreman_data::ingest::DEFAULT_LANGUAGE;
use foreman_data::{GameData, LoadOptions, load_game_data, sources};

#[derive(Parser)]
#[command(name = "foreman-data")]
#[command(about = "Inspect Factorio game data as seen by the production planner")]
struct Cli {
    /// Game installation directory (located automatically when omitted)
    #[arg(short, long)]
    game: Option<PathBuf>,

    /// Mod directory to load; repeat to load several, in order
    #[arg(short = 'm', long = "mod")]
    mods: Vec<PathBuf>,

    /// Directory whose sub-directories are mods
    #[arg(long)]
    mods_dir: Vec<PathBuf>,

    /// Locale to read display names from
    #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how many prototypes of each kind were loaded
    Summary,

    /// List all items
    Items,

    /// List all recipes
    Recipes,

    /// Show details for a specific recipe
    Recipe {
        /// Recipe technical name
        name: String,
    },

    /// List assemblers and furnaces
    Machines,

    /// List mining drills
    Miners,

    /// List minable resources
    Resources,

    /// List speed modules
    Modules,

    /// List mod directories in load order
    Mods,

    /// Print the game installation directory that would be used
    Locate,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Locate => {
            let root = game_root(&cli)?;
            println!("{}", root.display());
            return Ok(());
        }
        Commands::Mods => {
            let mods = mod_dirs(&cli);
            if mods.is_empty() {
                println!("No mods found.");
            }
            for (i, m) in mods.iter().enumerate() {
                println!("{:>3}. {}", i + 1, m.display());
            }
            return Ok(());
        }
        _ => {}
    }

    let options = LoadOptions {
        language: cli.language.clone(),
        ..LoadOptions::new(game_root(&cli)?).with_mods(mod_dirs(&cli))
    };
    let data = load_game_data(&options)
        .with_context(|| format!("Failed to load game data from {}", options.game_root.display()))?;

    match cli.command {
        Commands::Summary => println!("{}", data.stats()),

        Commands::Items => {
            println!("{:<40} {:<40} {:>8}", "Item", "Name", "Recipes");
            println!("{}", "-".repeat(90));
            for item in data.items.values() {
                println!(
                    "{:<40} {:<40} {:>8}",
                    item.name,
                    item.display_name(),
                    item.recipes.len()
                );
            }
        }

        Commands::Recipes => {
            println!("{:<40} {:<24} {:>8}", "Recipe", "Category", "Time (s)");
            println!("{}", "-".repeat(74));
            for recipe in data.recipes.values() {
                println!(
                    "{:<40} {:<24} {:>8.2}",
                    data.recipe_display_name(&recipe.name),
                    recipe.category,
                    recipe.time
                );
            }
        }

        Commands::Recipe { name } => print_recipe(&data, &name)?,

        Commands::Machines => {
            println!(
                "{:<32} {:<10} {:>6} {:>7} {:>8}  {}",
                "Machine", "Kind", "Speed", "Modules", "Inputs", "Categories"
            );
            println!("{}", "-".repeat(90));
            for m in data.machines.values() {
                println!(
                    "{:<32} {:<10} {:>6.2} {:>7} {:>8}  {}",
                    m.display_name(),
                    format!("{:?}", m.kind),
                    m.speed,
                    m.module_slots,
                    m.max_ingredients,
                    join(&m.categories)
                );
            }
        }

        Commands::Miners => {
            println!("{:<32} {:>6} {:>6} {:>7}  {}", "Miner", "Power", "Speed", "Modules", "Categories");
            println!("{}", "-".repeat(80));
            for m in data.miners.values() {
                println!(
                    "{:<32} {:>6.2} {:>6.2} {:>7}  {}",
                    m.display_name(),
                    m.mining_power,
                    m.speed,
                    m.module_slots,
                    join(&m.resource_categories)
                );
            }
        }

        Commands::Resources => {
            println!("{:<24} {:<16} {:>8} {:>8}  {}", "Resource", "Category", "Hardness", "Time", "Yields");
            println!("{}", "-".repeat(80));
            for r in data.resources.values() {
                println!(
                    "{:<24} {:<16} {:>8.2} {:>8.2}  {}",
                    r.name, r.category, r.hardness, r.time, r.result
                );
            }
        }

        Commands::Modules => {
            println!("{:<32} {:>12}", "Module", "Speed bonus");
            println!("{}", "-".repeat(45));
            for m in data.modules.values() {
                println!("{:<32} {:>11.0}%", m.display_name(), m.speed_bonus * 100.0);
            }
        }

        Commands::Locate | Commands::Mods => {}
    }

    Ok(())
}

fn game_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.game {
        Some(root) => Ok(root.clone()),
        None => sources::locate_game_root(&sources::default_install_candidates())
            .ok_or_else(|| anyhow!("Could not find a game installation, pass --game")),
    }
}

/// Explicit `--mod` directories first, then whatever `--mods-dir` holds.
fn mod_dirs(cli: &Cli) -> Vec<PathBuf> {
    let mut mods = cli.mods.clone();
    mods.extend(sources::discover_mods(&cli.mods_dir));
    mods
}

fn print_recipe(data: &GameData, name: &str) -> Result<()> {
    let recipe = data
        .recipes
        .get(name)
        .ok_or_else(|| anyhow!("Recipe '{}' not found", name))?;

    println!("Recipe: {}", data.recipe_display_name(name));
    println!("  ID: {}", recipe.name);
    println!("  Category: {}", recipe.category);
    println!("  Time: {}s", recipe.time);

    println!("  Ingredients:");
    for (item, amount) in &recipe.ingredients {
        println!("    {} x {}", amount, item_name(data, item));
    }
    println!("  Results:");
    for (item, amount) in &recipe.results {
        println!("    {} x {}", amount, item_name(data, item));
    }

    let machines: Vec<_> = data
        .machines
        .values()
        .filter(|m| m.categories.contains(&recipe.category))
        .map(|m| m.display_name())
        .collect();
    if !machines.is_empty() {
        println!("  Made in: {}", machines.join(", "));
    }
    Ok(())
}

fn item_name<'a>(data: &'a GameData, name: &'a str) -> &'a str {
    data.items.get(name).map(|i| i.display_name()).unwrap_or(name)
}

fn join(set: &std::collections::BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}
