mod commands;
mod config;
mod openfoodfacts;
mod usda;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{cmd_add, cmd_config_get, cmd_config_set, cmd_delete, cmd_list, cmd_search};
use crate::config::Config;
use crate::openfoodfacts::OpenFoodFactsClient;
use crate::usda::UsdaClient;
use foodlist_core::preferences::Preferences;
use foodlist_core::providers::ProviderAggregator;
use foodlist_core::session::FoodList;
use foodlist_core::store::SqliteFoodStore;

#[derive(Parser)]
#[command(
    name = "foodlist",
    version,
    about = "Pick foods from your local list or OpenFoodFacts and USDA searches"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stored foods
    List {
        /// Only show foods whose name or brand matches
        #[arg(short, long)]
        filter: Option<String>,
        /// Page to show (20 foods per page)
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search `OpenFoodFacts` and USDA for a food
    Search {
        /// Search query
        query: String,
        /// Page to show (20 foods per page)
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search, pick results and save them to the food list
    Add {
        /// Search query
        query: String,
        /// Results to add, by number (e.g. "1,3"). Prompts when omitted.
        #[arg(short, long)]
        pick: Option<String>,
        /// Pick from stored foods instead of searching online
        #[arg(long)]
        local: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a stored food by ID
    Delete {
        /// Food ID to delete
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print a setting
    Get {
        /// nutrition.energy-unit, foodlist.sort or integration.usda-key
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a setting
    Set {
        /// nutrition.energy-unit, foodlist.sort or integration.usda-key
        key: String,
        /// New value (e.g. kJ, kcal, alpha, date)
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Shared HTTP client settings for the search providers.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!(
            "foodlist/{} (food list)",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .context("Failed to build HTTP client")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn open_list(store: &SqliteFoodStore) -> Result<FoodList> {
    let prefs = Preferences::load(&*store.db()?)?;
    let providers = ProviderAggregator::default()
        .with(Arc::new(OpenFoodFactsClient::new()?))
        .with(Arc::new(UsdaClient::new(prefs.usda_api_key.clone())?));
    Ok(FoodList::new(Arc::new(store.clone()), providers, prefs))
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    debug!(data_dir = %config.data_dir.display(), "opening food store");
    let store = SqliteFoodStore::open(&config.db_path)?;

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Get { key, json } => cmd_config_get(&store, &key, json),
            ConfigCommands::Set { key, value, json } => {
                cmd_config_set(&store, &key, &value, json)
            }
        },
        Commands::List { filter, page, json } => {
            let mut list = open_list(&store)?;
            cmd_list(&mut list, filter.as_deref(), page, json).await
        }
        Commands::Search { query, page, json } => {
            let mut list = open_list(&store)?;
            cmd_search(&mut list, &query, page, json).await
        }
        Commands::Add {
            query,
            pick,
            local,
            json,
        } => {
            let mut list = open_list(&store)?;
            cmd_add(&mut list, &query, pick.as_deref(), local, json).await
        }
        Commands::Delete { id, json } => {
            let mut list = open_list(&store)?;
            cmd_delete(&mut list, id, json).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_picks() {
        let cli = Cli::try_parse_from(["foodlist", "add", "oat milk", "--pick", "1,3"]).unwrap();
        match cli.command {
            Commands::Add {
                query, pick, local, ..
            } => {
                assert_eq!(query, "oat milk");
                assert_eq!(pick.as_deref(), Some("1,3"));
                assert!(!local);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_list_defaults_to_first_page() {
        let cli = Cli::try_parse_from(["foodlist", "list"]).unwrap();
        match cli.command {
            Commands::List { filter, page, json } => {
                assert!(filter.is_none());
                assert_eq!(page, 1);
                assert!(!json);
            }
            _ => panic!("expected list"),
        }
    }
}
