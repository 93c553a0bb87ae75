use anyhow::{Result, bail};
use async_trait::async_trait;
use std::process;

use foodlist_core::models::FoodRecord;
use foodlist_core::pagination::MAX_ITEMS;
use foodlist_core::reconcile::ResolvedItemsConsumer;
use foodlist_core::session::{FoodList, SearchOutcome};

use super::helpers::{json_error, parse_picks, print_food_table, prompt_picks};
use super::print_page;

/// Receives committed records and prints them.
struct PrintConsumer {
    json: bool,
}

#[async_trait]
impl ResolvedItemsConsumer for PrintConsumer {
    async fn accept_resolved_items(&self, items: Vec<FoodRecord>) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else {
            for item in &items {
                let name = &item.name;
                let id = item.id.unwrap_or_default();
                println!("Added {name} (id: {id})");
            }
        }
        Ok(())
    }
}

fn no_results(query: &str, json: bool) -> ! {
    if json {
        println!("[]");
    } else {
        eprintln!("No results found for '{query}'");
    }
    process::exit(2);
}

pub(crate) async fn cmd_search(
    list: &mut FoodList,
    query: &str,
    page: usize,
    json: bool,
) -> Result<()> {
    list.open(None).await?;
    match list.search(query).await? {
        SearchOutcome::Replaced(_) | SearchOutcome::Reloaded(_) => print_page(list, page, json),
        SearchOutcome::NoResults | SearchOutcome::Stale => no_results(query, json),
    }
}

/// Search (or filter the stored foods with `local`), select `pick` and
/// commit the selection.
pub(crate) async fn cmd_add(
    list: &mut FoodList,
    query: &str,
    pick: Option<&str>,
    local: bool,
    json: bool,
) -> Result<()> {
    list.open(None).await?;
    if local {
        if list.apply_filter(query).await? == 0 {
            no_results(query, json);
        }
    } else {
        match list.search(query).await? {
            SearchOutcome::Replaced(_) => {}
            SearchOutcome::Reloaded(_) => bail!("Search query is empty"),
            SearchOutcome::NoResults | SearchOutcome::Stale => no_results(query, json),
        }
    }

    let candidates: Vec<FoodRecord> = list
        .visible()
        .iter()
        .take(MAX_ITEMS)
        .cloned()
        .collect();

    let picks = match pick {
        Some(p) => parse_picks(p, candidates.len())?,
        None if json => {
            println!("{}", json_error("--pick is required with --json"));
            process::exit(2);
        }
        None => {
            print_food_table(0, &candidates, &list.entries(&candidates));
            prompt_picks(candidates.len())?
        }
    };

    for idx in picks {
        list.toggle_selection(&candidates[idx], true);
    }
    if !json {
        eprintln!("{}", list.selection_state().title());
    }

    list.commit(&PrintConsumer { json }).await?;
    Ok(())
}
