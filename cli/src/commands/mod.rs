mod helpers;
mod list;
mod search;
mod settings;

use anyhow::Result;
use std::process;

use foodlist_core::pagination::{DEFAULT_PAGE_SIZE, MAX_ITEMS};
use foodlist_core::session::FoodList;

use helpers::{PagedOutput, json_error, print_food_table, rows_before};

pub(crate) use list::{cmd_delete, cmd_list};
pub(crate) use search::{cmd_add, cmd_search};
pub(crate) use settings::{cmd_config_get, cmd_config_set};

/// Print one page of the visible list. Exits with status 2 when the page is empty.
pub(super) fn print_page(list: &FoodList, page: usize, json: bool) -> Result<()> {
    let before = rows_before(page, DEFAULT_PAGE_SIZE)?;
    let window = list.next_window(before);
    let total = list.visible().len().min(MAX_ITEMS);

    if window.is_empty() {
        if json {
            println!("{}", json_error(&format!("Page {page} is empty")));
        } else if total == 0 {
            eprintln!("No foods found");
        } else {
            eprintln!("Page {page} is empty ({total} foods)");
        }
        process::exit(2);
    }

    if json {
        let out = PagedOutput {
            page,
            total,
            foods: window,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_food_table(before, window, &list.entries(window));
    let first = before + 1;
    let last = before + window.len();
    println!("{first}-{last} of {total}");
    if last < total {
        let next = page + 1;
        println!("More with --page {next}");
    }
    Ok(())
}
