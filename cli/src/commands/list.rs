use anyhow::Result;
use std::process;

use foodlist_core::session::FoodList;

use super::helpers::json_error;
use super::print_page;

pub(crate) async fn cmd_list(
    list: &mut FoodList,
    filter: Option<&str>,
    page: usize,
    json: bool,
) -> Result<()> {
    list.open(None).await?;
    if let Some(query) = filter {
        list.apply_filter(query).await?;
    }
    print_page(list, page, json)
}

pub(crate) async fn cmd_delete(list: &mut FoodList, id: i64, json: bool) -> Result<()> {
    list.open(None).await?;
    if list.delete_item(id).await? {
        if json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted food {id}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Food {id} not found")));
        } else {
            eprintln!("Food {id} not found");
        }
        process::exit(2);
    }
}
