use anyhow::Result;
use std::process;

use foodlist_core::preferences::Preferences;
use foodlist_core::store::SqliteFoodStore;

use super::helpers::json_error;

pub(crate) fn cmd_config_get(store: &SqliteFoodStore, key: &str, json: bool) -> Result<()> {
    let value = Preferences::get(&*store.db()?, key)?;
    match value {
        Some(value) => {
            if json {
                println!("{}", serde_json::json!({ "key": key, "value": value }));
            } else {
                println!("{value}");
            }
            Ok(())
        }
        None => {
            if json {
                println!("{}", json_error(&format!("{key} is not set")));
            } else {
                eprintln!("{key} is not set");
            }
            process::exit(2);
        }
    }
}

pub(crate) fn cmd_config_set(
    store: &SqliteFoodStore,
    key: &str,
    value: &str,
    json: bool,
) -> Result<()> {
    let db = store.db()?;
    Preferences::set(&db, key, value)?;
    let stored = Preferences::get(&db, key)?.unwrap_or_default();
    if json {
        println!("{}", serde_json::json!({ "key": key, "value": stored }));
    } else {
        println!("{key} = {stored}");
    }
    Ok(())
}
