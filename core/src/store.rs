use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::db::Database;
use crate::models::{FoodRecord, SortKey};

/// Persistent collection of food records.
///
/// A barcode miss is `Ok(None)`, never an error. Every `Err` is a store failure
/// and is propagated to whoever triggered the operation.
#[async_trait]
pub trait FoodStore: Send + Sync {
    async fn get_all(&self, sort: SortKey) -> Result<Vec<FoodRecord>>;
    /// Insert when `record.id` is `None`, otherwise update in place. Returns the id.
    async fn put(&self, record: &FoodRecord) -> Result<i64>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn get_by_barcode(&self, barcode: &str) -> Result<Option<FoodRecord>>;
}

/// [`FoodStore`] over the local `SQLite` database.
#[derive(Clone)]
pub struct SqliteFoodStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteFoodStore {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Direct access for callers that need more than the store contract
    /// (settings, counts).
    pub fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| anyhow!("Database lock poisoned"))
    }
}

#[async_trait]
impl FoodStore for SqliteFoodStore {
    async fn get_all(&self, sort: SortKey) -> Result<Vec<FoodRecord>> {
        self.db()?.list_foods(sort)
    }

    async fn put(&self, record: &FoodRecord) -> Result<i64> {
        self.db()?.put_food(record)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.db()?.delete_food(id)
    }

    async fn get_by_barcode(&self, barcode: &str) -> Result<Option<FoodRecord>> {
        self.db()?.get_food_by_barcode(barcode)
    }
}
