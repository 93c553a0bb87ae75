use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{FoodRecord, Nutrition, SortKey};

const FOOD_COLUMNS: &str = "id, barcode, name, brand, portion, calories, protein, carbs, fat, date_time, source";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS foods (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    barcode TEXT UNIQUE,
                    name TEXT NOT NULL,
                    brand TEXT,
                    portion TEXT,
                    calories REAL NOT NULL,
                    protein REAL,
                    carbs REAL,
                    fat REAL,
                    date_time TEXT,
                    source TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_foods_barcode ON foods(barcode);
                CREATE INDEX IF NOT EXISTS idx_foods_name ON foods(name);

                CREATE TABLE IF NOT EXISTS user_settings (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    fn food_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodRecord> {
        Ok(FoodRecord {
            id: Some(row.get(0)?),
            barcode: row.get(1)?,
            name: row.get(2)?,
            brand: row.get(3)?,
            portion: row.get(4)?,
            nutrition: Nutrition {
                calories: row.get(5)?,
                protein: row.get(6)?,
                carbs: row.get(7)?,
                fat: row.get(8)?,
            },
            date_time: row.get(9)?,
            source: row.get(10)?,
        })
    }

    // --- Foods ---

    /// Insert `food` as a new row, ignoring any id it carries.
    pub fn insert_food(&self, food: &FoodRecord) -> Result<i64> {
        let date_time = food
            .date_time
            .clone()
            .unwrap_or_else(|| Local::now().to_rfc3339());
        self.conn
            .execute(
                "INSERT INTO foods (barcode, name, brand, portion, calories, protein, carbs, fat, date_time, source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    food.natural_key(),
                    food.name,
                    food.brand,
                    food.portion,
                    food.nutrition.calories,
                    food.nutrition.protein,
                    food.nutrition.carbs,
                    food.nutrition.fat,
                    date_time,
                    food.source,
                ],
            )
            .with_context(|| format!("Failed to insert food '{}'", food.name))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite the row identified by `id` with the fields of `food`.
    pub fn update_food(&self, id: i64, food: &FoodRecord) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "UPDATE foods SET barcode = ?1, name = ?2, brand = ?3, portion = ?4, calories = ?5,
                 protein = ?6, carbs = ?7, fat = ?8, date_time = ?9, source = ?10
                 WHERE id = ?11",
                params![
                    food.natural_key(),
                    food.name,
                    food.brand,
                    food.portion,
                    food.nutrition.calories,
                    food.nutrition.protein,
                    food.nutrition.carbs,
                    food.nutrition.fat,
                    food.date_time,
                    food.source,
                    id,
                ],
            )
            .with_context(|| format!("Failed to update food {id}"))?;
        Ok(rows > 0)
    }

    /// Insert when `food` has no id, otherwise update in place. Returns the row id.
    pub fn put_food(&self, food: &FoodRecord) -> Result<i64> {
        match food.id {
            Some(id) => {
                if !self.update_food(id, food)? {
                    // Keep the caller's id, the same way a keyed put would.
                    self.conn.execute(
                        &format!("INSERT INTO foods ({FOOD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
                        params![
                            id,
                            food.natural_key(),
                            food.name,
                            food.brand,
                            food.portion,
                            food.nutrition.calories,
                            food.nutrition.protein,
                            food.nutrition.carbs,
                            food.nutrition.fat,
                            food.date_time,
                            food.source,
                        ],
                    )?;
                }
                Ok(id)
            }
            None => self.insert_food(food),
        }
    }

    pub fn get_food_by_barcode(&self, barcode: &str) -> Result<Option<FoodRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {FOOD_COLUMNS} FROM foods WHERE barcode = ?1"))?;
        let mut rows = stmt.query(params![barcode])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::food_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_foods(&self, sort: SortKey) -> Result<Vec<FoodRecord>> {
        let order = match sort {
            SortKey::Alpha => "name COLLATE NOCASE, id",
            SortKey::Date => "date_time DESC, id DESC",
        };
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {FOOD_COLUMNS} FROM foods ORDER BY {order}"))?;
        let foods = stmt
            .query_map([], Self::food_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    pub fn delete_food(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM foods WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn count_foods(&self) -> Result<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM foods", [], |row| row.get(0))?;
        Ok(n)
    }

    // --- User Settings ---

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO user_settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM user_settings WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM user_settings WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_food() -> FoodRecord {
        FoodRecord {
            barcode: Some("1234567890".to_string()),
            name: "Chicken Breast".to_string(),
            brand: Some("Acme".to_string()),
            portion: Some("100g".to_string()),
            nutrition: Nutrition {
                calories: 165.0,
                protein: Some(31.0),
                carbs: Some(0.0),
                fat: Some(3.6),
            },
            source: "manual".to_string(),
            ..FoodRecord::default()
        }
    }

    fn by_id(db: &Database, id: i64) -> Option<FoodRecord> {
        db.list_foods(SortKey::Alpha)
            .unwrap()
            .into_iter()
            .find(|f| f.id == Some(id))
    }

    fn rice() -> FoodRecord {
        FoodRecord {
            name: "brown rice".to_string(),
            nutrition: Nutrition {
                calories: 112.0,
                ..Nutrition::default()
            },
            source: "manual".to_string(),
            ..FoodRecord::default()
        }
    }

    #[test]
    fn test_insert_and_get_food() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_food(&sample_food()).unwrap();

        let fetched = by_id(&db, id).unwrap();
        assert_eq!(fetched.id, Some(id));
        assert_eq!(fetched.name, "Chicken Breast");
        assert_eq!(fetched.brand.as_deref(), Some("Acme"));
        assert_eq!(fetched.barcode.as_deref(), Some("1234567890"));
        assert_eq!(fetched.nutrition.calories, 165.0);
        assert_eq!(fetched.nutrition.protein, Some(31.0));
        assert_eq!(fetched.source, "manual");
        assert!(fetched.date_time.is_some());
    }

    #[test]
    fn test_get_food_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(by_id(&db, 42).is_none());
    }

    #[test]
    fn test_get_food_by_barcode() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_food(&sample_food()).unwrap();

        let hit = db.get_food_by_barcode("1234567890").unwrap().unwrap();
        assert_eq!(hit.id, Some(id));
        assert!(db.get_food_by_barcode("0000").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_barcode_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&sample_food()).unwrap();
        assert!(db.insert_food(&sample_food()).is_err());
    }

    #[test]
    fn test_empty_barcode_stored_as_null() {
        let db = Database::open_in_memory().unwrap();
        let mut food = rice();
        food.barcode = Some(String::new());
        // Two empty barcodes must not collide on the unique index
        db.insert_food(&food).unwrap();
        db.insert_food(&food).unwrap();
        assert_eq!(db.count_foods().unwrap(), 2);
    }

    #[test]
    fn test_put_food_inserts_then_updates() {
        let db = Database::open_in_memory().unwrap();
        let id = db.put_food(&sample_food()).unwrap();

        let mut stored = by_id(&db, id).unwrap();
        stored.name = "Chicken Thigh".to_string();
        assert_eq!(db.put_food(&stored).unwrap(), id);

        assert_eq!(db.count_foods().unwrap(), 1);
        let fetched = by_id(&db, id).unwrap();
        assert_eq!(fetched.name, "Chicken Thigh");
    }

    #[test]
    fn test_put_food_with_unknown_id_keeps_id() {
        let db = Database::open_in_memory().unwrap();
        let mut food = rice();
        food.id = Some(7);
        assert_eq!(db.put_food(&food).unwrap(), 7);
        assert_eq!(by_id(&db, 7).unwrap().name, "brown rice");
    }

    #[test]
    fn test_list_foods_alpha() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&sample_food()).unwrap();
        db.insert_food(&rice()).unwrap();

        let all = db.list_foods(SortKey::Alpha).unwrap();
        assert_eq!(all.len(), 2);
        // Case-insensitive ordering
        assert_eq!(all[0].name, "brown rice");
        assert_eq!(all[1].name, "Chicken Breast");
    }

    #[test]
    fn test_list_foods_date() {
        let db = Database::open_in_memory().unwrap();
        let mut older = sample_food();
        older.date_time = Some("2024-01-01T00:00:00+00:00".to_string());
        let mut newer = rice();
        newer.date_time = Some("2024-06-01T00:00:00+00:00".to_string());
        db.insert_food(&older).unwrap();
        db.insert_food(&newer).unwrap();

        let all = db.list_foods(SortKey::Date).unwrap();
        assert_eq!(all[0].name, "brown rice");
        assert_eq!(all[1].name, "Chicken Breast");
    }

    #[test]
    fn test_delete_food() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_food(&sample_food()).unwrap();
        assert!(db.delete_food(id).unwrap());
        assert!(!db.delete_food(id).unwrap());
        assert!(by_id(&db, id).is_none());
    }

    #[test]
    fn test_settings_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_setting("nutrition.energy-unit").unwrap().is_none());

        db.set_setting("nutrition.energy-unit", "kJ").unwrap();
        assert_eq!(
            db.get_setting("nutrition.energy-unit").unwrap().as_deref(),
            Some("kJ")
        );

        db.set_setting("nutrition.energy-unit", "kcal").unwrap();
        assert_eq!(
            db.get_setting("nutrition.energy-unit").unwrap().as_deref(),
            Some("kcal")
        );

        assert!(db.delete_setting("nutrition.energy-unit").unwrap());
        assert!(!db.delete_setting("nutrition.energy-unit").unwrap());
    }

    #[test]
    fn test_open_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foods.db");
        {
            let db = Database::open(&path).unwrap();
            db.insert_food(&rice()).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.count_foods().unwrap(), 1);
    }
}
