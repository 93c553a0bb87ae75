use anyhow::{Context, Result, bail};

use crate::db::Database;
use crate::models::{EnergyUnit, SortKey};

pub const ENERGY_UNIT_KEY: &str = "nutrition.energy-unit";
pub const SORT_KEY: &str = "foodlist.sort";
pub const USDA_KEY: &str = "integration.usda-key";

/// Settings keys accepted by [`Preferences::set`].
pub const KNOWN_KEYS: &[&str] = &[ENERGY_UNIT_KEY, SORT_KEY, USDA_KEY];

/// User preferences the food list reads at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub energy_unit: EnergyUnit,
    pub sort: SortKey,
    pub usda_api_key: Option<String>,
}

impl Preferences {
    /// Read preferences from the settings table. Missing keys fall back to defaults.
    pub fn load(db: &Database) -> Result<Self> {
        let energy_unit = match db.get_setting(ENERGY_UNIT_KEY)? {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid value for {ENERGY_UNIT_KEY}"))?,
            None => EnergyUnit::default(),
        };
        let sort = match db.get_setting(SORT_KEY)? {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid value for {SORT_KEY}"))?,
            None => SortKey::default(),
        };
        let usda_api_key = db.get_setting(USDA_KEY)?.filter(|k| !k.trim().is_empty());
        Ok(Self {
            energy_unit,
            sort,
            usda_api_key,
        })
    }

    /// Validate and store a single setting. Values are normalised before saving.
    pub fn set(db: &Database, key: &str, value: &str) -> Result<()> {
        let normalised = match key {
            ENERGY_UNIT_KEY => value.parse::<EnergyUnit>()?.label().to_string(),
            SORT_KEY => value.parse::<SortKey>()?.as_str().to_string(),
            USDA_KEY => value.trim().to_string(),
            _ => bail!("Unknown setting '{key}'. Valid: {}", KNOWN_KEYS.join(", ")),
        };
        db.set_setting(key, &normalised)
    }

    pub fn get(db: &Database, key: &str) -> Result<Option<String>> {
        if !KNOWN_KEYS.contains(&key) {
            bail!("Unknown setting '{key}'. Valid: {}", KNOWN_KEYS.join(", "));
        }
        db.get_setting(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let db = Database::open_in_memory().unwrap();
        let prefs = Preferences::load(&db).unwrap();
        assert_eq!(prefs.energy_unit, EnergyUnit::Kcal);
        assert_eq!(prefs.sort, SortKey::Alpha);
        assert!(prefs.usda_api_key.is_none());
    }

    #[test]
    fn test_set_and_load() {
        let db = Database::open_in_memory().unwrap();
        Preferences::set(&db, ENERGY_UNIT_KEY, "KJ").unwrap();
        Preferences::set(&db, SORT_KEY, "date").unwrap();
        Preferences::set(&db, USDA_KEY, " abc123 ").unwrap();

        // Stored in canonical form
        assert_eq!(
            Preferences::get(&db, ENERGY_UNIT_KEY).unwrap().as_deref(),
            Some("kJ")
        );

        let prefs = Preferences::load(&db).unwrap();
        assert_eq!(prefs.energy_unit, EnergyUnit::Kj);
        assert_eq!(prefs.sort, SortKey::Date);
        assert_eq!(prefs.usda_api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_rejects_bad_values() {
        let db = Database::open_in_memory().unwrap();
        assert!(Preferences::set(&db, ENERGY_UNIT_KEY, "joules").is_err());
        assert!(Preferences::set(&db, "theme", "dark").is_err());
        assert!(Preferences::get(&db, "theme").is_err());
    }

    #[test]
    fn test_load_surfaces_corrupt_setting() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(SORT_KEY, "sideways").unwrap();
        assert!(Preferences::load(&db).is_err());
    }
}
