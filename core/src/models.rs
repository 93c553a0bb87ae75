use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// kJ per kcal.
pub const KJ_PER_KCAL: f64 = 4.1868;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

/// A food as shown in the list.
///
/// `id` is only set once the record lives in the local store. Records coming
/// straight from a search provider are provisional and carry no id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion: Option<String>,
    pub nutrition: Nutrition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default)]
    pub source: String,
}

impl FoodRecord {
    #[must_use]
    pub fn is_provisional(&self) -> bool {
        self.id.is_none()
    }

    /// The barcode, ignoring empty strings.
    #[must_use]
    pub fn natural_key(&self) -> Option<&str> {
        self.barcode.as_deref().filter(|b| !b.trim().is_empty())
    }

    /// Energy value as displayed for `unit`. The stored calories are never touched.
    #[must_use]
    pub fn display_energy(&self, unit: EnergyUnit) -> i64 {
        unit.convert_kcal(self.nutrition.calories)
    }
}

// Snapshot identity for the selection set. Floats are compared bitwise so the
// key is a proper `Eq`/`Hash` even though `FoodRecord` only has `PartialEq`.
#[derive(Debug, Clone)]
pub struct RecordKey(FoodRecord);

impl RecordKey {
    #[must_use]
    pub fn new(record: &FoodRecord) -> Self {
        Self(record.clone())
    }

    #[must_use]
    pub fn record(&self) -> &FoodRecord {
        &self.0
    }

    #[must_use]
    pub fn into_record(self) -> FoodRecord {
        self.0
    }

    fn float_bits(v: Option<f64>) -> Option<u64> {
        v.map(f64::to_bits)
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.0, &other.0);
        a.id == b.id
            && a.barcode == b.barcode
            && a.name == b.name
            && a.brand == b.brand
            && a.portion == b.portion
            && a.date_time == b.date_time
            && a.source == b.source
            && a.nutrition.calories.to_bits() == b.nutrition.calories.to_bits()
            && Self::float_bits(a.nutrition.protein) == Self::float_bits(b.nutrition.protein)
            && Self::float_bits(a.nutrition.carbs) == Self::float_bits(b.nutrition.carbs)
            && Self::float_bits(a.nutrition.fat) == Self::float_bits(b.nutrition.fat)
    }
}

impl Eq for RecordKey {}

impl Hash for RecordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let r = &self.0;
        r.id.hash(state);
        r.barcode.hash(state);
        r.name.hash(state);
        r.brand.hash(state);
        r.portion.hash(state);
        r.date_time.hash(state);
        r.source.hash(state);
        r.nutrition.calories.to_bits().hash(state);
        Self::float_bits(r.nutrition.protein).hash(state);
        Self::float_bits(r.nutrition.carbs).hash(state);
        Self::float_bits(r.nutrition.fat).hash(state);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[default]
    #[serde(rename = "kcal")]
    Kcal,
    #[serde(rename = "kJ")]
    Kj,
}

impl EnergyUnit {
    /// Convert a kcal value for display. Calories are truncated to whole kcal
    /// before conversion.
    #[must_use]
    pub fn convert_kcal(self, kcal: f64) -> i64 {
        let kcal = kcal.trunc();
        match self {
            EnergyUnit::Kcal => kcal as i64,
            EnergyUnit::Kj => (kcal * KJ_PER_KCAL).round() as i64,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EnergyUnit::Kcal => "kcal",
            EnergyUnit::Kj => "kJ",
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EnergyUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kcal" | "cal" => Ok(EnergyUnit::Kcal),
            "kj" => Ok(EnergyUnit::Kj),
            other => bail!("Unknown energy unit '{other}'. Valid: kcal, kJ"),
        }
    }
}

/// Ordering applied when the list is loaded from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// By name, case-insensitive.
    #[default]
    Alpha,
    /// Most recently modified first.
    Date,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Alpha => "alpha",
            SortKey::Date => "date",
        }
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "alpha" | "name" => Ok(SortKey::Alpha),
            "date" | "recent" => Ok(SortKey::Date),
            other => bail!("Unknown sort order '{other}'. Valid: alpha, date"),
        }
    }
}

/// Shorten `s` to at most `max` characters, marking the cut with "...".
#[must_use]
pub fn tidy_text(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let keep = max.saturating_sub(3);
        let end = s.char_indices().nth(keep).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn apple() -> FoodRecord {
        FoodRecord {
            barcode: Some("A1".to_string()),
            name: "Apple".to_string(),
            portion: Some("100g".to_string()),
            nutrition: Nutrition {
                calories: 52.0,
                protein: Some(0.3),
                carbs: Some(14.0),
                fat: Some(0.2),
            },
            source: "openfoodfacts".to_string(),
            ..FoodRecord::default()
        }
    }

    #[test]
    fn test_energy_display_kj() {
        let mut food = apple();
        food.nutrition.calories = 100.0;
        assert_eq!(food.display_energy(EnergyUnit::Kj), 419);
        assert_eq!(food.display_energy(EnergyUnit::Kcal), 100);
        // Display never writes back
        assert_eq!(food.nutrition.calories, 100.0);
    }

    #[test]
    fn test_energy_display_truncates_before_converting() {
        assert_eq!(EnergyUnit::Kcal.convert_kcal(99.9), 99);
        // 99 * 4.1868 = 414.49
        assert_eq!(EnergyUnit::Kj.convert_kcal(99.9), 414);
    }

    #[test]
    fn test_energy_unit_parse() {
        assert_eq!("kJ".parse::<EnergyUnit>().unwrap(), EnergyUnit::Kj);
        assert_eq!("KCAL".parse::<EnergyUnit>().unwrap(), EnergyUnit::Kcal);
        assert!("joules".parse::<EnergyUnit>().is_err());
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("alpha".parse::<SortKey>().unwrap(), SortKey::Alpha);
        assert_eq!("date".parse::<SortKey>().unwrap(), SortKey::Date);
        assert!("random".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_natural_key_ignores_empty_barcode() {
        let mut food = apple();
        assert_eq!(food.natural_key(), Some("A1"));
        food.barcode = Some("  ".to_string());
        assert!(food.natural_key().is_none());
        food.barcode = None;
        assert!(food.natural_key().is_none());
    }

    #[test]
    fn test_record_key_structural_equality() {
        let a = RecordKey::new(&apple());
        let b = RecordKey::new(&apple());
        assert_eq!(a, b);

        let mut changed = apple();
        changed.nutrition.fat = Some(0.3);
        assert_ne!(a, RecordKey::new(&changed));

        let set: HashSet<RecordKey> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_record_json_field_order_does_not_matter() {
        let one: FoodRecord = serde_json::from_str(
            r#"{"name":"Apple","barcode":"A1","nutrition":{"calories":52.0},"source":"x"}"#,
        )
        .unwrap();
        let two: FoodRecord = serde_json::from_str(
            r#"{"source":"x","nutrition":{"calories":52.0},"barcode":"A1","name":"Apple"}"#,
        )
        .unwrap();
        assert_eq!(RecordKey::new(&one), RecordKey::new(&two));
    }

    #[test]
    fn test_tidy_text() {
        assert_eq!(tidy_text("Apple", 25), "Apple");
        assert_eq!(tidy_text("hello world this is long", 10), "hello w...");
        assert_eq!(tidy_text("Crème fraîche", 10), "Crème f...");
    }
}
