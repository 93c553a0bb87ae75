use serde::Serialize;

use crate::models::{EnergyUnit, FoodRecord, tidy_text};

const TITLE_WIDTH: usize = 25;
const BRAND_WIDTH: usize = 35;

/// What a renderer needs to draw one row of the food list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub id: Option<i64>,
    pub title: String,
    pub energy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub portion: String,
    pub checked: bool,
    /// Only stored records can be deleted.
    pub deletable: bool,
}

impl ListEntry {
    #[must_use]
    pub fn new(record: &FoodRecord, unit: EnergyUnit, checked: bool) -> Self {
        let energy = record.display_energy(unit);
        Self {
            id: record.id,
            title: tidy_text(&record.name, TITLE_WIDTH),
            energy: format!("{energy} {unit}"),
            brand: record
                .brand
                .as_deref()
                .filter(|b| !b.is_empty())
                .map(|b| tidy_text(b, BRAND_WIDTH)),
            portion: record.portion.clone().unwrap_or_default(),
            checked,
            deletable: record.id.is_some(),
        }
    }
}
