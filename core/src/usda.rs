//! USDA `FoodData` Central search results.
//!
//! USDA foods are matched without a barcode: the list treats them as
//! barcode-less records that are inserted as-is when committed.

use serde::Deserialize;

use crate::models::{FoodRecord, Nutrition};

pub const SOURCE: &str = "usda";

// FDC nutrient numbers
const ENERGY_KCAL: i64 = 1008;
const PROTEIN: i64 = 1003;
const CARBS: i64 = 1005;
const FAT: i64 = 1004;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFood {
    pub description: Option<String>,
    pub brand_owner: Option<String>,
    pub brand_name: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrient {
    pub nutrient_id: Option<i64>,
    pub unit_name: Option<String>,
    pub value: Option<f64>,
}

impl SearchFood {
    fn nutrient(&self, id: i64) -> Option<f64> {
        self.food_nutrients
            .iter()
            .find(|n| n.nutrient_id == Some(id))
            .and_then(|n| n.value)
    }

    fn energy_kcal(&self) -> Option<f64> {
        self.food_nutrients
            .iter()
            .find(|n| {
                n.nutrient_id == Some(ENERGY_KCAL)
                    && n
                        .unit_name
                        .as_deref()
                        .is_none_or(|u| u.eq_ignore_ascii_case("kcal"))
            })
            .and_then(|n| n.value)
    }
}

/// Map a USDA search hit to a provisional record (values per 100g).
#[must_use]
pub fn search_food_to_food(f: SearchFood) -> Option<FoodRecord> {
    let calories = f.energy_kcal()?;
    let protein = f.nutrient(PROTEIN);
    let carbs = f.nutrient(CARBS);
    let fat = f.nutrient(FAT);
    let name = f.description.filter(|d| !d.trim().is_empty())?;
    let brand = f
        .brand_name
        .or(f.brand_owner)
        .filter(|b| !b.trim().is_empty());

    Some(FoodRecord {
        id: None,
        barcode: None,
        name: name.trim().to_string(),
        brand,
        portion: Some("100g".to_string()),
        nutrition: Nutrition {
            calories,
            protein,
            carbs,
            fat,
        },
        date_time: None,
        source: SOURCE.to_string(),
    })
}
