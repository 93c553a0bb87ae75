use serde::Deserialize;

use crate::models::{FoodRecord, Nutrition};

pub const SOURCE: &str = "openfoodfacts";

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub products: Vec<ProductData>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub code: Option<String>,
    pub nutriments: Option<Nutriments>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
pub struct Nutriments {
    #[serde(rename = "energy-kcal_100g")]
    pub energy_kcal_100g: Option<f64>,
    pub proteins_100g: Option<f64>,
    pub carbohydrates_100g: Option<f64>,
    pub fat_100g: Option<f64>,
}

/// Map a product to a provisional record. Products without a name or an
/// energy value are skipped.
#[must_use]
pub fn product_to_food(p: ProductData) -> Option<FoodRecord> {
    let name = p.product_name.filter(|n| !n.trim().is_empty())?;
    let nutriments = p.nutriments?;
    let calories = nutriments.energy_kcal_100g?;

    Some(FoodRecord {
        id: None,
        barcode: p.code.filter(|c| !c.is_empty()),
        name: name.trim().to_string(),
        brand: p.brands.filter(|b| !b.is_empty()),
        portion: Some("100g".to_string()),
        nutrition: Nutrition {
            calories,
            protein: nutriments.proteins_100g,
            carbs: nutriments.carbohydrates_100g,
            fat: nutriments.fat_100g,
        },
        date_time: None,
        source: SOURCE.to_string(),
    })
}
