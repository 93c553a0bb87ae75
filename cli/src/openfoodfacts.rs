use anyhow::{Context, Result};
use async_trait::async_trait;

use foodlist_core::models::FoodRecord;
use foodlist_core::openfoodfacts::{SOURCE, SearchResponse, product_to_food};
use foodlist_core::providers::FoodSearchProvider;

const SEARCH_URL: &str = "https://world.openfoodfacts.org/cgi/search.pl";

pub struct OpenFoodFactsClient {
    client: reqwest::Client,
}

impl OpenFoodFactsClient {
    pub fn new() -> Result<Self> {
        let client = crate::http_client()?;
        Ok(Self { client })
    }

    pub async fn search_async(&self, query: &str) -> Result<Vec<FoodRecord>> {
        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("json", "1"),
                ("page_size", "20"),
            ])
            .send()
            .await
            .context("Failed to reach OpenFoodFacts API")?
            .error_for_status()
            .context("OpenFoodFacts API returned an error")?;

        let data: SearchResponse = resp
            .json()
            .await
            .context("Failed to parse OpenFoodFacts search response")?;

        let foods: Vec<FoodRecord> = data
            .products
            .into_iter()
            .filter_map(product_to_food)
            .collect();

        Ok(foods)
    }
}

#[async_trait]
impl FoodSearchProvider for OpenFoodFactsClient {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn search(&self, query: &str) -> Result<Vec<FoodRecord>> {
        self.search_async(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Integration tests (hit real OpenFoodFacts API) ---

    #[tokio::test]
    #[ignore = "hits OpenFoodFacts API"]
    async fn test_search_returns_results() {
        let client = OpenFoodFactsClient::new().unwrap();
        let results = client.search_async("nutella").await.unwrap();
        assert!(!results.is_empty());
        // Every result should be provisional with a name and calories
        for food in &results {
            assert!(food.is_provisional());
            assert!(!food.name.is_empty());
            assert!(food.nutrition.calories >= 0.0);
        }
    }
}
