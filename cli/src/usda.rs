use anyhow::{Context, Result};
use async_trait::async_trait;

use foodlist_core::models::FoodRecord;
use foodlist_core::providers::FoodSearchProvider;
use foodlist_core::usda::{SOURCE, SearchResponse, search_food_to_food};

const SEARCH_URL: &str = "https://api.nal.usda.gov/fdc/v1/foods/search";
const DEMO_KEY: &str = "DEMO_KEY";

pub struct UsdaClient {
    client: reqwest::Client,
    api_key: String,
}

impl UsdaClient {
    /// Without a key the rate-limited public demo key is used.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = crate::http_client()?;
        Ok(Self {
            client,
            api_key: api_key.unwrap_or_else(|| DEMO_KEY.to_string()),
        })
    }

    pub async fn search_async(&self, query: &str) -> Result<Vec<FoodRecord>> {
        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("pageSize", "20"),
            ])
            .send()
            .await
            .context("Failed to reach USDA FoodData Central API")?
            .error_for_status()
            .context("USDA FoodData Central API returned an error")?;

        let data: SearchResponse = resp
            .json()
            .await
            .context("Failed to parse USDA search response")?;

        Ok(data
            .foods
            .into_iter()
            .filter_map(search_food_to_food)
            .collect())
    }
}

#[async_trait]
impl FoodSearchProvider for UsdaClient {
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

    #[test]
    fn test_defaults_to_demo_key() {
        let client = UsdaClient::new(None).unwrap();
        assert_eq!(client.api_key, DEMO_KEY);
        let client = UsdaClient::new(Some("abc".to_string())).unwrap();
        assert_eq!(client.api_key, "abc");
    }

    #[tokio::test]
    #[ignore = "hits USDA FoodData Central API"]
    async fn test_search_returns_results() {
        let client = UsdaClient::new(None).unwrap();
        let results = client.search_async("banana").await.unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|f| f.barcode.is_none()));
    }
}
