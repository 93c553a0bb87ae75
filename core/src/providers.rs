use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::models::FoodRecord;

/// An external nutrition database that can be searched by free text.
///
/// The CLI implements this with reqwest for `OpenFoodFacts` and USDA.
/// Results are provisional: they never carry an `id`.
#[async_trait]
pub trait FoodSearchProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn search(&self, query: &str) -> Result<Vec<FoodRecord>>;
}

/// Fans a query out to every provider and concatenates the answers in
/// registration order.
#[derive(Clone, Default)]
pub struct ProviderAggregator {
    providers: Vec<Arc<dyn FoodSearchProvider>>,
}

impl ProviderAggregator {
    #[must_use]
    pub fn with(mut self, provider: Arc<dyn FoodSearchProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Query all providers concurrently. A provider that fails contributes
    /// nothing; the aggregate itself never fails.
    pub async fn search_all(&self, query: &str) -> Vec<FoodRecord> {
        let calls = self.providers.iter().map(|p| p.search(query));
        let results = join_all(calls).await;

        let mut combined = Vec::new();
        for (provider, result) in self.providers.iter().zip(results) {
            match result {
                Ok(mut foods) => {
                    debug!(provider = provider.name(), count = foods.len(), "provider results");
                    // Providers should not hand out ids; strip any that slip through.
                    for food in &mut foods {
                        food.id = None;
                    }
                    combined.append(&mut foods);
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %format!("{e:#}"), "provider search failed");
                }
            }
        }
        combined
    }
}
