use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use futures_util::future::try_join_all;
use tracing::{debug, info};

use crate::models::FoodRecord;
use crate::store::FoodStore;

/// Receives the canonical records of a commit, e.g. the meal or recipe
/// being assembled.
#[async_trait]
pub trait ResolvedItemsConsumer: Send + Sync {
    async fn accept_resolved_items(&self, items: Vec<FoodRecord>) -> Result<()>;
}

/// What has to happen to turn one distinct selection into a stored record.
enum Job<'a> {
    Known(&'a FoodRecord),
    Barcode(&'a str, &'a FoodRecord),
    Insert(&'a FoodRecord),
}

/// Turns selected records into stored ones without duplicating barcoded foods.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn FoodStore>,
}

impl Reconciler {
    #[must_use]
    pub fn new(store: Arc<dyn FoodStore>) -> Self {
        Self { store }
    }

    /// Resolve every selected record to its canonical stored form, in input order.
    ///
    /// - records with an id pass through untouched
    /// - barcoded records resolve to the stored record with that barcode,
    ///   inserting only when none exists
    /// - records without barcode are always inserted
    ///
    /// Selections sharing a barcode are merged before the store is consulted,
    /// so they end up as one row. Distinct selections resolve concurrently.
    /// The first store failure aborts the call; rows already inserted stay.
    pub async fn resolve(&self, selection: &[FoodRecord]) -> Result<Vec<FoodRecord>> {
        let mut jobs: Vec<Job<'_>> = Vec::new();
        let mut slots: Vec<usize> = Vec::with_capacity(selection.len());
        let mut by_barcode: HashMap<&str, usize> = HashMap::new();

        for item in selection {
            let slot = if item.id.is_some() {
                jobs.push(Job::Known(item));
                jobs.len() - 1
            } else if let Some(code) = item.natural_key() {
                *by_barcode.entry(code).or_insert_with(|| {
                    jobs.push(Job::Barcode(code, item));
                    jobs.len() - 1
                })
            } else {
                jobs.push(Job::Insert(item));
                jobs.len() - 1
            };
            slots.push(slot);
        }

        debug!(
            selected = selection.len(),
            distinct = jobs.len(),
            "resolving selection"
        );

        let resolved = try_join_all(jobs.iter().map(|job| self.run(job))).await?;
        Ok(slots.into_iter().map(|i| resolved[i].clone()).collect())
    }

    async fn run(&self, job: &Job<'_>) -> Result<FoodRecord> {
        match job {
            Job::Known(record) => Ok((*record).clone()),
            Job::Barcode(code, record) => {
                let existing = self
                    .store
                    .get_by_barcode(code)
                    .await
                    .with_context(|| format!("Failed to look up barcode {code}"))?;
                match existing {
                    Some(stored) => {
                        debug!(barcode = %code, id = ?stored.id, "barcode already stored");
                        Ok(stored)
                    }
                    None => self.add_item(record).await,
                }
            }
            Job::Insert(record) => self.add_item(record).await,
        }
    }

    /// Insert a provisional record and return it with its new id.
    pub async fn add_item(&self, record: &FoodRecord) -> Result<FoodRecord> {
        let mut stored = record.clone();
        stored.id = None;
        let id = self
            .store
            .put(&stored)
            .await
            .with_context(|| format!("Failed to save '{}'", record.name))?;
        debug!(id, name = %record.name, "inserted food");
        stored.id = Some(id);
        Ok(stored)
    }

    /// Stamp every record with the current time and write it back in place.
    /// Records appearing more than once are written once.
    pub async fn touch(&self, records: &mut [FoodRecord]) -> Result<()> {
        let now = Local::now().to_rfc3339();
        for record in records.iter_mut() {
            record.date_time = Some(now.clone());
        }

        let mut seen = HashSet::new();
        let writes = records
            .iter()
            .filter(|r| r.id.is_some_and(|id| seen.insert(id)))
            .map(|r| async move {
                self.store
                    .put(r)
                    .await
                    .with_context(|| format!("Failed to update '{}'", r.name))
            });
        try_join_all(writes).await?;
        Ok(())
    }

    /// Resolve, touch and hand the final records to `consumer`.
    pub async fn commit(
        &self,
        selection: &[FoodRecord],
        consumer: &dyn ResolvedItemsConsumer,
    ) -> Result<Vec<FoodRecord>> {
        let mut items = self.resolve(selection).await?;
        self.touch(&mut items).await?;
        info!(count = items.len(), "committing selected foods");
        consumer.accept_resolved_items(items.clone()).await?;
        Ok(items)
    }
}
