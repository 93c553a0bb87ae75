use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::entry::ListEntry;
use crate::filter::{SubstringFilter, TextFilter};
use crate::models::FoodRecord;
use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_ITEMS, next_window};
use crate::preferences::Preferences;
use crate::providers::ProviderAggregator;
use crate::reconcile::{Reconciler, ResolvedItemsConsumer};
use crate::selection::{SelectionSet, SelectionState};
use crate::store::FoodStore;

/// Result of a provider search as seen by the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The working list now holds this many search results.
    Replaced(usize),
    /// Nothing matched; the list was left as it was.
    NoResults,
    /// Empty query; the list was reloaded from the store.
    Reloaded(usize),
    /// A newer load or search started before this one finished; ignored.
    Stale,
}

/// A search that has been started but whose results are not applied yet.
///
/// Running it does not borrow the [`FoodList`], so the list can start a newer
/// search or reload in the meantime. [`FoodList::finish_search`] drops the
/// response if that happened.
pub struct PendingSearch {
    generation: u64,
    query: String,
    providers: ProviderAggregator,
}

pub struct SearchResponse {
    generation: u64,
    results: Vec<FoodRecord>,
}

impl PendingSearch {
    pub async fn run(self) -> SearchResponse {
        let results = self.providers.search_all(&self.query).await;
        SearchResponse {
            generation: self.generation,
            results,
        }
    }
}

/// The food list of one open view: working list, visible (filtered) list and
/// the user's selection.
pub struct FoodList {
    store: Arc<dyn FoodStore>,
    providers: ProviderAggregator,
    text_filter: Arc<dyn TextFilter>,
    reconciler: Reconciler,
    prefs: Preferences,
    working: Vec<FoodRecord>,
    visible: Vec<FoodRecord>,
    selection: SelectionSet,
    generation: u64,
}

impl FoodList {
    #[must_use]
    pub fn new(store: Arc<dyn FoodStore>, providers: ProviderAggregator, prefs: Preferences) -> Self {
        Self {
            reconciler: Reconciler::new(store.clone()),
            store,
            providers,
            text_filter: Arc::new(SubstringFilter),
            prefs,
            working: Vec::new(),
            visible: Vec::new(),
            selection: SelectionSet::new(),
            generation: 0,
        }
    }

    /// The full candidate set (last load or search).
    #[must_use]
    pub fn working(&self) -> &[FoodRecord] {
        &self.working
    }

    /// What the renderer shows: the working list narrowed by the active filter.
    #[must_use]
    pub fn visible(&self) -> &[FoodRecord] {
        &self.visible
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    #[must_use]
    pub fn selection_count(&self) -> usize {
        self.selection.len()
    }

    #[must_use]
    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    /// Open the list fresh: save an item coming back from the editor (if
    /// any), then clear the selection and load from the store. A failed save
    /// leaves the selection as it was.
    pub async fn open(&mut self, edited: Option<FoodRecord>) -> Result<()> {
        if let Some(item) = edited {
            self.save_edited(item).await?;
        }
        self.selection.clear();
        self.load().await?;
        Ok(())
    }

    /// Replace the working list with everything in the store, in the
    /// preferred order. The selection is left alone; a transient view still
    /// open ends here and its selections are kept.
    pub async fn load(&mut self) -> Result<usize> {
        self.generation += 1;
        self.selection.keep_view();
        let foods = self
            .store
            .get_all(self.prefs.sort)
            .await
            .context("Failed to load food list")?;
        debug!(count = foods.len(), sort = self.prefs.sort.as_str(), "loaded food list");
        self.replace(foods);
        Ok(self.working.len())
    }

    fn replace(&mut self, foods: Vec<FoodRecord>) {
        self.visible.clone_from(&foods);
        self.working = foods;
    }

    /// Start a provider search. Returns `None` for a blank query.
    pub fn begin_search(&mut self, query: &str) -> Option<PendingSearch> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.generation += 1;
        Some(PendingSearch {
            generation: self.generation,
            query: query.to_string(),
            providers: self.providers.clone(),
        })
    }

    /// Apply a finished search unless something newer replaced the list meanwhile.
    pub fn finish_search(&mut self, response: SearchResponse) -> SearchOutcome {
        if response.generation != self.generation {
            debug!(
                response = response.generation,
                current = self.generation,
                "dropping stale search results"
            );
            return SearchOutcome::Stale;
        }
        if response.results.is_empty() {
            info!("No results found");
            return SearchOutcome::NoResults;
        }
        let count = response.results.len();
        self.replace(response.results);
        self.selection.open_view();
        SearchOutcome::Replaced(count)
    }

    /// Search every provider for `query`. A blank query reloads from the store.
    pub async fn search(&mut self, query: &str) -> Result<SearchOutcome> {
        match self.begin_search(query) {
            Some(pending) => {
                let response = pending.run().await;
                Ok(self.finish_search(response))
            }
            None => Ok(SearchOutcome::Reloaded(self.load().await?)),
        }
    }

    /// Narrow `source` by `query` without touching it.
    #[must_use]
    pub fn filter(&self, query: &str, source: &[FoodRecord]) -> Vec<FoodRecord> {
        self.text_filter.filter(query, source)
    }

    /// Narrow the visible list to records matching `query`. A blank query
    /// closes the filter the same way [`FoodList::dismiss_view`] does.
    pub async fn apply_filter(&mut self, query: &str) -> Result<usize> {
        if query.trim().is_empty() {
            return self.dismiss_view().await;
        }
        self.visible = self.text_filter.filter(query, &self.working);
        self.selection.open_view();
        Ok(self.visible.len())
    }

    /// Close the search/filter view without committing. Selections made
    /// while it was open are dropped and the list reloads from the store.
    pub async fn dismiss_view(&mut self) -> Result<usize> {
        let dropped = self.selection.discard_view();
        if dropped > 0 {
            debug!(dropped, "dropped selections from dismissed view");
        }
        self.load().await
    }

    pub fn toggle_selection(&mut self, item: &FoodRecord, selected: bool) -> SelectionState {
        self.selection.toggle(item, selected);
        self.selection.state()
    }

    /// The next page of visible records for a renderer that already shows
    /// `already_rendered` of them.
    #[must_use]
    pub fn next_window(&self, already_rendered: usize) -> &[FoodRecord] {
        next_window(&self.visible, already_rendered, DEFAULT_PAGE_SIZE, MAX_ITEMS)
    }

    /// Row data for `records`, with check marks from the current selection.
    #[must_use]
    pub fn entries(&self, records: &[FoodRecord]) -> Vec<ListEntry> {
        records
            .iter()
            .map(|r| ListEntry::new(r, self.prefs.energy_unit, self.selection.contains(r)))
            .collect()
    }

    /// Delete a stored record and reload.
    pub async fn delete_item(&mut self, id: i64) -> Result<bool> {
        let deleted = self
            .store
            .delete(id)
            .await
            .with_context(|| format!("Failed to delete food {id}"))?;
        if deleted {
            self.selection.remove_id(id);
        }
        self.load().await?;
        Ok(deleted)
    }

    /// An unsaved item whose barcode is already stored takes over that row.
    async fn save_edited(&self, mut item: FoodRecord) -> Result<FoodRecord> {
        if item.id.is_none() {
            let stored = match item.natural_key() {
                Some(code) => self
                    .store
                    .get_by_barcode(code)
                    .await
                    .with_context(|| format!("Failed to look up barcode {code}"))?,
                None => None,
            };
            match stored {
                Some(existing) => {
                    debug!(id = ?existing.id, name = %item.name, "edited item matches stored barcode");
                    item.id = existing.id;
                }
                None => item = self.reconciler.add_item(&item).await?,
            }
        }
        self.reconciler.touch(std::slice::from_mut(&mut item)).await?;
        Ok(item)
    }

    /// Save an item returned from the editor (update when stored, insert
    /// otherwise) and reload.
    pub async fn accept_edited(&mut self, item: FoodRecord) -> Result<FoodRecord> {
        let saved = self.save_edited(item).await?;
        self.load().await?;
        Ok(saved)
    }

    /// Resolve the selection into stored records and hand them to `consumer`.
    ///
    /// Does nothing when nothing is selected. The selection is cleared once
    /// the consumer has accepted the records; on failure it is kept so the
    /// user can retry.
    pub async fn commit(&mut self, consumer: &dyn ResolvedItemsConsumer) -> Result<Vec<FoodRecord>> {
        if self.selection.is_empty() {
            return Ok(Vec::new());
        }
        let selected = self.selection.snapshot();
        let items = self.reconciler.commit(&selected, consumer).await?;
        self.selection.clear();
        Ok(items)
    }
}
