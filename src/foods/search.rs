use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::foods::lookup::FoodLookup;
use crate::foods::model::FoodItem;

pub const DEBOUNCE: Duration = Duration::from_millis(400);
pub const MIN_QUERY_LEN: usize = 3;

/// Merges the current selection with freshly fetched results into one
/// duplicate-free display list. Selected items come first and keep their
/// position; when the same id shows up again later, the later occurrence's
/// field values overwrite the stored ones, so fetched data wins over a stale
/// selected copy.
pub fn reconcile(selected: &[FoodItem], fetched: &[FoodItem]) -> Vec<FoodItem> {
    let mut merged: Vec<FoodItem> = Vec::with_capacity(selected.len() + fetched.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for food in selected.iter().chain(fetched) {
        match positions.get(&food.id) {
            Some(&pos) => merged[pos] = food.clone(),
            None => {
                positions.insert(food.id.clone(), merged.len());
                merged.push(food.clone());
            }
        }
    }
    merged
}

/// Outcome of a barcode scan, surfaced to the user as-is. `NotFound` is a
/// distinct condition, not an error: the result list stays unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Found(FoodItem),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: Vec<FoodItem>,
    pub is_searching: bool,
    pub show_no_result: bool,
}

#[derive(Debug)]
struct SearchState {
    query: String,
    results: Vec<FoodItem>,
    generation: u64,
    outstanding: usize,
}

/// Debounced food search with stale-result protection.
///
/// Every query change bumps a generation counter. A scheduled debounce timer
/// that wakes up with a stale generation exits without fetching (timer
/// invalidation), and an in-flight fetch that completes with a stale
/// generation discards its results instead of applying them. Barcode scans
/// bypass the debounce and merge into whatever the current result list is.
pub struct FoodSearch {
    lookup: Arc<dyn FoodLookup>,
    state: Arc<Mutex<SearchState>>,
    debounce: Duration,
}

impl FoodSearch {
    pub fn new(lookup: Arc<dyn FoodLookup>) -> Self {
        Self {
            lookup,
            state: Arc::new(Mutex::new(SearchState {
                query: String::new(),
                results: Vec::new(),
                generation: 0,
                outstanding: 0,
            })),
            debounce: DEBOUNCE,
        }
    }

    /// Records a query change. Queries shorter than [`MIN_QUERY_LEN`] trimmed
    /// characters never fetch and clear prior results immediately; anything
    /// longer schedules a fetch behind the debounce timer.
    pub async fn set_query(&self, raw: &str) {
        let query = raw.trim().to_string();
        let mut st = self.state.lock().await;
        st.generation += 1;
        st.query = query.clone();
        if query.chars().count() < MIN_QUERY_LEN {
            st.results.clear();
            st.outstanding = 0;
            return;
        }
        let generation = st.generation;
        drop(st);

        let state = Arc::clone(&self.state);
        let lookup = Arc::clone(&self.lookup);
        let debounce = self.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            {
                let mut st = state.lock().await;
                if st.generation != generation {
                    // superseded before the timer elapsed
                    return;
                }
                st.outstanding += 1;
            }
            let found = lookup.by_text(&query).await;
            let mut st = state.lock().await;
            st.outstanding = st.outstanding.saturating_sub(1);
            if st.generation == generation {
                st.results = found;
            }
        });
    }

    /// Barcode-triggered lookup. A hit is moved to the front of the result
    /// list, replacing any entry with the same id.
    pub async fn scan(&self, code: &str) -> ScanOutcome {
        let code = code.trim();
        if code.is_empty() {
            return ScanOutcome::NotFound;
        }
        match self.lookup.by_barcode(code).await {
            Some(food) => {
                let mut st = self.state.lock().await;
                st.results.retain(|f| f.id != food.id);
                st.results.insert(0, food.clone());
                ScanOutcome::Found(food)
            }
            None => ScanOutcome::NotFound,
        }
    }

    /// Clears query and results and invalidates anything pending or in
    /// flight. Used when the add-meal flow finishes or is abandoned.
    pub async fn reset(&self) {
        let mut st = self.state.lock().await;
        st.generation += 1;
        st.query.clear();
        st.results.clear();
        st.outstanding = 0;
    }

    /// Derived view state, recomputed on every call.
    pub async fn snapshot(&self) -> SearchSnapshot {
        let st = self.state.lock().await;
        let long_enough = st.query.chars().count() >= MIN_QUERY_LEN;
        SearchSnapshot {
            query: st.query.clone(),
            results: st.results.clone(),
            is_searching: st.outstanding > 0,
            show_no_result: long_enough && st.outstanding == 0 && st.results.is_empty(),
        }
    }

    /// The merged display list for the given selection.
    pub async fn display_list(&self, selected: &[FoodItem]) -> Vec<FoodItem> {
        let st = self.state.lock().await;
        reconcile(selected, &st.results)
    }
}
