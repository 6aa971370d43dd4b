use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::foods::model::FoodItem;
use crate::foods::search::FoodSearch;
use crate::meals::draft::MealDraft;
use crate::meals::model::{Meal, MealType};
use crate::state::AppState;
use crate::storage::MealStore;

/// Validation failures at save time. Surfaced to the user synchronously,
/// never persisted; the flow state is unchanged afterwards.
#[derive(Debug, Error, PartialEq)]
pub enum SaveMealError {
    #[error("pick a meal type before saving")]
    NoMealType,
    #[error("add at least one food before saving")]
    EmptyDraft,
}

/// The add-meal flow. Idle until a meal type is picked (re-entrant: picking
/// another type just replaces the selection); `save` requires a selected
/// type and a non-empty draft, persists a snapshot of the draft, then clears
/// the draft and resets the selection.
pub struct AddMealFlow {
    draft: MealDraft,
    selected: Option<MealType>,
    search: FoodSearch,
    store: Arc<dyn MealStore>,
}

impl AddMealFlow {
    pub fn new(state: &AppState) -> Self {
        Self {
            draft: MealDraft::new(),
            selected: None,
            search: FoodSearch::new(Arc::clone(&state.lookup)),
            store: Arc::clone(&state.store),
        }
    }

    pub fn select_type(&mut self, meal_type: MealType) {
        self.selected = Some(meal_type);
    }

    pub fn selected_type(&self) -> Option<MealType> {
        self.selected
    }

    pub fn draft(&self) -> &MealDraft {
        &self.draft
    }

    pub fn toggle(&mut self, food: &FoodItem) -> bool {
        self.draft.toggle(food)
    }

    /// Backs the "added" marker on result rows.
    pub fn is_selected(&self, food: &FoodItem) -> bool {
        self.draft.contains(&food.id)
    }

    pub fn search(&self) -> &FoodSearch {
        &self.search
    }

    /// Current selection merged with search results, one entry per id.
    pub async fn displayed_foods(&self) -> Vec<FoodItem> {
        self.search.display_list(self.draft.foods()).await
    }

    pub fn can_save(&self) -> bool {
        self.selected.is_some() && !self.draft.is_empty()
    }

    pub async fn save(&mut self) -> Result<Meal, SaveMealError> {
        let meal_type = self.selected.ok_or(SaveMealError::NoMealType)?;
        if self.draft.is_empty() {
            return Err(SaveMealError::EmptyDraft);
        }

        let meal = Meal::new(
            meal_type,
            self.draft.foods().to_vec(),
            OffsetDateTime::now_utc(),
        );
        // A storage failure is logged and the flow still completes; the
        // worst case is "nothing persisted, log it again".
        match self.store.save(&meal).await {
            Ok(()) => info!(
                meal_id = %meal.id,
                meal_type = %meal.name,
                foods = meal.foods.len(),
                "meal saved"
            ),
            Err(e) => warn!(error = %e, meal_id = %meal.id, "failed to persist meal"),
        }

        self.draft.clear();
        self.selected = None;
        self.search.reset().await;
        Ok(meal)
    }
}
