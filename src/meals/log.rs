use std::sync::Arc;

use time::{Date, UtcOffset};
use tracing::warn;

use crate::meals::model::Meal;
use crate::meals::nutrition::{self, Totals};
use crate::storage::MealStore;

/// Cached view of the saved meals, shared by the screens that list, inspect
/// and delete meals. Store failures are logged and degrade to the previous
/// cache; they never propagate.
pub struct MealLog {
    store: Arc<dyn MealStore>,
    meals: Vec<Meal>,
}

impl MealLog {
    pub fn new(store: Arc<dyn MealStore>) -> Self {
        Self {
            store,
            meals: Vec::new(),
        }
    }

    pub async fn refresh(&mut self) {
        match self.store.get_all().await {
            Ok(meals) => self.meals = meals,
            Err(e) => warn!(error = %e, "failed to load meals, keeping previous list"),
        }
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn find(&self, id: &str) -> Option<&Meal> {
        self.meals.iter().find(|m| m.id == id)
    }

    pub async fn delete(&mut self, id: &str) {
        if let Err(e) = self.store.delete_by_id(id).await {
            warn!(error = %e, %id, "failed to delete meal");
            return;
        }
        self.refresh().await;
    }

    pub fn totals_on(&self, day: Date, offset: UtcOffset) -> Totals {
        nutrition::day_totals(&self.meals, day, offset)
    }

    /// Today's rolled-up totals, on the local calendar date.
    pub fn today_totals(&self) -> Totals {
        let now = nutrition::local_now();
        self.totals_on(now.date(), now.offset())
    }
}
