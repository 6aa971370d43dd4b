use thiserror::Error;
use tracing::warn;

use crate::storage::MealStore;

pub const DAILY_GOAL_KEY: &str = "nutritrack.dailyCalorieGoal";
pub const DEFAULT_DAILY_GOAL: f64 = 2000.0;

#[derive(Debug, Error, PartialEq)]
pub enum GoalError {
    #[error("daily goal must be a number greater than zero")]
    Invalid,
}

/// Stored daily calorie goal; falls back to the default when the value is
/// unset, unreadable, or not a positive number.
pub async fn daily_goal(store: &dyn MealStore) -> f64 {
    match store.get_setting(DAILY_GOAL_KEY).await {
        Ok(Some(value)) => value
            .as_f64()
            .filter(|goal| goal.is_finite() && *goal > 0.0)
            .unwrap_or(DEFAULT_DAILY_GOAL),
        Ok(None) => DEFAULT_DAILY_GOAL,
        Err(e) => {
            warn!(error = %e, "failed to read daily goal, using default");
            DEFAULT_DAILY_GOAL
        }
    }
}

/// Validates and persists a new goal, rounded to a whole number. Invalid
/// input is rejected without touching stored state.
pub async fn save_daily_goal(store: &dyn MealStore, goal: f64) -> Result<f64, GoalError> {
    if !goal.is_finite() || goal <= 0.0 {
        return Err(GoalError::Invalid);
    }
    let rounded = goal.round();
    if let Err(e) = store
        .set_setting(DAILY_GOAL_KEY, serde_json::json!(rounded))
        .await
    {
        warn!(error = %e, "failed to persist daily goal");
    }
    Ok(rounded)
}
