use std::ops::Add;

use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::foods::model::FoodItem;
use crate::meals::model::Meal;

/// Summed macros over a food sequence. Each field sums independently; a
/// non-finite value contributes zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

fn sane(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl Totals {
    pub fn of<'a, I>(foods: I) -> Self
    where
        I: IntoIterator<Item = &'a FoodItem>,
    {
        foods.into_iter().fold(Self::default(), |acc, food| {
            acc + Self {
                calories: sane(food.calories),
                protein_g: sane(food.protein_g),
                carbs_g: sane(food.carbs_g),
                fat_g: sane(food.fat_g),
            }
        })
    }
}

impl Add for Totals {
    type Output = Totals;

    fn add(self, other: Totals) -> Totals {
        Totals {
            calories: self.calories + other.calories,
            protein_g: self.protein_g + other.protein_g,
            carbs_g: self.carbs_g + other.carbs_g,
            fat_g: self.fat_g + other.fat_g,
        }
    }
}

pub fn meal_totals(meal: &Meal) -> Totals {
    Totals::of(&meal.foods)
}

/// Sum over every meal whose instant, viewed at `offset`, falls on `day`
/// (calendar date, not a rolling 24h window). Meals whose stored date does
/// not parse contribute nothing.
pub fn day_totals(meals: &[Meal], day: Date, offset: UtcOffset) -> Totals {
    meals
        .iter()
        .filter(|meal| {
            meal.parsed_date()
                .map(|dt| dt.to_offset(offset).date() == day)
                .unwrap_or(false)
        })
        .fold(Totals::default(), |acc, meal| acc + meal_totals(meal))
}

/// Local wall-clock now, falling back to UTC when the local offset cannot
/// be determined.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Progress of today's consumption against the daily goal. Pure derived
/// values, recomputed on every call, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub goal: f64,
    pub consumed: f64,
    pub progress: f64,
    pub percent: f64,
    pub remaining: f64,
    pub exceeded: bool,
}

impl GoalProgress {
    pub fn derive(goal: f64, consumed: f64) -> Self {
        let progress = if goal > 0.0 { consumed / goal } else { 0.0 };
        Self {
            goal,
            consumed,
            progress,
            percent: (progress * 100.0).clamp(0.0, 100.0),
            remaining: (goal - consumed).max(0.0),
            exceeded: consumed > goal,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;
    use crate::foods::model::NutriScore;
    use crate::meals::model::MealType;

    fn food(id: &str, kcal: f64, protein: f64, carbs: f64, fat: f64) -> FoodItem {
        FoodItem {
            id: id.into(),
            name: format!("food {id}"),
            brand: "Test".into(),
            image_url: None,
            nutriscore: NutriScore::Unknown,
            calories: kcal,
            protein_g: protein,
            carbs_g: carbs,
            fat_g: fat,
        }
    }

    #[test]
    fn empty_sequence_sums_to_zero() {
        let foods: Vec<FoodItem> = Vec::new();
        assert_eq!(Totals::of(&foods), Totals::default());
    }

    #[test]
    fn sums_each_macro_independently() {
        let foods = vec![
            food("a", 300.0, 10.0, 20.0, 5.0),
            food("b", 200.0, 5.0, 30.0, 2.5),
        ];
        let totals = Totals::of(&foods);
        assert_eq!(totals.calories, 500.0);
        assert_eq!(totals.protein_g, 15.0);
        assert_eq!(totals.carbs_g, 50.0);
        assert_eq!(totals.fat_g, 7.5);
    }

    #[test]
    fn aggregation_is_order_independent_over_partitions() {
        let foods = vec![
            food("a", 120.0, 1.0, 2.0, 3.0),
            food("b", 80.0, 4.0, 5.0, 6.0),
            food("c", 55.0, 7.0, 8.0, 9.0),
        ];
        let whole = Totals::of(&foods);
        let parts = Totals::of(&foods[..1]) + Totals::of(&foods[1..]);
        assert_eq!(whole, parts);

        let reversed: Vec<_> = foods.iter().rev().cloned().collect();
        assert_eq!(Totals::of(&reversed), whole);
    }

    #[test]
    fn non_finite_macros_contribute_zero() {
        let foods = vec![food("a", f64::NAN, f64::INFINITY, -3.0, 2.0)];
        let totals = Totals::of(&foods);
        assert_eq!(totals.calories, 0.0);
        assert_eq!(totals.protein_g, 0.0);
        assert_eq!(totals.carbs_g, 0.0);
        assert_eq!(totals.fat_g, 2.0);
    }

    #[test]
    fn day_totals_only_count_meals_on_that_calendar_day() {
        let today = Meal::new(
            MealType::Lunch,
            vec![food("a", 300.0, 0.0, 0.0, 0.0)],
            datetime!(2025-08-06 12:00:00 UTC),
        );
        let yesterday = Meal::new(
            MealType::Dinner,
            vec![food("b", 900.0, 0.0, 0.0, 0.0)],
            datetime!(2025-08-05 19:00:00 UTC),
        );
        let broken = Meal {
            id: "x".into(),
            name: "Snack".into(),
            date: "garbage".into(),
            foods: vec![food("c", 50.0, 0.0, 0.0, 0.0)],
        };

        let totals = day_totals(
            &[today, yesterday, broken],
            date!(2025 - 08 - 06),
            UtcOffset::UTC,
        );
        assert_eq!(totals.calories, 300.0);
    }

    #[test]
    fn day_totals_respect_the_local_offset() {
        // 23:30 UTC on the 5th is already the 6th at +02:00.
        let meal = Meal::new(
            MealType::Snack,
            vec![food("a", 150.0, 0.0, 0.0, 0.0)],
            datetime!(2025-08-05 23:30:00 UTC),
        );
        let paris = UtcOffset::from_hms(2, 0, 0).expect("valid offset");

        let meals = [meal];
        assert_eq!(day_totals(&meals, date!(2025 - 08 - 06), paris).calories, 150.0);
        assert_eq!(day_totals(&meals, date!(2025 - 08 - 05), paris).calories, 0.0);
        assert_eq!(
            day_totals(&meals, date!(2025 - 08 - 05), UtcOffset::UTC).calories,
            150.0
        );
    }

    #[test]
    fn goal_progress_derivation() {
        let p = GoalProgress::derive(2000.0, 500.0);
        assert_eq!(p.progress, 0.25);
        assert_eq!(p.percent, 25.0);
        assert_eq!(p.remaining, 1500.0);
        assert!(!p.exceeded);

        let over = GoalProgress::derive(2000.0, 3000.0);
        assert_eq!(over.progress, 1.5);
        assert_eq!(over.percent, 100.0);
        assert_eq!(over.remaining, 0.0);
        assert!(over.exceeded);

        let unset = GoalProgress::derive(0.0, 500.0);
        assert_eq!(unset.progress, 0.0);
        assert_eq!(unset.percent, 0.0);
        assert_eq!(unset.remaining, 0.0);
    }
}
