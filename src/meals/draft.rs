use crate::foods::model::FoodItem;

/// Working selection for the meal being composed. Ordered, unique by food
/// id, in-memory only. Every operation is an idempotent no-op on a missing
/// or duplicate id; none of them can fail.
#[derive(Debug, Default, Clone)]
pub struct MealDraft {
    foods: Vec<FoodItem>,
}

impl MealDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends unless an item with the same id is already present.
    pub fn add(&mut self, food: FoodItem) {
        if !self.contains(&food.id) {
            self.foods.push(food);
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.foods.retain(|f| f.id != id);
    }

    /// Removes the item if present, adds it otherwise. Exactly one state
    /// transition per call. Returns whether the item is selected afterwards.
    pub fn toggle(&mut self, food: &FoodItem) -> bool {
        if self.contains(&food.id) {
            self.remove(&food.id);
            false
        } else {
            self.foods.push(food.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        self.foods.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.foods.iter().any(|f| f.id == id)
    }

    pub fn foods(&self) -> &[FoodItem] {
        &self.foods
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::model::NutriScore;

    fn food(id: &str) -> FoodItem {
        FoodItem {
            id: id.into(),
            name: format!("food {id}"),
            brand: "Test".into(),
            image_url: None,
            nutriscore: NutriScore::Unknown,
            calories: 100.0,
            protein_g: 1.0,
            carbs_g: 2.0,
            fat_g: 3.0,
        }
    }

    #[test]
    fn add_is_idempotent_per_id() {
        let mut draft = MealDraft::new();
        draft.add(food("a"));
        draft.add(food("a"));
        draft.add(food("b"));
        assert_eq!(draft.len(), 2);
        assert!(draft.contains("a"));
        assert!(draft.contains("b"));
    }

    #[test]
    fn remove_missing_id_is_a_noop() {
        let mut draft = MealDraft::new();
        draft.add(food("a"));
        draft.remove("nope");
        assert_eq!(draft.len(), 1);
        draft.remove("a");
        assert!(draft.is_empty());
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut draft = MealDraft::new();
        draft.add(food("a"));

        assert!(draft.toggle(&food("b")));
        assert!(draft.contains("b"));
        assert!(!draft.toggle(&food("b")));
        assert!(!draft.contains("b"));

        assert!(!draft.toggle(&food("a")));
        assert!(draft.toggle(&food("a")));
        assert_eq!(draft.len(), 1);
    }

    #[test]
    fn clear_empties_the_selection() {
        let mut draft = MealDraft::new();
        draft.add(food("a"));
        draft.add(food("b"));
        draft.clear();
        assert!(draft.is_empty());
        draft.clear();
        assert!(draft.is_empty());
    }

    #[test]
    fn preserves_insertion_order() {
        let mut draft = MealDraft::new();
        draft.add(food("c"));
        draft.add(food("a"));
        draft.add(food("b"));
        let ids: Vec<&str> = draft.foods().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }
}
