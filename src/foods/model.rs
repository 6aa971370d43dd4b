use serde::{Deserialize, Serialize};

/// Canonical nutrition record for one product. `id` is the sole identity key:
/// the barcode for scanned items, the database code for searched items.
/// Macros are per 100 g and never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub nutriscore: NutriScore,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutriScore {
    A,
    B,
    C,
    D,
    E,
    #[default]
    Unknown,
}

impl NutriScore {
    /// Maps an OpenFoodFacts grade string; anything outside a-e is Unknown.
    pub fn from_grade(grade: &str) -> Self {
        match grade.trim().to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "b" => Self::B,
            "c" => Self::C,
            "d" => Self::D,
            "e" => Self::E,
            _ => Self::Unknown,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::Unknown => "?",
        }
    }
}

impl std::fmt::Display for NutriScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_mapping() {
        assert_eq!(NutriScore::from_grade("a"), NutriScore::A);
        assert_eq!(NutriScore::from_grade(" B "), NutriScore::B);
        assert_eq!(NutriScore::from_grade("e"), NutriScore::E);
        assert_eq!(NutriScore::from_grade("unknown"), NutriScore::Unknown);
        assert_eq!(NutriScore::from_grade(""), NutriScore::Unknown);
        assert_eq!(NutriScore::from_grade("N/A"), NutriScore::Unknown);
    }

    #[test]
    fn missing_fields_deserialize_with_defaults() {
        let food: FoodItem =
            serde_json::from_str(r#"{"id":"123","name":"Oats","brand":"Acme"}"#)
                .expect("minimal food should parse");
        assert_eq!(food.nutriscore, NutriScore::Unknown);
        assert_eq!(food.calories, 0.0);
        assert_eq!(food.image_url, None);
    }
}
