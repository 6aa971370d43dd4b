use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::foods::model::FoodItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snack => "Snack",
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown meal type `{0}`, expected breakfast, lunch, dinner or snack")]
pub struct ParseMealTypeError(String);

impl std::str::FromStr for MealType {
    type Err = ParseMealTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            other => Err(ParseMealTypeError(other.to_string())),
        }
    }
}

/// A saved meal. Immutable once persisted; `foods` is a snapshot of the
/// draft at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Millisecond timestamp of the save instant.
    pub id: String,
    /// One of the four meal-type labels.
    pub name: String,
    /// RFC 3339 instant. Kept as stored text so a value that no longer
    /// parses can still be shown raw.
    pub date: String,
    pub foods: Vec<FoodItem>,
}

impl Meal {
    pub fn new(meal_type: MealType, foods: Vec<FoodItem>, saved_at: OffsetDateTime) -> Self {
        Self {
            id: (saved_at.unix_timestamp_nanos() / 1_000_000).to_string(),
            name: meal_type.label().to_string(),
            date: saved_at.format(&Rfc3339).unwrap_or_default(),
            foods,
        }
    }

    pub fn parsed_date(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.date, &Rfc3339).ok()
    }

    /// dd/mm/yyyy at the given offset, or the raw stored string as fallback.
    pub fn display_date(&self, offset: UtcOffset) -> String {
        self.parsed_date()
            .and_then(|dt| {
                dt.to_offset(offset)
                    .format(format_description!("[day]/[month]/[year]"))
                    .ok()
            })
            .unwrap_or_else(|| self.date.clone())
    }

    /// hh:mm at the given offset, or `--:--` when the date does not parse.
    pub fn display_time(&self, offset: UtcOffset) -> String {
        self.parsed_date()
            .and_then(|dt| {
                dt.to_offset(offset)
                    .format(format_description!("[hour]:[minute]"))
                    .ok()
            })
            .unwrap_or_else(|| "--:--".to_string())
    }
}
