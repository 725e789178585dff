use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::FoodCatalogEntry;
use crate::error::{Result, TrackerError};
use crate::nutrition::{self, Nutrition};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bounds for a single activity or water entry.
pub const MAX_ACTIVITY_MINUTES: i64 = 24 * 60;
pub const MAX_CALORIES_BURNED: i64 = 100_000;
pub const MAX_WATER_ML: i64 = 20_000;

/// Sum of per-entry amounts. Saturates instead of wrapping.
#[must_use]
pub fn saturating_total(values: impl IntoIterator<Item = i64>) -> i64 {
    values.into_iter().fold(0, i64::saturating_add)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodLogEntry {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    pub date: NaiveDate,
    pub created_at: String,
}

/// A log entry ready to be stored. Only constructed from a catalog entry so
/// that the stored calories always come from `calorie_per_unit * quantity`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLogEntry {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub nutrition: Nutrition,
    pub date: NaiveDate,
}

impl NewFoodLogEntry {
    #[must_use]
    pub fn build(food: &FoodCatalogEntry, quantity: f64, date: NaiveDate) -> Self {
        Self {
            name: food.name.clone(),
            quantity,
            unit: food.unit.clone(),
            nutrition: nutrition::compute(food, quantity),
            date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalorieGoal {
    pub date: NaiveDate,
    pub goal: i64,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub id: i64,
    pub activity_name: String,
    #[serde(rename = "duration")]
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub date: NaiveDate,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewActivity {
    pub activity_name: String,
    #[serde(default, rename = "duration", alias = "duration_minutes")]
    pub duration_minutes: i64,
    #[serde(default)]
    pub calories_burned: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaterEntry {
    pub id: i64,
    pub amount_ml: i64,
    pub date: NaiveDate,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaterDay {
    pub date: NaiveDate,
    pub entries: Vec<WaterEntry>,
    pub total_ml: i64,
}

/// Everything recorded for one day, with the goal balance when one is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub entry_count: usize,
    pub consumed_calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub burned_calories: i64,
    pub net_calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
    pub water_ml: i64,
}

impl DailySummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(
        date: NaiveDate,
        foods: &[FoodLogEntry],
        burned_calories: i64,
        goal: Option<i64>,
        water_ml: i64,
    ) -> Self {
        let consumed_calories: f64 = foods.iter().map(|f| f.calories).sum();
        let protein: f64 = foods.iter().filter_map(|f| f.protein).sum();
        let carbs: f64 = foods.iter().filter_map(|f| f.carbs).sum();
        let fat: f64 = foods.iter().filter_map(|f| f.fat).sum();
        let net_calories = consumed_calories - burned_calories as f64;
        Self {
            date,
            entry_count: foods.len(),
            consumed_calories,
            protein,
            carbs,
            fat,
            burned_calories,
            net_calories,
            goal,
            remaining: goal.map(|g| g as f64 - net_calories),
            water_ml,
        }
    }
}

// --- Validation ---

pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| TrackerError::invalid(format!("Invalid date '{date}'. Use YYYY-MM-DD")))
}

pub fn validate_quantity(quantity: f64) -> Result<()> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(())
    } else {
        Err(TrackerError::invalid("Quantity must be positive."))
    }
}

pub fn validate_goal(goal: i64) -> Result<()> {
    if goal <= 0 {
        return Err(TrackerError::invalid(
            "Calorie goal must be greater than 0",
        ));
    }
    Ok(())
}

pub fn validate_activity(activity: &NewActivity) -> Result<()> {
    if activity.activity_name.trim().is_empty() {
        return Err(TrackerError::invalid("activity_name must not be empty"));
    }
    if activity.duration_minutes < 0 {
        return Err(TrackerError::invalid("duration must not be negative"));
    }
    if activity.duration_minutes > MAX_ACTIVITY_MINUTES {
        return Err(TrackerError::invalid(format!(
            "duration must be at most {MAX_ACTIVITY_MINUTES} minutes"
        )));
    }
    if activity.calories_burned < 0 {
        return Err(TrackerError::invalid(
            "calories_burned must not be negative",
        ));
    }
    if activity.calories_burned > MAX_CALORIES_BURNED {
        return Err(TrackerError::invalid(format!(
            "calories_burned must be at most {MAX_CALORIES_BURNED}"
        )));
    }
    Ok(())
}

pub fn validate_water_amount(amount_ml: i64) -> Result<()> {
    if amount_ml <= 0 {
        return Err(TrackerError::invalid("amount_ml must be greater than 0"));
    }
    if amount_ml > MAX_WATER_ML {
        return Err(TrackerError::invalid(format!(
            "amount_ml must be at most {MAX_WATER_ML}"
        )));
    }
    Ok(())
}
