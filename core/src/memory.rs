use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::models::{
    Activity, CalorieGoal, FoodLogEntry, NewActivity, NewFoodLogEntry, WaterEntry,
};
use crate::store::TrackerStore;

/// Process-local backend. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: i64,
    foods: Vec<FoodLogEntry>,
    goals: BTreeMap<NaiveDate, CalorieGoal>,
    activities: Vec<Activity>,
    water: Vec<WaterEntry>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn now() -> String {
    Local::now().to_rfc3339()
}

impl TrackerStore for MemoryStore {
    fn insert_food_log(&mut self, entry: &NewFoodLogEntry) -> Result<FoodLogEntry> {
        let logged = FoodLogEntry {
            id: self.allocate_id(),
            name: entry.name.clone(),
            quantity: entry.quantity,
            unit: entry.unit.clone(),
            calories: entry.nutrition.calories,
            protein: entry.nutrition.protein,
            carbs: entry.nutrition.carbs,
            fat: entry.nutrition.fat,
            date: entry.date,
            created_at: now(),
        };
        self.foods.push(logged.clone());
        Ok(logged)
    }

    fn list_food_log(&self, date: Option<NaiveDate>) -> Result<Vec<FoodLogEntry>> {
        Ok(self
            .foods
            .iter()
            .filter(|f| date.is_none_or(|d| f.date == d))
            .cloned()
            .collect())
    }

    fn delete_food_log(&mut self, id: i64) -> Result<bool> {
        let before = self.foods.len();
        self.foods.retain(|f| f.id != id);
        Ok(self.foods.len() < before)
    }

    fn clear_food_log(&mut self) -> Result<usize> {
        let removed = self.foods.len();
        self.foods.clear();
        Ok(removed)
    }

    fn upsert_goal(&mut self, date: NaiveDate, goal: i64) -> Result<CalorieGoal> {
        let record = CalorieGoal {
            date,
            goal,
            updated_at: now(),
        };
        self.goals.insert(date, record.clone());
        Ok(record)
    }

    fn get_goal(&self, date: NaiveDate) -> Result<Option<CalorieGoal>> {
        Ok(self.goals.get(&date).cloned())
    }

    fn insert_activity(&mut self, activity: &NewActivity) -> Result<Activity> {
        let record = Activity {
            id: self.allocate_id(),
            activity_name: activity.activity_name.clone(),
            duration_minutes: activity.duration_minutes,
            calories_burned: activity.calories_burned,
            date: activity.date,
            created_at: now(),
        };
        self.activities.push(record.clone());
        Ok(record)
    }

    fn activities_for_date(&self, date: NaiveDate) -> Result<Vec<Activity>> {
        Ok(self
            .activities
            .iter()
            .filter(|a| a.date == date)
            .cloned()
            .collect())
    }

    fn insert_water(&mut self, amount_ml: i64, date: NaiveDate) -> Result<WaterEntry> {
        let record = WaterEntry {
            id: self.allocate_id(),
            amount_ml,
            date,
            created_at: now(),
        };
        self.water.push(record.clone());
        Ok(record)
    }

    fn water_for_date(&self, date: NaiveDate) -> Result<Vec<WaterEntry>> {
        Ok(self
            .water
            .iter()
            .filter(|w| w.date == date)
            .cloned()
            .collect())
    }
}
