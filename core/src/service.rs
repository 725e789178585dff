use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};

use crate::catalog::Catalog;
use crate::error::{Result, TrackerError};
use crate::models::{
    Activity, CalorieGoal, DailySummary, FoodLogEntry, NewActivity, NewFoodLogEntry, WaterDay,
    WaterEntry, saturating_total, validate_activity, validate_goal, validate_quantity,
    validate_water_amount,
};
use crate::store::TrackerStore;

/// The calorie tracker: a food catalog plus a store for everything logged.
///
/// Both the HTTP server and the CLI go through this type, so validation and
/// calorie computation live in one place regardless of backend.
pub struct Tracker {
    catalog: Catalog,
    store: Box<dyn TrackerStore>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Tracker {
    pub fn new(catalog: Catalog, store: Box<dyn TrackerStore>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // --- Food log ---

    /// Log `quantity` of a catalog food. Returns the stored entry and the
    /// confirmation message shown to the user.
    pub fn add_food(
        &mut self,
        name: &str,
        quantity: f64,
        date: Option<NaiveDate>,
    ) -> Result<(FoodLogEntry, String)> {
        let food = self
            .catalog
            .lookup(name)
            .ok_or_else(|| TrackerError::invalid("Food not found in database."))?;
        validate_quantity(quantity)?;

        let entry = NewFoodLogEntry::build(food, quantity, date.unwrap_or_else(today));
        if !entry.nutrition.is_finite() {
            return Err(TrackerError::invalid("Quantity is too large."));
        }
        let logged = self.store.insert_food_log(&entry)?;
        tracing::debug!(id = logged.id, food = %logged.name, calories = logged.calories, "food logged");

        let message = format!("{} {} x {} added!", logged.quantity, logged.unit, logged.name);
        Ok((logged, message))
    }

    pub fn list_foods(&self, date: Option<NaiveDate>) -> Result<Vec<FoodLogEntry>> {
        Ok(self.store.list_food_log(date)?)
    }

    pub fn delete_food(&mut self, id: i64) -> Result<()> {
        if self.store.delete_food_log(id)? {
            Ok(())
        } else {
            Err(TrackerError::not_found(format!("Food with ID {id} not found.")))
        }
    }

    /// Returns how many entries were removed.
    pub fn clear_foods(&mut self) -> Result<usize> {
        let removed = self.store.clear_food_log()?;
        tracing::info!(removed, "food log cleared");
        Ok(removed)
    }

    pub fn food_suggestions(&self) -> BTreeMap<String, String> {
        self.catalog.suggestions()
    }

    // --- Goals ---

    pub fn set_goal(&mut self, date: NaiveDate, goal: i64) -> Result<CalorieGoal> {
        validate_goal(goal)?;
        Ok(self.store.upsert_goal(date, goal)?)
    }

    pub fn get_goal(&self, date: NaiveDate) -> Result<CalorieGoal> {
        self.store
            .get_goal(date)?
            .ok_or_else(|| TrackerError::not_found(format!("No calorie goal set for {date}")))
    }

    // --- Activities ---

    pub fn add_activity(&mut self, activity: &NewActivity) -> Result<Activity> {
        validate_activity(activity)?;
        let record = NewActivity {
            activity_name: activity.activity_name.trim().to_string(),
            ..activity.clone()
        };
        Ok(self.store.insert_activity(&record)?)
    }

    pub fn activities_for_date(&self, date: NaiveDate) -> Result<Vec<Activity>> {
        Ok(self.store.activities_for_date(date)?)
    }

    pub fn total_burned(&self, date: NaiveDate) -> Result<i64> {
        Ok(self.store.total_burned(date)?)
    }

    // --- Water ---

    pub fn add_water(&mut self, amount_ml: i64, date: Option<NaiveDate>) -> Result<WaterEntry> {
        validate_water_amount(amount_ml)?;
        Ok(self
            .store
            .insert_water(amount_ml, date.unwrap_or_else(today))?)
    }

    pub fn water_for_date(&self, date: NaiveDate) -> Result<WaterDay> {
        let entries = self.store.water_for_date(date)?;
        let total_ml = saturating_total(entries.iter().map(|w| w.amount_ml));
        Ok(WaterDay {
            date,
            entries,
            total_ml,
        })
    }

    // --- Summary ---

    pub fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary> {
        let foods = self.store.list_food_log(Some(date))?;
        let burned = self.store.total_burned(date)?;
        let goal = self.store.get_goal(date)?.map(|g| g.goal);
        let water = self.store.water_for_date(date)?;
        let water_ml = saturating_total(water.iter().map(|w| w.amount_ml));
        Ok(DailySummary::build(date, &foods, burned, goal, water_ml))
    }
}
