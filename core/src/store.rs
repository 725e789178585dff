use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{
    Activity, CalorieGoal, FoodLogEntry, NewActivity, NewFoodLogEntry, WaterEntry,
    saturating_total,
};

/// Persistence for everything the tracker records.
///
/// Implementations only store and fetch; lookup, validation and calorie
/// computation happen before a call reaches the store.
pub trait TrackerStore: Send {
    // --- Food log ---

    fn insert_food_log(&mut self, entry: &NewFoodLogEntry) -> Result<FoodLogEntry>;

    /// All entries in insertion order, optionally restricted to one date.
    fn list_food_log(&self, date: Option<NaiveDate>) -> Result<Vec<FoodLogEntry>>;

    /// Returns false when no entry had that id.
    fn delete_food_log(&mut self, id: i64) -> Result<bool>;

    /// Returns the number of entries removed.
    fn clear_food_log(&mut self) -> Result<usize>;

    // --- Goals ---

    fn upsert_goal(&mut self, date: NaiveDate, goal: i64) -> Result<CalorieGoal>;

    fn get_goal(&self, date: NaiveDate) -> Result<Option<CalorieGoal>>;

    // --- Activities ---

    fn insert_activity(&mut self, activity: &NewActivity) -> Result<Activity>;

    fn activities_for_date(&self, date: NaiveDate) -> Result<Vec<Activity>>;

    fn total_burned(&self, date: NaiveDate) -> Result<i64> {
        Ok(saturating_total(
            self.activities_for_date(date)?
                .iter()
                .map(|a| a.calories_burned),
        ))
    }

    // --- Water ---

    fn insert_water(&mut self, amount_ml: i64, date: NaiveDate) -> Result<WaterEntry>;

    fn water_for_date(&self, date: NaiveDate) -> Result<Vec<WaterEntry>>;
}

/// Behaviour every backend must share. Each backend's test module runs these
/// against a fresh store.
#[cfg(test)]
pub(crate) mod contract {
    use super::TrackerStore;
    use crate::catalog::Catalog;
    use crate::models::{NewActivity, NewFoodLogEntry};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn apple(quantity: f64, date: NaiveDate) -> NewFoodLogEntry {
        let catalog = Catalog::builtin();
        NewFoodLogEntry::build(catalog.lookup("apple").unwrap(), quantity, date)
    }

    pub(crate) fn insert_and_list(store: &mut dyn TrackerStore) {
        let first = store.insert_food_log(&apple(3.0, day(15))).unwrap();
        let second = store.insert_food_log(&apple(1.0, day(16))).unwrap();

        assert_eq!(first.name, "Apple");
        assert_eq!(first.unit, "item");
        assert_eq!(first.calories, 156.0);
        assert_eq!(first.date, day(15));
        assert_ne!(first.id, second.id);

        let all = store.list_food_log(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);

        let on_16th = store.list_food_log(Some(day(16))).unwrap();
        assert_eq!(on_16th.len(), 1);
        assert_eq!(on_16th[0].calories, 52.0);

        assert!(store.list_food_log(Some(day(17))).unwrap().is_empty());
    }

    pub(crate) fn delete_one(store: &mut dyn TrackerStore) {
        let keep = store.insert_food_log(&apple(1.0, day(15))).unwrap();
        let gone = store.insert_food_log(&apple(2.0, day(15))).unwrap();

        assert!(store.delete_food_log(gone.id).unwrap());
        assert!(!store.delete_food_log(gone.id).unwrap());

        let rest = store.list_food_log(None).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, keep.id);
    }

    pub(crate) fn clear_all(store: &mut dyn TrackerStore) {
        store.insert_food_log(&apple(1.0, day(15))).unwrap();
        store.insert_food_log(&apple(2.0, day(16))).unwrap();

        assert_eq!(store.clear_food_log().unwrap(), 2);
        assert!(store.list_food_log(None).unwrap().is_empty());
        assert_eq!(store.clear_food_log().unwrap(), 0);

        // Ids are not reused after a clear.
        let again = store.insert_food_log(&apple(1.0, day(15))).unwrap();
        assert!(again.id > 2);
    }

    pub(crate) fn goal_upsert_overwrites(store: &mut dyn TrackerStore) {
        assert!(store.get_goal(day(15)).unwrap().is_none());

        store.upsert_goal(day(15), 2000).unwrap();
        let updated = store.upsert_goal(day(15), 1800).unwrap();
        assert_eq!(updated.goal, 1800);

        let fetched = store.get_goal(day(15)).unwrap().unwrap();
        assert_eq!(fetched.goal, 1800);
        assert_eq!(fetched.date, day(15));

        assert!(store.get_goal(day(16)).unwrap().is_none());
    }

    pub(crate) fn activities_by_date(store: &mut dyn TrackerStore) {
        for (name, burned, d) in [("Run", 300, 15), ("Bike", 250, 15), ("Yoga", 90, 16)] {
            store
                .insert_activity(&NewActivity {
                    activity_name: name.to_string(),
                    duration_minutes: 30,
                    calories_burned: burned,
                    date: day(d),
                })
                .unwrap();
        }

        let on_15th = store.activities_for_date(day(15)).unwrap();
        assert_eq!(on_15th.len(), 2);
        assert_eq!(on_15th[0].activity_name, "Run");
        assert_eq!(on_15th[1].activity_name, "Bike");

        assert_eq!(store.total_burned(day(15)).unwrap(), 550);
        assert_eq!(store.total_burned(day(16)).unwrap(), 90);
        assert_eq!(store.total_burned(day(17)).unwrap(), 0);
    }

    pub(crate) fn water_by_date(store: &mut dyn TrackerStore) {
        store.insert_water(250, day(15)).unwrap();
        store.insert_water(500, day(15)).unwrap();
        store.insert_water(330, day(16)).unwrap();

        let on_15th = store.water_for_date(day(15)).unwrap();
        assert_eq!(on_15th.len(), 2);
        assert_eq!(on_15th.iter().map(|w| w.amount_ml).sum::<i64>(), 750);
        assert!(store.water_for_date(day(20)).unwrap().is_empty());
    }

    pub(crate) fn totals_saturate(store: &mut dyn TrackerStore) {
        for burned in [i64::MAX, 1] {
            store
                .insert_activity(&NewActivity {
                    activity_name: "Ultra".to_string(),
                    duration_minutes: 60,
                    calories_burned: burned,
                    date: day(15),
                })
                .unwrap();
        }
        assert_eq!(store.total_burned(day(15)).unwrap(), i64::MAX);
    }

    pub(crate) fn run_all(mut fresh: impl FnMut() -> Box<dyn TrackerStore>) {
        insert_and_list(fresh().as_mut());
        delete_one(fresh().as_mut());
        clear_all(fresh().as_mut());
        goal_upsert_overwrites(fresh().as_mut());
        activities_by_date(fresh().as_mut());
        water_by_date(fresh().as_mut());
        totals_saturate(fresh().as_mut());
    }
}
