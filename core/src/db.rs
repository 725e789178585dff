use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params, types::Type};

use crate::catalog::{self, Catalog, FoodCatalogEntry, Macros, UnitKind};
use crate::models::{
    Activity, CalorieGoal, DATE_FORMAT, FoodLogEntry, NewActivity, NewFoodLogEntry, WaterEntry,
    saturating_total,
};
use crate::store::TrackerStore;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS catalog_foods (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                    calorie_per_unit REAL NOT NULL,
                    unit TEXT NOT NULL,
                    kind TEXT NOT NULL CHECK (kind IN ('piece', 'weight', 'volume', 'liquid')),
                    protein REAL,
                    carbs REAL,
                    fat REAL
                );

                CREATE TABLE IF NOT EXISTS food_log (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    quantity REAL NOT NULL CHECK (quantity > 0),
                    unit TEXT NOT NULL,
                    calories REAL NOT NULL,
                    protein REAL,
                    carbs REAL,
                    fat REAL,
                    date TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS calorie_goals (
                    date TEXT PRIMARY KEY,
                    goal INTEGER NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS activities (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    activity_name TEXT NOT NULL,
                    duration INTEGER NOT NULL DEFAULT 0,
                    calories_burned INTEGER NOT NULL DEFAULT 0,
                    date TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_food_log_date ON food_log(date);
                CREATE INDEX IF NOT EXISTS idx_activities_date ON activities(date);",
            )?;

            let seeded = self.seed_catalog(&catalog::builtin_entries())?;
            tracing::info!(foods = seeded, "seeded food catalog");

            self.conn.execute_batch("PRAGMA user_version = 1;")?;
        }

        if version < 2 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS water_log (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    amount_ml INTEGER NOT NULL CHECK (amount_ml > 0),
                    date TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_water_log_date ON water_log(date);

                PRAGMA user_version = 2;",
            )?;
            tracing::debug!(from = version, to = 2, "database schema migrated");
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn date_from_row(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
        let raw: String = row.get(idx)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    // Expects columns:
    // 0: name, 1: calorie_per_unit, 2: unit, 3: kind, 4: protein, 5: carbs, 6: fat
    fn catalog_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodCatalogEntry> {
        let kind_raw: String = row.get(3)?;
        let kind = UnitKind::parse(&kind_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into())
        })?;
        let protein: Option<f64> = row.get(4)?;
        let carbs: Option<f64> = row.get(5)?;
        let fat: Option<f64> = row.get(6)?;
        let macros = match (protein, carbs, fat) {
            (Some(protein), Some(carbs), Some(fat)) => Some(Macros {
                protein,
                carbs,
                fat,
            }),
            _ => None,
        };
        Ok(FoodCatalogEntry {
            name: row.get(0)?,
            calorie_per_unit: row.get(1)?,
            unit: row.get(2)?,
            kind,
            macros,
        })
    }

    // Expects columns:
    // 0: id, 1: name, 2: quantity, 3: unit, 4: calories, 5: protein, 6: carbs,
    // 7: fat, 8: date, 9: created_at
    fn food_log_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodLogEntry> {
        Ok(FoodLogEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            quantity: row.get(2)?,
            unit: row.get(3)?,
            calories: row.get(4)?,
            protein: row.get(5)?,
            carbs: row.get(6)?,
            fat: row.get(7)?,
            date: Self::date_from_row(row, 8)?,
            created_at: row.get(9)?,
        })
    }

    fn activity_from_row(row: &rusqlite::Row) -> rusqlite::Result<Activity> {
        Ok(Activity {
            id: row.get(0)?,
            activity_name: row.get(1)?,
            duration_minutes: row.get(2)?,
            calories_burned: row.get(3)?,
            date: Self::date_from_row(row, 4)?,
            created_at: row.get(5)?,
        })
    }

    fn water_from_row(row: &rusqlite::Row) -> rusqlite::Result<WaterEntry> {
        Ok(WaterEntry {
            id: row.get(0)?,
            amount_ml: row.get(1)?,
            date: Self::date_from_row(row, 2)?,
            created_at: row.get(3)?,
        })
    }

    // --- Catalog ---

    fn seed_catalog(&self, entries: &[FoodCatalogEntry]) -> Result<usize> {
        let mut stmt = self.conn.prepare(
            "INSERT OR IGNORE INTO catalog_foods (name, calorie_per_unit, unit, kind, protein, carbs, fat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        let mut inserted = 0;
        for e in entries {
            inserted += stmt.execute(params![
                e.name.trim(),
                e.calorie_per_unit,
                e.unit,
                e.kind.as_str(),
                e.macros.map(|m| m.protein),
                e.macros.map(|m| m.carbs),
                e.macros.map(|m| m.fat),
            ])?;
        }
        Ok(inserted)
    }

    /// Read the catalog in the order entries were first added.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let mut stmt = self.conn.prepare(
            "SELECT name, calorie_per_unit, unit, kind, protein, carbs, fat
             FROM catalog_foods ORDER BY id",
        )?;
        let entries = stmt
            .query_map([], Self::catalog_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read food catalog")?;
        Ok(Catalog::new(entries))
    }

    /// Insert or replace catalog foods, matching names case-insensitively.
    /// All rows are written in one transaction.
    pub fn upsert_catalog_entries(&mut self, entries: &[FoodCatalogEntry]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO catalog_foods (name, calorie_per_unit, unit, kind, protein, carbs, fat)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(name) DO UPDATE SET
                    calorie_per_unit = excluded.calorie_per_unit,
                    unit = excluded.unit,
                    kind = excluded.kind,
                    protein = excluded.protein,
                    carbs = excluded.carbs,
                    fat = excluded.fat",
            )?;
            for e in entries {
                stmt.execute(params![
                    e.name.trim(),
                    e.calorie_per_unit,
                    e.unit,
                    e.kind.as_str(),
                    e.macros.map(|m| m.protein),
                    e.macros.map(|m| m.carbs),
                    e.macros.map(|m| m.fat),
                ])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    pub fn get_food_log_entry(&self, id: i64) -> Result<Option<FoodLogEntry>> {
        self.conn
            .query_row(
                "SELECT id, name, quantity, unit, calories, protein, carbs, fat, date, created_at
                 FROM food_log WHERE id = ?1",
                params![id],
                Self::food_log_from_row,
            )
            .optional()
            .context("failed to read food log entry")
    }
}

impl TrackerStore for Database {
    // --- Food log ---

    fn insert_food_log(&mut self, entry: &NewFoodLogEntry) -> Result<FoodLogEntry> {
        let now = Local::now().to_rfc3339();
        let date_str = entry.date.format(DATE_FORMAT).to_string();
        self.conn.execute(
            "INSERT INTO food_log (name, quantity, unit, calories, protein, carbs, fat, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.name,
                entry.quantity,
                entry.unit,
                entry.nutrition.calories,
                entry.nutrition.protein,
                entry.nutrition.carbs,
                entry.nutrition.fat,
                date_str,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_food_log_entry(id)?
            .context("Food log entry not found after insert")
    }

    fn list_food_log(&self, date: Option<NaiveDate>) -> Result<Vec<FoodLogEntry>> {
        let entries = if let Some(date) = date {
            let date_str = date.format(DATE_FORMAT).to_string();
            let mut stmt = self.conn.prepare(
                "SELECT id, name, quantity, unit, calories, protein, carbs, fat, date, created_at
                 FROM food_log WHERE date = ?1 ORDER BY id",
            )?;
            stmt.query_map(params![date_str], Self::food_log_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, quantity, unit, calories, protein, carbs, fat, date, created_at
                 FROM food_log ORDER BY id",
            )?;
            stmt.query_map([], Self::food_log_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(entries)
    }

    fn delete_food_log(&mut self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM food_log WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn clear_food_log(&mut self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM food_log", [])?;
        Ok(rows)
    }

    // --- Goals ---

    fn upsert_goal(&mut self, date: NaiveDate, goal: i64) -> Result<CalorieGoal> {
        let now = Local::now().to_rfc3339();
        let date_str = date.format(DATE_FORMAT).to_string();
        self.conn.execute(
            "INSERT INTO calorie_goals (date, goal, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET
                goal = excluded.goal,
                updated_at = excluded.updated_at",
            params![date_str, goal, now],
        )?;
        self.get_goal(date)?
            .context("Calorie goal not found after upsert")
    }

    fn get_goal(&self, date: NaiveDate) -> Result<Option<CalorieGoal>> {
        let date_str = date.format(DATE_FORMAT).to_string();
        self.conn
            .query_row(
                "SELECT date, goal, updated_at FROM calorie_goals WHERE date = ?1",
                params![date_str],
                |row| {
                    Ok(CalorieGoal {
                        date: Self::date_from_row(row, 0)?,
                        goal: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .context("failed to read calorie goal")
    }

    // --- Activities ---

    fn insert_activity(&mut self, activity: &NewActivity) -> Result<Activity> {
        let now = Local::now().to_rfc3339();
        let date_str = activity.date.format(DATE_FORMAT).to_string();
        self.conn.execute(
            "INSERT INTO activities (activity_name, duration, calories_burned, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                activity.activity_name,
                activity.duration_minutes,
                activity.calories_burned,
                date_str,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.conn
            .query_row(
                "SELECT id, activity_name, duration, calories_burned, date, created_at
                 FROM activities WHERE id = ?1",
                params![id],
                Self::activity_from_row,
            )
            .context("Activity not found after insert")
    }

    fn activities_for_date(&self, date: NaiveDate) -> Result<Vec<Activity>> {
        let date_str = date.format(DATE_FORMAT).to_string();
        let mut stmt = self.conn.prepare(
            "SELECT id, activity_name, duration, calories_burned, date, created_at
             FROM activities WHERE date = ?1 ORDER BY id",
        )?;
        let activities = stmt
            .query_map(params![date_str], Self::activity_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(activities)
    }

    fn total_burned(&self, date: NaiveDate) -> Result<i64> {
        let date_str = date.format(DATE_FORMAT).to_string();
        // SQL SUM errors on integer overflow, so add up in Rust.
        let mut stmt = self
            .conn
            .prepare("SELECT calories_burned FROM activities WHERE date = ?1")?;
        let burned = stmt
            .query_map(params![date_str], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(saturating_total(burned))
    }

    // --- Water ---

    fn insert_water(&mut self, amount_ml: i64, date: NaiveDate) -> Result<WaterEntry> {
        let now = Local::now().to_rfc3339();
        let date_str = date.format(DATE_FORMAT).to_string();
        self.conn.execute(
            "INSERT INTO water_log (amount_ml, date, created_at) VALUES (?1, ?2, ?3)",
            params![amount_ml, date_str, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.conn
            .query_row(
                "SELECT id, amount_ml, date, created_at FROM water_log WHERE id = ?1",
                params![id],
                Self::water_from_row,
            )
            .context("Water entry not found after insert")
    }

    fn water_for_date(&self, date: NaiveDate) -> Result<Vec<WaterEntry>> {
        let date_str = date.format(DATE_FORMAT).to_string();
        let mut stmt = self.conn.prepare(
            "SELECT id, amount_ml, date, created_at FROM water_log WHERE date = ?1 ORDER BY id",
        )?;
        let entries = stmt
            .query_map(params![date_str], Self::water_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn test_database_contract() {
        contract::run_all(|| Box::new(Database::open_in_memory().unwrap()));
    }

    #[test]
    fn test_migration_seeds_builtin_catalog() {
        let db = Database::open_in_memory().unwrap();
        let catalog = db.load_catalog().unwrap();
        assert_eq!(catalog.len(), Catalog::builtin().len());

        let apple = catalog.lookup("APPLE").unwrap();
        assert_eq!(apple.calorie_per_unit, 52.0);
        assert_eq!(apple.unit, "item");
        assert_eq!(apple.kind, UnitKind::Piece);

        // Load order follows the built-in table.
        assert_eq!(catalog.entries()[0].name, "Apple");
    }

    #[test]
    fn test_reopen_does_not_reseed_or_lose_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        {
            let mut db = Database::open(&path).unwrap();
            db.upsert_goal(date, 2100).unwrap();
            db.upsert_catalog_entries(&[FoodCatalogEntry::new(
                "Apple",
                60.0,
                "item",
                UnitKind::Piece,
            )])
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_goal(date).unwrap().unwrap().goal, 2100);
        let catalog = db.load_catalog().unwrap();
        assert_eq!(catalog.lookup("apple").unwrap().calorie_per_unit, 60.0);
    }

    #[test]
    fn test_upsert_catalog_matches_case_insensitively() {
        let mut db = Database::open_in_memory().unwrap();
        let before = db.load_catalog().unwrap().len();

        db.upsert_catalog_entries(&[
            FoodCatalogEntry::new("BANANA", 95.0, "item", UnitKind::Piece),
            FoodCatalogEntry::new("Protein Bar", 200.0, "item", UnitKind::Piece)
                .with_macros(20.0, 22.0, 7.0),
        ])
        .unwrap();

        let catalog = db.load_catalog().unwrap();
        assert_eq!(catalog.len(), before + 1);
        let banana = catalog.lookup("banana").unwrap();
        assert_eq!(banana.calorie_per_unit, 95.0);
        // The original spelling of the name is kept on update.
        assert_eq!(banana.name, "Banana");

        let bar = catalog.lookup("protein bar").unwrap();
        assert_eq!(bar.macros.unwrap().protein, 20.0);
    }

    #[test]
    fn test_food_log_keeps_macros() {
        let mut db = Database::open_in_memory().unwrap();
        let food = FoodCatalogEntry::new("Shake", 120.0, "cup", UnitKind::Volume)
            .with_macros(20.0, 5.0, 2.0);
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let logged = db
            .insert_food_log(&NewFoodLogEntry::build(&food, 2.0, date))
            .unwrap();
        assert_eq!(logged.calories, 240.0);
        assert_eq!(logged.protein, Some(40.0));
        assert_eq!(logged.carbs, Some(10.0));
        assert_eq!(logged.fat, Some(4.0));

        let fetched = db.get_food_log_entry(logged.id).unwrap().unwrap();
        assert_eq!(fetched, logged);
        assert!(db.get_food_log_entry(logged.id + 1).unwrap().is_none());
    }

    #[test]
    fn test_schema_rejects_non_positive_quantity() {
        let mut db = Database::open_in_memory().unwrap();
        let catalog = Catalog::builtin();
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let entry = NewFoodLogEntry::build(catalog.lookup("apple").unwrap(), 0.0, date);
        assert!(db.insert_food_log(&entry).is_err());
    }
}
