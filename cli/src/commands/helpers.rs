use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tally_core::catalog::FoodCatalogEntry;
use tally_core::models::{Activity, DATE_FORMAT, FoodLogEntry};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, DATE_FORMAT).with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Quantities print without a trailing `.0` when whole.
pub(crate) fn format_quantity(q: f64) -> String {
    if q.fract() == 0.0 {
        format!("{q:.0}")
    } else {
        format!("{q}")
    }
}

pub(crate) fn print_food_log_table(entries: &[FoodLogEntry]) {
    #[derive(Tabled)]
    struct LogRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Food")]
        name: String,
        #[tabled(rename = "Qty")]
        quantity: String,
        #[tabled(rename = "Unit")]
        unit: String,
        #[tabled(rename = "kcal")]
        calories: String,
    }

    let rows: Vec<LogRow> = entries
        .iter()
        .map(|e| LogRow {
            id: e.id,
            date: e.date.format(DATE_FORMAT).to_string(),
            name: truncate(&e.name, 30),
            quantity: format_quantity(e.quantity),
            unit: e.unit.clone(),
            calories: format!("{:.0}", no_neg_zero(e.calories)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .with(Modify::new(Columns::new(5..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_catalog_table(foods: &[&FoodCatalogEntry]) {
    #[derive(Tabled)]
    struct CatalogRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "kcal/unit")]
        calories: String,
        #[tabled(rename = "Unit")]
        unit: String,
        #[tabled(rename = "Kind")]
        kind: &'static str,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "F")]
        fat: String,
    }

    let rows: Vec<CatalogRow> = foods
        .iter()
        .map(|f| CatalogRow {
            name: truncate(&f.name, 35),
            calories: format!("{}", f.calorie_per_unit),
            unit: f.unit.clone(),
            kind: f.kind.as_str(),
            protein: f.macros.map_or("-".into(), |m| format!("{:.1}", m.protein)),
            carbs: f.macros.map_or("-".into(), |m| format!("{:.1}", m.carbs)),
            fat: f.macros.map_or("-".into(), |m| format!("{:.1}", m.fat)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_activity_table(activities: &[Activity]) {
    #[derive(Tabled)]
    struct ActivityRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Activity")]
        name: String,
        #[tabled(rename = "Minutes")]
        duration: i64,
        #[tabled(rename = "kcal burned")]
        burned: i64,
    }

    let rows: Vec<ActivityRow> = activities
        .iter()
        .map(|a| ActivityRow {
            id: a.id,
            name: truncate(&a.activity_name, 30),
            duration: a.duration_minutes,
            burned: a.calories_burned,
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(1.5), "1.5");
        assert_eq!(format_quantity(250.0), "250");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
    }
}
