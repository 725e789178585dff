use anyhow::Result;

use tally_core::service::Tracker;

use super::helpers::{no_neg_zero, parse_date, print_food_log_table};

pub(crate) fn cmd_summary(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let summary = tracker.daily_summary(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== {date} ===\n");

    let foods = tracker.list_foods(Some(date))?;
    if foods.is_empty() {
        println!("  No foods logged.");
    } else {
        print_food_log_table(&foods);
    }
    println!();

    let consumed = no_neg_zero(summary.consumed_calories);
    let burned = summary.burned_calories;
    let net = no_neg_zero(summary.net_calories);
    println!("  CONSUMED: {consumed:.0} kcal");
    if summary.protein > 0.0 || summary.carbs > 0.0 || summary.fat > 0.0 {
        let (p, c, f) = (summary.protein, summary.carbs, summary.fat);
        println!("  MACROS:   P:{p:.0}g C:{c:.0}g F:{f:.0}g");
    }
    println!("  BURNED:   {burned} kcal");
    println!("  NET:      {net:.0} kcal");

    if let (Some(goal), Some(remaining)) = (summary.goal, summary.remaining) {
        let remaining = no_neg_zero(remaining);
        println!("  GOAL:     {goal} kcal");
        println!("  REMAINING: {remaining:.0} kcal");
    }

    if summary.water_ml > 0 {
        println!("  WATER:    {} ml", summary.water_ml);
    }

    Ok(())
}
