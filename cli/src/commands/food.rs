use anyhow::Result;
use std::process;

use tally_core::service::Tracker;

use super::helpers::{parse_date, print_food_log_table};

pub(crate) fn cmd_add(
    tracker: &mut Tracker,
    food: &str,
    quantity: f64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let (entry, message) = tracker.add_food(food, quantity, Some(date))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "message": message,
                "calories": entry.calories,
                "entry": entry,
            }))?
        );
    } else {
        let cal = entry.calories;
        println!("{message} ({cal:.0} kcal)");
    }

    Ok(())
}

pub(crate) fn cmd_list(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = date.map(|d| parse_date(Some(d))).transpose()?;
    let entries = tracker.list_foods(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        match date {
            Some(d) => eprintln!("No foods logged for {d}"),
            None => eprintln!("No foods logged yet"),
        }
        process::exit(2);
    }

    print_food_log_table(&entries);
    let total: f64 = entries.iter().map(|e| e.calories).sum();
    println!("  TOTAL: {total:.0} kcal");

    Ok(())
}

pub(crate) fn cmd_delete(tracker: &mut Tracker, id: i64, json: bool) -> Result<()> {
    tracker.delete_food(id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Food with ID {id} deleted.");
    }
    Ok(())
}

pub(crate) fn cmd_clear(tracker: &mut Tracker, json: bool) -> Result<()> {
    let deleted = tracker.clear_foods()?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "message": "All foods cleared!", "deleted": deleted })
        );
    } else {
        println!("All foods cleared! ({deleted} removed)");
    }
    Ok(())
}
