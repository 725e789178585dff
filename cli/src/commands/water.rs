use anyhow::Result;

use tally_core::service::Tracker;

use super::helpers::parse_date;

pub(crate) fn cmd_water_log(
    tracker: &mut Tracker,
    amount_ml: i64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let entry = tracker.add_water(amount_ml, Some(date))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let total = tracker.water_for_date(date)?.total_ml;
        println!("Logged {amount_ml} ml of water ({total} ml on {date})");
    }
    Ok(())
}

pub(crate) fn cmd_water_show(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let water = tracker.water_for_date(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&water)?);
    } else if water.entries.is_empty() {
        eprintln!("No water logged for {date}");
    } else {
        for e in &water.entries {
            println!("  [{}] {} ml", e.id, e.amount_ml);
        }
        println!("  TOTAL: {} ml", water.total_ml);
    }
    Ok(())
}
