use anyhow::Result;

use tally_core::error::TrackerError;
use tally_core::service::Tracker;

use super::helpers::parse_date;

pub(crate) fn cmd_goal_set(
    tracker: &mut Tracker,
    calories: i64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let goal = tracker.set_goal(date, calories)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goal)?);
    } else {
        let cal = goal.goal;
        println!("Calorie goal for {date}: {cal} kcal");
    }
    Ok(())
}

pub(crate) fn cmd_goal_show(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;

    match tracker.get_goal(date) {
        Ok(goal) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&goal)?);
            } else {
                let cal = goal.goal;
                println!("{date}: {cal} kcal");
            }
            Ok(())
        }
        Err(TrackerError::NotFound(msg)) if !json => {
            eprintln!("{msg}. Use `tally goal set <calories>` to set one.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
