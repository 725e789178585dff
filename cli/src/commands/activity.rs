use anyhow::Result;

use tally_core::models::NewActivity;
use tally_core::service::Tracker;

use super::helpers::{parse_date, print_activity_table};

pub(crate) fn cmd_activity_log(
    tracker: &mut Tracker,
    name: &str,
    duration: i64,
    burned: i64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let activity = tracker.add_activity(&NewActivity {
        activity_name: name.to_string(),
        duration_minutes: duration,
        calories_burned: burned,
        date: parse_date(date)?,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&activity)?);
    } else {
        let name = &activity.activity_name;
        let id = activity.id;
        println!(
            "Logged {name}: {} min, {} kcal burned (id: {id})",
            activity.duration_minutes, activity.calories_burned
        );
    }
    Ok(())
}

pub(crate) fn cmd_activity_list(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let activities = tracker.activities_for_date(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&activities)?);
    } else if activities.is_empty() {
        eprintln!("No activities logged for {date}");
    } else {
        print_activity_table(&activities);
    }
    Ok(())
}

pub(crate) fn cmd_activity_total(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let total = tracker.total_burned(date)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "date": date, "total_burned": total })
        );
    } else {
        println!("{date}: {total} kcal burned");
    }
    Ok(())
}
