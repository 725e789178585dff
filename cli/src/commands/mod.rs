mod activity;
mod catalog;
mod food;
mod goal;
mod helpers;
mod summary;
mod water;

pub(crate) use activity::{cmd_activity_list, cmd_activity_log, cmd_activity_total};
pub(crate) use catalog::{cmd_catalog_import, cmd_catalog_list};
pub(crate) use food::{cmd_add, cmd_clear, cmd_delete, cmd_list};
pub(crate) use goal::{cmd_goal_set, cmd_goal_show};
pub(crate) use summary::cmd_summary;
pub(crate) use water::{cmd_water_log, cmd_water_show};
