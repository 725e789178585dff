use std::path::Path;
use std::process;

use anyhow::{Context, Result};

use tally_core::catalog::Catalog;
use tally_core::catalog_import::{import_catalog, parse_catalog_csv};
use tally_core::db::Database;

use super::helpers::print_catalog_table;

pub(crate) fn cmd_catalog_list(catalog: &Catalog, search: Option<&str>, json: bool) -> Result<()> {
    let foods = catalog.search(search.unwrap_or_default());

    if foods.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No foods found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        print_catalog_table(&foods);
    }

    Ok(())
}

pub(crate) fn cmd_catalog_import(
    db: &mut Database,
    path: &Path,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let entries = parse_catalog_csv(file)?;

    if entries.is_empty() {
        if json {
            println!(
                "{}",
                serde_json::json!({ "error": "No rows found in CSV file" })
            );
        } else {
            eprintln!("No rows found in CSV file.");
        }
        return Ok(());
    }

    let summary = import_catalog(db, &entries, dry_run)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if dry_run {
        println!("Dry run, no changes made.\n");
        println!("  Rows parsed:     {}", summary.rows_parsed);
        println!("  Foods to add:    {}", summary.foods_added);
        println!("  Foods to update: {}", summary.foods_updated);
    } else {
        println!("Import complete.\n");
        println!("  Rows parsed:   {}", summary.rows_parsed);
        println!("  Foods added:   {}", summary.foods_added);
        println!("  Foods updated: {}", summary.foods_updated);
    }

    Ok(())
}
