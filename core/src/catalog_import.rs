use std::collections::HashSet;
use std::io::Read;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::catalog::{FoodCatalogEntry, Macros, UnitKind, validate_catalog_entry};
use crate::db::Database;

/// What a catalog import would do / did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogImportSummary {
    pub rows_parsed: usize,
    pub foods_added: usize,
    pub foods_updated: usize,
    pub dry_run: bool,
}

/// Parse catalog foods from CSV.
///
/// Expected header: `name,calorie_per_unit,unit,kind[,protein,carbs,fat]`.
/// `calorie` and `type` are accepted as aliases for `calorie_per_unit` and
/// `kind`. Macros are optional but must be given all together.
pub fn parse_catalog_csv<R: Read>(reader: R) -> Result<Vec<FoodCatalogEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();

    let col = |names: &[&str]| -> Option<usize> {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };

    let idx_name = col(&["name"]).context("Missing required column: name")?;
    let idx_cal = col(&["calorie_per_unit", "calorie"])
        .context("Missing required column: calorie_per_unit")?;
    let idx_unit = col(&["unit"]).context("Missing required column: unit")?;
    let idx_kind = col(&["kind", "type"]).context("Missing required column: kind")?;
    let idx_protein = col(&["protein"]);
    let idx_carbs = col(&["carbs"]);
    let idx_fat = col(&["fat"]);

    let mut entries = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let line = i + 2;
        let record = result.with_context(|| format!("Failed to parse CSV row {line}"))?;

        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let optional_number = |idx: Option<usize>| -> Result<Option<f64>> {
            match idx.map(field).filter(|v| !v.is_empty()) {
                None => Ok(None),
                Some(v) => v
                    .parse::<f64>()
                    .map(Some)
                    .with_context(|| format!("Row {line}: invalid number '{v}'")),
            }
        };

        let name = field(idx_name);
        if name.is_empty() && record.iter().all(str::is_empty) {
            continue;
        }

        let calorie_per_unit: f64 = field(idx_cal).parse().with_context(|| {
            format!("Row {line}: invalid calorie_per_unit '{}'", field(idx_cal))
        })?;
        let kind = UnitKind::parse(field(idx_kind)).with_context(|| format!("Row {line}"))?;

        let macros = match (
            optional_number(idx_protein)?,
            optional_number(idx_carbs)?,
            optional_number(idx_fat)?,
        ) {
            (None, None, None) => None,
            (Some(protein), Some(carbs), Some(fat)) => Some(Macros {
                protein,
                carbs,
                fat,
            }),
            _ => bail!("Row {line}: protein, carbs and fat must be given together"),
        };

        let entry = FoodCatalogEntry {
            name: name.to_string(),
            calorie_per_unit,
            unit: field(idx_unit).to_string(),
            kind,
            macros,
        };
        validate_catalog_entry(&entry).with_context(|| format!("Row {line}"))?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Upsert parsed entries into the catalog. With `dry_run` nothing is written.
pub fn import_catalog(
    db: &mut Database,
    entries: &[FoodCatalogEntry],
    dry_run: bool,
) -> Result<CatalogImportSummary> {
    let existing = db.load_catalog()?;
    let mut seen = HashSet::new();
    let mut to_write = Vec::with_capacity(entries.len());
    let mut foods_added = 0;
    let mut foods_updated = 0;

    // First row per name wins, matching how the catalog resolves duplicates.
    for entry in entries {
        if !seen.insert(entry.name.trim().to_lowercase()) {
            continue;
        }
        let mut row = entry.clone();
        if let Some(current) = existing.lookup(&entry.name) {
            // Reuse the stored spelling so the upsert hits the same row even
            // where SQLite's ASCII-only NOCASE would not match.
            row.name.clone_from(&current.name);
            foods_updated += 1;
        } else {
            foods_added += 1;
        }
        to_write.push(row);
    }

    if !dry_run {
        db.upsert_catalog_entries(&to_write)?;
        tracing::info!(added = foods_added, updated = foods_updated, "catalog import applied");
    }

    Ok(CatalogImportSummary {
        rows_parsed: entries.len(),
        foods_added,
        foods_updated,
        dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
name,calorie_per_unit,unit,kind,protein,carbs,fat
Protein Bar,200,item,piece,20,22,7
Oat Milk,0.46,ml,liquid,,,
apple,55,item,piece,,,
";

    #[test]
    fn test_parse_catalog_csv() {
        let entries = parse_catalog_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "Protein Bar");
        assert_eq!(entries[0].macros.unwrap().carbs, 22.0);
        assert_eq!(entries[1].kind, UnitKind::Liquid);
        assert!(entries[1].macros.is_none());
    }

    #[test]
    fn test_parse_accepts_original_column_names() {
        let csv = "name,calorie,unit,type\nKiwi,42,item,piece\n";
        let entries = parse_catalog_csv(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].calorie_per_unit, 42.0);
    }

    #[test]
    fn test_parse_missing_column() {
        let csv = "name,unit,kind\nKiwi,item,piece\n";
        let err = parse_catalog_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("calorie_per_unit"));
    }

    #[test]
    fn test_parse_reports_row_number() {
        let csv = "name,calorie_per_unit,unit,kind\nKiwi,42,item,piece\nPlum,lots,item,piece\n";
        let err = parse_catalog_csv(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("Row 3"));
    }

    #[test]
    fn test_parse_rejects_partial_macros() {
        let csv = "name,calorie_per_unit,unit,kind,protein,carbs,fat\nBar,200,item,piece,20,,\n";
        assert!(parse_catalog_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let csv = "name,calorie_per_unit,unit,kind\nBar,200,item,bag\n";
        assert!(parse_catalog_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_import_dry_run_writes_nothing() {
        let mut db = Database::open_in_memory().unwrap();
        let before = db.load_catalog().unwrap().len();
        let entries = parse_catalog_csv(SAMPLE_CSV.as_bytes()).unwrap();

        let summary = import_catalog(&mut db, &entries, true).unwrap();
        assert_eq!(summary.rows_parsed, 3);
        assert_eq!(summary.foods_added, 2);
        assert_eq!(summary.foods_updated, 1);
        assert!(summary.dry_run);
        assert_eq!(db.load_catalog().unwrap().len(), before);
    }

    #[test]
    fn test_import_applies_upserts() {
        let mut db = Database::open_in_memory().unwrap();
        let before = db.load_catalog().unwrap().len();
        let entries = parse_catalog_csv(SAMPLE_CSV.as_bytes()).unwrap();

        let summary = import_catalog(&mut db, &entries, false).unwrap();
        assert!(!summary.dry_run);

        let catalog = db.load_catalog().unwrap();
        assert_eq!(catalog.len(), before + 2);
        assert_eq!(catalog.lookup("APPLE").unwrap().calorie_per_unit, 55.0);
        assert_eq!(catalog.lookup("oat milk").unwrap().unit, "ml");
    }

    #[test]
    fn test_import_repeated_name_keeps_first_row() {
        let mut db = Database::open_in_memory().unwrap();
        let csv = "name,calorie_per_unit,unit,kind\nDragonfruit,60,item,piece\nDRAGONFRUIT,999,item,piece\n";
        let entries = parse_catalog_csv(csv.as_bytes()).unwrap();

        let summary = import_catalog(&mut db, &entries, false).unwrap();
        assert_eq!(summary.rows_parsed, 2);
        assert_eq!(summary.foods_added, 1);
        assert_eq!(summary.foods_updated, 0);

        let catalog = db.load_catalog().unwrap();
        let fruit = catalog.lookup("dragonfruit").unwrap();
        assert_eq!(fruit.name, "Dragonfruit");
        assert_eq!(fruit.calorie_per_unit, 60.0);
    }

    #[test]
    fn test_import_non_ascii_case_updates_existing_row() {
        let mut db = Database::open_in_memory().unwrap();
        let first = "name,calorie_per_unit,unit,kind\nCrème Brûlée,300,item,piece\n";
        import_catalog(&mut db, &parse_catalog_csv(first.as_bytes()).unwrap(), false).unwrap();
        let before = db.load_catalog().unwrap().len();

        let second = "name,calorie_per_unit,unit,kind\nCRÈME BRÛLÉE,320,item,piece\n";
        let summary =
            import_catalog(&mut db, &parse_catalog_csv(second.as_bytes()).unwrap(), false).unwrap();
        assert_eq!(summary.foods_updated, 1);
        assert_eq!(summary.foods_added, 0);

        let catalog = db.load_catalog().unwrap();
        assert_eq!(catalog.len(), before);
        let dessert = catalog.lookup("crème brûlée").unwrap();
        assert_eq!(dessert.name, "Crème Brûlée");
        assert_eq!(dessert.calorie_per_unit, 320.0);
    }
}
