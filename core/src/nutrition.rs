use serde::Serialize;

use crate::catalog::FoodCatalogEntry;

/// Nutrition for a logged quantity of one catalog food.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Nutrition {
    pub calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

impl Nutrition {
    /// False when scaling overflowed any value.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.calories.is_finite()
            && [self.protein, self.carbs, self.fat]
                .into_iter()
                .flatten()
                .all(f64::is_finite)
    }
}

/// Scale a catalog entry's per-unit values by `quantity`.
///
/// The caller is responsible for having validated `quantity`. No rounding is
/// applied; display code formats as it sees fit.
#[must_use]
pub fn compute(entry: &FoodCatalogEntry, quantity: f64) -> Nutrition {
    Nutrition {
        calories: entry.calorie_per_unit * quantity,
        protein: entry.macros.map(|m| m.protein * quantity),
        carbs: entry.macros.map(|m| m.carbs * quantity),
        fat: entry.macros.map(|m| m.fat * quantity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, UnitKind};

    #[test]
    fn test_apple_times_three() {
        let catalog = Catalog::builtin();
        let apple = catalog.lookup("apple").unwrap();
        let n = compute(apple, 3.0);
        assert_eq!(n.calories, 156.0);
        assert_eq!(n.protein, None);
    }

    #[test]
    fn test_calories_scale_linearly() {
        let entry = FoodCatalogEntry::new("Banana", 89.0, "item", UnitKind::Piece);
        for q in [0.5, 1.0, 2.0, 7.0, 12.25] {
            assert_eq!(compute(&entry, q).calories, 89.0 * q);
        }
    }

    #[test]
    fn test_macros_scale_like_calories() {
        let entry = FoodCatalogEntry::new("Egg", 78.0, "item", UnitKind::Piece)
            .with_macros(6.0, 0.5, 5.0);
        let n = compute(&entry, 2.0);
        assert_eq!(n.calories, 156.0);
        assert_eq!(n.protein, Some(12.0));
        assert_eq!(n.carbs, Some(1.0));
        assert_eq!(n.fat, Some(10.0));
    }

    #[test]
    fn test_overflow_is_not_finite() {
        let entry = FoodCatalogEntry::new("Egg", 78.0, "item", UnitKind::Piece)
            .with_macros(6.0, 0.5, 5.0);
        assert!(compute(&entry, 2.0).is_finite());
        assert!(!compute(&entry, 1e308).is_finite());
    }

    #[test]
    fn test_per_gram_entries() {
        let catalog = Catalog::builtin();
        let rice = catalog.lookup("rice").unwrap();
        let n = compute(rice, 200.0);
        assert!((n.calories - 260.0).abs() < 1e-9);
    }
}
