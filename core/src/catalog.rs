use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// How a food is portioned. Drives the display unit a client offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Piece,
    Weight,
    Volume,
    Liquid,
}

pub const UNIT_KINDS: &[&str] = &["piece", "weight", "volume", "liquid"];

impl UnitKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Piece => "piece",
            Self::Weight => "weight",
            Self::Volume => "volume",
            Self::Liquid => "liquid",
        }
    }

    pub fn parse(kind: &str) -> Result<Self> {
        match kind.trim().to_lowercase().as_str() {
            "piece" => Ok(Self::Piece),
            "weight" => Ok(Self::Weight),
            "volume" => Ok(Self::Volume),
            "liquid" => Ok(Self::Liquid),
            _ => bail!(
                "Invalid unit kind '{kind}'. Must be one of: {}",
                UNIT_KINDS.join(", ")
            ),
        }
    }
}

/// Macronutrients in grams per catalog unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCatalogEntry {
    pub name: String,
    pub calorie_per_unit: f64,
    pub unit: String,
    pub kind: UnitKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub macros: Option<Macros>,
}

impl FoodCatalogEntry {
    #[must_use]
    pub fn new(name: &str, calorie_per_unit: f64, unit: &str, kind: UnitKind) -> Self {
        Self {
            name: name.to_string(),
            calorie_per_unit,
            unit: unit.to_string(),
            kind,
            macros: None,
        }
    }

    #[must_use]
    pub fn with_macros(mut self, protein: f64, carbs: f64, fat: f64) -> Self {
        self.macros = Some(Macros {
            protein,
            carbs,
            fat,
        });
        self
    }
}

pub fn validate_catalog_entry(entry: &FoodCatalogEntry) -> Result<()> {
    if entry.name.trim().is_empty() {
        bail!("Catalog food name must not be empty");
    }
    if !entry.calorie_per_unit.is_finite() || entry.calorie_per_unit < 0.0 {
        bail!(
            "calorie_per_unit for '{}' must be a non-negative number",
            entry.name
        );
    }
    if entry.unit.trim().is_empty() {
        bail!("Unit for '{}' must not be empty", entry.name);
    }
    if let Some(m) = entry.macros {
        if [m.protein, m.carbs, m.fat]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            bail!("Macros for '{}' must be non-negative numbers", entry.name);
        }
    }
    Ok(())
}

/// Reference table of known foods, keyed case-insensitively by name.
///
/// The catalog is read-only once built. When two entries share a name
/// (ignoring case), lookups resolve to the one that came first.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<FoodCatalogEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    #[must_use]
    pub fn new(entries: Vec<FoodCatalogEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            index.entry(normalize(&entry.name)).or_insert(i);
        }
        Self { entries, index }
    }

    /// The built-in reference foods.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_entries())
    }

    /// Exact, case-insensitive match on the trimmed input.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&FoodCatalogEntry> {
        self.index.get(&normalize(name)).map(|&i| &self.entries[i])
    }

    /// Food name to display unit, sorted by name.
    #[must_use]
    pub fn suggestions(&self) -> BTreeMap<String, String> {
        self.resolvable()
            .map(|e| (e.name.clone(), e.unit.clone()))
            .collect()
    }

    /// Substring filter for listings. Never used to resolve a log entry.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&FoodCatalogEntry> {
        let needle = normalize(query);
        self.resolvable()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect()
    }

    #[must_use]
    pub fn entries(&self) -> &[FoodCatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // Entries a lookup can actually reach, in load order.
    fn resolvable(&self) -> impl Iterator<Item = &FoodCatalogEntry> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, e)| self.index.get(&normalize(&e.name)) == Some(i))
            .map(|(_, e)| e)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[must_use]
pub fn builtin_entries() -> Vec<FoodCatalogEntry> {
    BUILTIN_FOODS
        .iter()
        .map(|&(name, calories, unit, kind)| FoodCatalogEntry::new(name, calories, unit, kind))
        .collect()
}

// Weight entries are per gram and liquid entries per millilitre.
#[rustfmt::skip]
const BUILTIN_FOODS: &[(&str, f64, &str, UnitKind)] = &[
    // Fruits
    ("Apple", 52.0, "item", UnitKind::Piece),
    ("Banana", 89.0, "item", UnitKind::Piece),
    ("Orange", 62.0, "item", UnitKind::Piece),
    ("Grapes", 62.0, "cup", UnitKind::Volume),
    ("Strawberry", 4.0, "item", UnitKind::Piece),
    ("Blueberry", 1.0, "item", UnitKind::Piece),
    ("Raspberry", 1.0, "item", UnitKind::Piece),
    ("Watermelon", 30.0, "wedge", UnitKind::Piece),
    ("Cantaloupe", 53.0, "cup", UnitKind::Volume),
    ("Pineapple", 50.0, "slice", UnitKind::Piece),
    ("Mango", 150.0, "item", UnitKind::Piece),
    ("Peach", 59.0, "item", UnitKind::Piece),
    ("Pear", 100.0, "item", UnitKind::Piece),
    ("Avocado", 240.0, "item", UnitKind::Piece),
    ("Lemon", 17.0, "item", UnitKind::Piece),
    ("Kiwi", 42.0, "item", UnitKind::Piece),
    ("Cherry", 4.0, "item", UnitKind::Piece),
    ("Plum", 30.0, "item", UnitKind::Piece),
    ("Date (dried)", 23.0, "item", UnitKind::Piece),
    ("Fig (fresh)", 30.0, "item", UnitKind::Piece),
    // Vegetables
    ("Broccoli", 0.34, "g", UnitKind::Weight),
    ("Carrot", 0.41, "g", UnitKind::Weight),
    ("Spinach", 0.23, "g", UnitKind::Weight),
    ("Tomato", 0.18, "g", UnitKind::Weight),
    ("Cucumber", 0.15, "g", UnitKind::Weight),
    ("Lettuce", 0.15, "g", UnitKind::Weight),
    ("Bell Pepper (red)", 0.31, "g", UnitKind::Weight),
    ("Onion", 0.40, "g", UnitKind::Weight),
    ("Potato (boiled)", 0.87, "g", UnitKind::Weight),
    ("Sweet Potato (boiled)", 0.86, "g", UnitKind::Weight),
    ("Corn (kernels)", 0.86, "g", UnitKind::Weight),
    ("Mushroom", 0.22, "g", UnitKind::Weight),
    ("Zucchini", 0.17, "g", UnitKind::Weight),
    ("Green Beans", 0.31, "g", UnitKind::Weight),
    ("Cauliflower", 0.25, "g", UnitKind::Weight),
    ("Cabbage", 0.25, "g", UnitKind::Weight),
    ("Garlic", 1.49, "g", UnitKind::Weight),
    ("Asparagus", 0.20, "g", UnitKind::Weight),
    ("Eggplant", 0.25, "g", UnitKind::Weight),
    ("Celery", 0.16, "g", UnitKind::Weight),
    // Grains & Legumes
    ("Rice", 1.3, "g", UnitKind::Weight),
    ("Pasta (cooked)", 1.31, "g", UnitKind::Weight),
    ("Whole Wheat Bread", 2.60, "g", UnitKind::Weight),
    ("Oatmeal (cooked)", 0.68, "g", UnitKind::Weight),
    ("Quinoa (cooked)", 1.20, "g", UnitKind::Weight),
    ("Lentils (cooked)", 1.16, "g", UnitKind::Weight),
    ("Chickpeas (cooked)", 1.64, "g", UnitKind::Weight),
    ("Black Beans (cooked)", 1.32, "g", UnitKind::Weight),
    ("Corn Tortilla", 2.18, "g", UnitKind::Weight),
    ("Popcorn (air-popped)", 3.87, "g", UnitKind::Weight),
    ("Cereal (O-shaped, plain)", 3.79, "g", UnitKind::Weight),
    // Proteins
    ("Chicken Breast (cooked, skinless)", 1.65, "g", UnitKind::Weight),
    ("Ground Beef (cooked, 85% lean)", 2.50, "g", UnitKind::Weight),
    ("Salmon (cooked)", 2.08, "g", UnitKind::Weight),
    ("Tuna (canned in water)", 1.16, "g", UnitKind::Weight),
    ("Hard-boiled Egg", 78.0, "item", UnitKind::Piece),
    ("Tofu (firm)", 0.76, "g", UnitKind::Weight),
    ("Tempeh", 1.92, "g", UnitKind::Weight),
    ("Shrimp (cooked)", 0.85, "g", UnitKind::Weight),
    ("Cod (cooked)", 0.82, "g", UnitKind::Weight),
    ("Pork Chop (lean, cooked)", 2.30, "g", UnitKind::Weight),
    ("Turkey Breast (cooked)", 1.35, "g", UnitKind::Weight),
    ("Edamame (shelled, cooked)", 1.22, "g", UnitKind::Weight),
    // Dairy & Alternatives
    ("Milk (2% fat)", 0.5, "ml", UnitKind::Liquid),
    ("Plain Greek Yogurt (0% fat)", 0.59, "g", UnitKind::Weight),
    ("Cheddar Cheese", 4.03, "g", UnitKind::Weight),
    ("Cottage Cheese (low fat)", 0.72, "g", UnitKind::Weight),
    ("Feta Cheese", 2.64, "g", UnitKind::Weight),
    ("Soy Milk (unsweetened)", 0.38, "ml", UnitKind::Liquid),
    ("Almond Milk (unsweetened)", 0.15, "ml", UnitKind::Liquid),
    ("Butter", 7.17, "g", UnitKind::Weight),
    ("Cream Cheese", 3.42, "g", UnitKind::Weight),
    // Nuts & Seeds
    ("Almonds", 5.79, "g", UnitKind::Weight),
    ("Walnuts", 6.54, "g", UnitKind::Weight),
    ("Peanuts", 5.67, "g", UnitKind::Weight),
    ("Cashews", 5.53, "g", UnitKind::Weight),
    ("Chia Seeds", 4.86, "g", UnitKind::Weight),
    ("Flax Seeds", 5.34, "g", UnitKind::Weight),
    ("Pumpkin Seeds", 5.59, "g", UnitKind::Weight),
    ("Sunflower Seeds", 5.84, "g", UnitKind::Weight),
    ("Peanut Butter", 5.88, "g", UnitKind::Weight),
    // Fats & Oils
    ("Olive Oil", 8.84, "g", UnitKind::Weight),
    ("Coconut Oil", 8.62, "g", UnitKind::Weight),
    ("Mayonnaise", 6.80, "g", UnitKind::Weight),
    // Beverages
    ("Water", 0.0, "ml", UnitKind::Liquid),
    ("Black Coffee", 0.01, "ml", UnitKind::Liquid),
    ("Green Tea", 0.0, "ml", UnitKind::Liquid),
    ("Orange Juice (fresh)", 0.45, "ml", UnitKind::Liquid),
    ("Cola (regular)", 0.42, "ml", UnitKind::Liquid),
    ("Beer (lager)", 0.43, "ml", UnitKind::Liquid),
    ("Wine (red)", 0.85, "ml", UnitKind::Liquid),
    ("Milk (whole)", 0.61, "ml", UnitKind::Liquid),
    // Snacks & Sweets
    ("Dark Chocolate (70-85% cocoa)", 5.98, "g", UnitKind::Weight),
    ("Milk Chocolate", 5.35, "g", UnitKind::Weight),
    ("Potato Chips", 5.36, "g", UnitKind::Weight),
    ("Pretzels", 3.80, "g", UnitKind::Weight),
    ("Ice Cream (vanilla)", 2.07, "g", UnitKind::Weight),
    ("Honey", 3.04, "g", UnitKind::Weight),
    ("Sugar (granulated)", 3.87, "g", UnitKind::Weight),
];
