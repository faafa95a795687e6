//! Reference data store
//!
//! Holds the static tables every calculator reads from:
//! - Emission factors, looked up by exact name, then by trimmed lower-case name
//! - Section catalogs
//! - Annualization defaults
//! - Unit equivalences and the food table

pub mod loader;

use crate::core::{AnnualizationDefaults, Catalogs, EmissionFactor, FoodItem, LampEntry};
use std::collections::{BTreeMap, HashMap};

pub use loader::{load, DataSource};

/// Immutable lookup tables, built once at startup
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    factors: Vec<EmissionFactor>,
    by_name: HashMap<String, f64>,
    by_normalized: HashMap<String, f64>,
    catalogs: Catalogs,
    defaults: AnnualizationDefaults,
    equivalences: BTreeMap<String, f64>,
    foods: Vec<FoodItem>,
}

impl ReferenceData {
    pub fn new(
        factors: Vec<EmissionFactor>,
        catalogs: Catalogs,
        defaults: AnnualizationDefaults,
        equivalences: BTreeMap<String, f64>,
        foods: Vec<FoodItem>,
    ) -> Self {
        let by_name = factors
            .iter()
            .map(|f| (f.name.clone(), f.factor))
            .collect();
        let by_normalized = factors
            .iter()
            .map(|f| (normalize(&f.name), f.factor))
            .collect();

        Self {
            factors,
            by_name,
            by_normalized,
            catalogs,
            defaults,
            equivalences,
            foods,
        }
    }

    /// kg CO2e per unit for `name`, 0 when unknown or empty
    pub fn factor_for(&self, name: &str) -> f64 {
        if name.is_empty() {
            return 0.0;
        }
        if let Some(f) = self.by_name.get(name) {
            return *f;
        }
        self.by_normalized
            .get(&normalize(name))
            .copied()
            .unwrap_or(0.0)
    }

    /// Factor for a lamp, keyed as "<type> <wattage>" in the factor table
    pub fn factor_for_lamp(&self, kind: &str, wattage: &str) -> f64 {
        if kind.is_empty() || wattage.is_empty() {
            return 0.0;
        }
        let key = format!("{} {}", kind, wattage);
        self.factor_for(key.trim())
    }

    pub fn factors(&self) -> &[EmissionFactor] {
        &self.factors
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn defaults(&self) -> &AnnualizationDefaults {
        &self.defaults
    }

    /// Units of each equivalence per kg CO2e
    pub fn equivalences(&self) -> &BTreeMap<String, f64> {
        &self.equivalences
    }

    pub fn foods(&self) -> &[FoodItem] {
        &self.foods
    }

    pub fn food(&self, id: &str) -> Option<&FoodItem> {
        self.foods.iter().find(|f| f.id == id)
    }

    /// Wattages offered for a lamp type, empty when the type is unknown
    pub fn wattages_for(&self, kind: &str) -> &[String] {
        self.catalogs
            .lighting
            .wattages
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Blank lamp row using the first type and its first wattage
    pub fn default_lamp(&self) -> LampEntry {
        let kind = self
            .catalogs
            .lighting
            .kinds
            .first()
            .cloned()
            .unwrap_or_default();
        let wattage = self.wattages_for(&kind).first().cloned().unwrap_or_default();
        LampEntry {
            kind,
            wattage,
            qty: 0.0,
            hrs: 0.0,
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
