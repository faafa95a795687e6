//! Emission engine
//!
//! Every section turns user quantities into kg CO2e per year with the same
//! linear formula: factor × quantity × annualization multiplier. The engine
//! runs one calculator per section:
//! - Appliances: hours/day × appliance days
//! - Climate: heating and cooling hours/day × season days
//! - Lighting: fixtures × hours/day × lighting days
//! - Transport: commute legs × working days, plus business km
//! - Food: weekly portions × grams × weeks per year

mod appliances;
mod climate;
mod food;
mod lighting;
mod transport;

use crate::core::{RowEmission, Section, Subtotals, UsageState};
use crate::reference::ReferenceData;

pub use appliances::AppliancesCalculator;
pub use climate::ClimateCalculator;
pub use food::FoodCalculator;
pub use lighting::LightingCalculator;
pub use transport::TransportCalculator;

/// Non-finite inputs count as zero
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// factor × quantity × days, with every operand sanitized
pub fn compute_row(factor: f64, quantity: f64, days: f64) -> f64 {
    sanitize(factor) * sanitize(quantity) * sanitize(days)
}

/// Emission of a named catalog item, using the factor table
pub fn item_emission(data: &ReferenceData, item: &str, quantity: f64, days: f64) -> f64 {
    compute_row(data.factor_for(item), quantity, days)
}

/// One section of the footprint
pub trait SectionCalculator {
    fn section(&self) -> Section;

    /// Per-item breakdown for this section
    fn rows(&self, data: &ReferenceData, state: &UsageState) -> Vec<RowEmission>;

    fn subtotal(&self, data: &ReferenceData, state: &UsageState) -> f64 {
        self.rows(data, state).iter().map(|r| r.emission).sum()
    }
}

/// Builds a row for a catalog item whose factor comes from the factor table
pub(crate) fn catalog_row(
    data: &ReferenceData,
    section: Section,
    group: &'static str,
    item: &str,
    quantity: f64,
    multiplier: f64,
) -> RowEmission {
    let factor = data.factor_for(item);
    RowEmission {
        section,
        group,
        label: item.to_string(),
        factor,
        quantity: sanitize(quantity),
        multiplier: sanitize(multiplier),
        emission: compute_row(factor, quantity, multiplier),
    }
}

/// Runs all section calculators and aggregates their subtotals
pub struct EmissionEngine {
    calculators: Vec<Box<dyn SectionCalculator + Send + Sync>>,
}

impl EmissionEngine {
    pub fn new() -> Self {
        Self {
            calculators: vec![
                Box::new(AppliancesCalculator),
                Box::new(ClimateCalculator),
                Box::new(LightingCalculator),
                Box::new(TransportCalculator),
                Box::new(FoodCalculator),
            ],
        }
    }

    /// Recompute every subtotal from scratch
    pub fn subtotals(&self, data: &ReferenceData, state: &UsageState) -> Subtotals {
        let mut subtotals = Subtotals::default();
        for calculator in &self.calculators {
            subtotals.set(calculator.section(), calculator.subtotal(data, state));
        }
        log::debug!("Recomputed subtotals: total {:.3} kg CO2e", subtotals.total());
        subtotals
    }

    /// All rows of every section, in presentation order
    pub fn breakdown(&self, data: &ReferenceData, state: &UsageState) -> Vec<RowEmission> {
        self.calculators
            .iter()
            .flat_map(|c| c.rows(data, state))
            .collect()
    }

    /// Rows of a single section
    pub fn section_rows(
        &self,
        section: Section,
        data: &ReferenceData,
        state: &UsageState,
    ) -> Vec<RowEmission> {
        self.calculators
            .iter()
            .filter(|c| c.section() == section)
            .flat_map(|c| c.rows(data, state))
            .collect()
    }
}

impl Default for EmissionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::{AnnualizationDefaults, Catalogs, EmissionFactor, FoodItem, LightingCatalog};
    use crate::reference::ReferenceData;
    use std::collections::BTreeMap;

    pub fn reference_data() -> ReferenceData {
        let mut wattages = BTreeMap::new();
        wattages.insert("LED".to_string(), vec!["9W".to_string()]);

        ReferenceData::new(
            vec![
                EmissionFactor::new("Ventilador", 0.05),
                EmissionFactor::new("Heladera", 0.04),
                EmissionFactor::new("Estufa a gas", 0.4),
                EmissionFactor::new("Aire acondicionado", 0.5),
                EmissionFactor::new("Auto", 0.12),
                EmissionFactor::new("Avión", 0.25),
                EmissionFactor::new("LED 9W", 0.004),
                EmissionFactor::new("Pollo", 6.9),
            ],
            Catalogs {
                appliances: vec!["Ventilador".into(), "Heladera".into()],
                heating: vec!["Estufa a gas".into()],
                cooling: vec!["Aire acondicionado".into()],
                commute: vec!["Auto".into()],
                business: vec!["Avión".into()],
                lighting: LightingCatalog {
                    kinds: vec!["LED".into()],
                    wattages,
                },
            },
            AnnualizationDefaults::default(),
            BTreeMap::new(),
            vec![
                FoodItem {
                    id: "carne".into(),
                    name: "Carne vacuna".into(),
                    factor: Some(27.0),
                    portion_g: 200.0,
                },
                FoodItem {
                    id: "pollo".into(),
                    name: "Pollo".into(),
                    factor: None,
                    portion_g: 150.0,
                },
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::reference_data;
    use super::*;
    use crate::core::LampEntry;

    #[test]
    fn test_compute_row_scenario() {
        let emission = compute_row(0.05, 2.0, 351.0);
        assert!((emission - 35.1).abs() < 1e-9);
    }

    #[test]
    fn test_compute_row_is_linear() {
        let base = compute_row(0.12, 3.0, 20.0);
        assert!((compute_row(0.24, 3.0, 20.0) - 2.0 * base).abs() < 1e-9);
        assert!((compute_row(0.12, 6.0, 20.0) - 2.0 * base).abs() < 1e-9);
        assert!((compute_row(0.12, 3.0, 40.0) - 2.0 * base).abs() < 1e-9);
        for days in [0.0, 1.0, 90.0, 351.0] {
            assert_eq!(compute_row(0.12, 0.0, days), 0.0);
        }
    }

    #[test]
    fn test_non_finite_inputs_are_zero() {
        assert_eq!(compute_row(0.05, f64::NAN, 351.0), 0.0);
        assert_eq!(compute_row(f64::INFINITY, 2.0, 351.0), 0.0);
        assert_eq!(compute_row(0.05, 2.0, f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_empty_state_totals_zero() {
        let data = reference_data();
        let engine = EmissionEngine::new();
        let subtotals = engine.subtotals(&data, &UsageState::default());
        assert_eq!(subtotals.total(), 0.0);
    }

    #[test]
    fn test_total_is_sum_of_sections() {
        let data = reference_data();
        let engine = EmissionEngine::new();

        let mut state = UsageState::default();
        state.hours.appliances.insert("Ventilador".into(), 2.0);
        state.km.commute.outbound.insert("Auto".into(), 5.0);
        state.km.commute.inbound.insert("Auto".into(), 5.0);
        state.lamps.push(LampEntry::new("LED", "9W", 4.0, 5.0));

        let subtotals = engine.subtotals(&data, &state);
        assert!((subtotals.appliances - 35.1).abs() < 1e-9);
        assert!((subtotals.transport - 24.0).abs() < 1e-9);
        assert_eq!(subtotals.climate, 0.0);
        assert_eq!(subtotals.food, 0.0);

        let sum: f64 = Section::ALL.iter().map(|s| subtotals.get(*s)).sum();
        assert!((subtotals.total() - sum).abs() < 1e-9);

        let rows: f64 = engine.breakdown(&data, &state).iter().map(|r| r.emission).sum();
        assert!((rows - subtotals.total()).abs() < 1e-9);
    }

    #[test]
    fn test_section_rows_filters() {
        let data = reference_data();
        let engine = EmissionEngine::new();
        let rows = engine.section_rows(Section::Climate, &data, &UsageState::default());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.section == Section::Climate));
    }
}
