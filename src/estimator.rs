//! Footprint estimator
//!
//! Owns the reference data, the user's inputs, the derived subtotals and the
//! store. Every edit updates the inputs, recomputes all subtotals and saves
//! the inputs before returning.

use crate::core::{
    Config, DayCount, Error, FoodPref, LampEntry, Result, RowEmission, Subtotals, UsageState,
};
use crate::emissions::{item_emission, sanitize, EmissionEngine, FoodCalculator, LightingCalculator};
use crate::reference::{self, DataSource, ReferenceData};
use crate::store::Store;
use serde::Serialize;

/// Number of blank fixture rows offered when the lighting list is empty
const DEFAULT_LAMP_ROWS: usize = 3;

/// Snapshot of the current footprint
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub subtotals: Subtotals,
    pub total: f64,
    pub equivalences: Vec<Equivalence>,
}

/// The total expressed in another unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equivalence {
    pub unit: String,
    pub amount: f64,
}

pub struct Estimator {
    data: ReferenceData,
    engine: EmissionEngine,
    store: Store,
    state: UsageState,
    subtotals: Subtotals,
}

impl Estimator {
    /// Build an estimator, restoring saved inputs when the store has any
    pub fn new(data: ReferenceData, store: Store) -> Self {
        let defaults = data.defaults().clone();
        let state = match store.load(&defaults) {
            Ok(Some(state)) => {
                log::info!("Restored saved usage from '{}'", store.key());
                state
            }
            Ok(None) => UsageState::from_defaults(&defaults),
            Err(e) => {
                log::warn!("Failed to read saved usage, using defaults: {}", e);
                UsageState::from_defaults(&defaults)
            }
        };

        let engine = EmissionEngine::new();
        let subtotals = engine.subtotals(&data, &state);

        Self {
            data,
            engine,
            store,
            state,
            subtotals,
        }
    }

    /// Load reference data and open the store described by `config`
    pub async fn open(config: &Config) -> Result<Self> {
        let source = DataSource::from_config(&config.data)?;
        let data = reference::load(&source).await?;

        let store = match &config.storage.path {
            Some(path) => Store::open(path)?,
            None => Store::new()?,
        }
        .with_key(&config.storage.key);

        Ok(Self::new(data, store))
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.data
    }

    pub fn state(&self) -> &UsageState {
        &self.state
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn subtotals(&self) -> Subtotals {
        self.subtotals
    }

    pub fn total(&self) -> f64 {
        self.subtotals.total()
    }

    /// Per-row emissions across all sections
    pub fn breakdown(&self) -> Vec<RowEmission> {
        self.engine.breakdown(&self.data, &self.state)
    }

    pub fn summary(&self) -> Summary {
        let total = self.total();
        let equivalences = self
            .data
            .equivalences()
            .iter()
            .map(|(unit, per_kg)| Equivalence {
                unit: unit.clone(),
                amount: total * sanitize(*per_kg),
            })
            .collect();

        Summary {
            subtotals: self.subtotals,
            total,
            equivalences,
        }
    }

    // ===== Edits =====

    /// Set daily hours for an appliance; returns the row's yearly emission
    pub fn set_appliance_hours(&mut self, name: &str, hours: f64) -> Result<f64> {
        let hours = sanitize(hours);
        self.state.hours.appliances.insert(name.to_string(), hours);
        self.commit()?;
        Ok(item_emission(&self.data, name, hours, self.state.days.appliances))
    }

    pub fn set_heating_hours(&mut self, name: &str, hours: f64) -> Result<f64> {
        let hours = sanitize(hours);
        self.state.hours.heating.insert(name.to_string(), hours);
        self.commit()?;
        Ok(item_emission(&self.data, name, hours, self.state.days.heating))
    }

    pub fn set_cooling_hours(&mut self, name: &str, hours: f64) -> Result<f64> {
        let hours = sanitize(hours);
        self.state.hours.cooling.insert(name.to_string(), hours);
        self.commit()?;
        Ok(item_emission(&self.data, name, hours, self.state.days.cooling))
    }

    /// Set both commute legs for a mode, in km per trip
    pub fn set_commute(&mut self, mode: &str, outbound: f64, inbound: f64) -> Result<f64> {
        let (outbound, inbound) = (sanitize(outbound), sanitize(inbound));
        let commute = &mut self.state.km.commute;
        commute.outbound.insert(mode.to_string(), outbound);
        commute.inbound.insert(mode.to_string(), inbound);
        self.commit()?;
        Ok(item_emission(&self.data, mode, outbound + inbound, self.state.days.working))
    }

    /// Set total business travel for a mode, in km
    pub fn set_business_km(&mut self, mode: &str, km: f64) -> Result<f64> {
        let km = sanitize(km);
        self.state.km.business.insert(mode.to_string(), km);
        self.commit()?;
        Ok(item_emission(&self.data, mode, km, 1.0))
    }

    pub fn set_days(&mut self, which: DayCount, days: f64) -> Result<()> {
        self.state.days.set(which, sanitize(days));
        self.commit()
    }

    /// Append a blank fixture row; returns its index
    pub fn add_lamp(&mut self) -> Result<usize> {
        self.state.lamps.push(self.data.default_lamp());
        self.commit()?;
        Ok(self.state.lamps.len() - 1)
    }

    /// Replace a fixture row; returns its yearly emission
    pub fn update_lamp(&mut self, index: usize, lamp: LampEntry) -> Result<f64> {
        let slot = self.lamp_mut(index)?;
        *slot = LampEntry {
            qty: sanitize(lamp.qty),
            hrs: sanitize(lamp.hrs),
            ..lamp
        };
        self.commit()?;
        Ok(self.lamp_emission(index))
    }

    /// Change a fixture's type, keeping its wattage only if the new type offers it
    pub fn set_lamp_kind(&mut self, index: usize, kind: &str) -> Result<f64> {
        let wattages = self.data.wattages_for(kind).to_vec();
        let lamp = self.lamp_mut(index)?;
        if !wattages.contains(&lamp.wattage) {
            lamp.wattage = wattages.first().cloned().unwrap_or_default();
        }
        lamp.kind = kind.to_string();
        self.commit()?;
        Ok(self.lamp_emission(index))
    }

    pub fn remove_lamp(&mut self, index: usize) -> Result<LampEntry> {
        self.lamp_mut(index)?;
        let removed = self.state.lamps.remove(index);
        self.commit()?;
        Ok(removed)
    }

    /// Zero every fixture's quantity and hours, or seed blank rows if there are none
    pub fn clear_lamps(&mut self) -> Result<()> {
        if self.state.lamps.is_empty() {
            let blank = self.data.default_lamp();
            self.state.lamps = vec![blank; DEFAULT_LAMP_ROWS];
        } else {
            for lamp in &mut self.state.lamps {
                lamp.qty = 0.0;
                lamp.hrs = 0.0;
            }
        }
        self.commit()
    }

    /// Set weekly portions (and optionally grams per portion) for a food
    pub fn set_food(&mut self, id: &str, portions: f64, grams: Option<f64>) -> Result<f64> {
        let pref = FoodPref {
            portions: sanitize(portions),
            grams: grams.map(sanitize),
        };
        self.state.food_prefs.insert(id.to_string(), pref);
        self.commit()?;

        let emission = self
            .data
            .food(id)
            .map(|food| {
                FoodCalculator::row(&self.data, food, self.state.food_prefs.get(id)).emission
            })
            .unwrap_or(0.0);
        Ok(emission)
    }

    /// Forget all inputs and remove the saved snapshot
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        self.state = UsageState::from_defaults(self.data.defaults());
        self.subtotals = self.engine.subtotals(&self.data, &self.state);
        log::info!("Usage data reset");
        Ok(())
    }

    fn lamp_mut(&mut self, index: usize) -> Result<&mut LampEntry> {
        let count = self.state.lamps.len();
        self.state.lamps.get_mut(index).ok_or_else(|| {
            Error::InvalidInput(format!("No lamp at index {} ({} rows)", index, count))
        })
    }

    fn lamp_emission(&self, index: usize) -> f64 {
        self.state
            .lamps
            .get(index)
            .map(|lamp| {
                LightingCalculator::row(&self.data, lamp, self.state.days.lighting).emission
            })
            .unwrap_or(0.0)
    }

    fn commit(&mut self) -> Result<()> {
        self.subtotals = self.engine.subtotals(&self.data, &self.state);
        self.store.save(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnnualizationDefaults, Section};
    use crate::emissions::test_support::reference_data;
    use std::collections::BTreeMap;

    fn create_test_estimator() -> Estimator {
        Estimator::new(reference_data(), Store::open_in_memory().unwrap())
    }

    #[test]
    fn test_starts_from_defaults() {
        let estimator = create_test_estimator();
        assert_eq!(estimator.total(), 0.0);
        assert_eq!(estimator.state().days.appliances, 351.0);
        assert_eq!(estimator.state().days.working, 20.0);
    }

    #[test]
    fn test_edit_recomputes_and_persists() {
        let mut estimator = create_test_estimator();

        let row = estimator.set_appliance_hours("Ventilador", 2.0).unwrap();
        assert!((row - 35.1).abs() < 1e-9);
        assert!((estimator.subtotals().appliances - 35.1).abs() < 1e-9);
        assert!((estimator.total() - 35.1).abs() < 1e-9);

        let saved = estimator
            .store()
            .load(&AnnualizationDefaults::default())
            .unwrap()
            .unwrap();
        assert_eq!(&saved, estimator.state());
    }

    #[test]
    fn test_commute_scenario() {
        let mut estimator = create_test_estimator();
        let row = estimator.set_commute("Auto", 5.0, 5.0).unwrap();
        assert!((row - 24.0).abs() < 1e-9);
        assert!((estimator.subtotals().transport - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_day_change_rescales_section() {
        let mut estimator = create_test_estimator();
        estimator.set_heating_hours("Estufa a gas", 4.0).unwrap();
        let before = estimator.subtotals().climate;

        estimator.set_days(DayCount::Heating, 45.0).unwrap();
        assert!((estimator.subtotals().climate - before / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_input_is_stored_as_zero() {
        let mut estimator = create_test_estimator();
        let row = estimator.set_cooling_hours("Aire acondicionado", f64::NAN).unwrap();
        assert_eq!(row, 0.0);
        assert_eq!(estimator.state().hours.cooling["Aire acondicionado"], 0.0);
        assert_eq!(estimator.total(), 0.0);
    }

    #[test]
    fn test_lamp_lifecycle() {
        let mut estimator = create_test_estimator();

        let index = estimator.add_lamp().unwrap();
        assert_eq!(estimator.state().lamps[index], LampEntry::new("LED", "9W", 0.0, 0.0));

        let row = estimator
            .update_lamp(index, LampEntry::new("LED", "9W", 4.0, 5.0))
            .unwrap();
        assert!((row - 0.004 * 20.0 * 351.0).abs() < 1e-9);
        assert!((estimator.subtotals().lighting - row).abs() < 1e-9);

        // unknown type: no wattages, row drops to zero
        let row = estimator.set_lamp_kind(index, "Sodio").unwrap();
        assert_eq!(row, 0.0);
        assert_eq!(estimator.state().lamps[index].wattage, "");

        let row = estimator.set_lamp_kind(index, "LED").unwrap();
        assert_eq!(estimator.state().lamps[index].wattage, "9W");
        assert!(row > 0.0);

        let removed = estimator.remove_lamp(index).unwrap();
        assert_eq!(removed.kind, "LED");
        assert!(estimator.state().lamps.is_empty());
        assert_eq!(estimator.subtotals().lighting, 0.0);
    }

    #[test]
    fn test_lamp_index_out_of_range() {
        let mut estimator = create_test_estimator();
        assert!(matches!(estimator.remove_lamp(0), Err(Error::InvalidInput(_))));
        assert!(matches!(
            estimator.update_lamp(3, LampEntry::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_clear_lamps_seeds_or_zeroes() {
        let mut estimator = create_test_estimator();

        estimator.clear_lamps().unwrap();
        assert_eq!(estimator.state().lamps.len(), 3);

        estimator
            .update_lamp(1, LampEntry::new("LED", "9W", 2.0, 8.0))
            .unwrap();
        assert!(estimator.subtotals().lighting > 0.0);

        estimator.clear_lamps().unwrap();
        assert_eq!(estimator.state().lamps.len(), 3);
        assert_eq!(estimator.state().lamps[1].kind, "LED");
        assert_eq!(estimator.state().lamps[1].qty, 0.0);
        assert_eq!(estimator.subtotals().lighting, 0.0);
    }

    #[test]
    fn test_food_preference() {
        let mut estimator = create_test_estimator();
        let row = estimator.set_food("carne", 2.0, None).unwrap();
        assert!((row - 27.0 * 0.4 * 52.0).abs() < 1e-9);
        assert!((estimator.subtotals().food - row).abs() < 1e-9);

        assert_eq!(estimator.set_food("tofu", 3.0, Some(100.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut estimator = create_test_estimator();
        estimator.set_appliance_hours("Ventilador", 2.0).unwrap();
        estimator.set_commute("Auto", 5.0, 5.0).unwrap();
        estimator.set_days(DayCount::Working, 25.0).unwrap();
        estimator.add_lamp().unwrap();
        estimator.set_food("carne", 1.0, None).unwrap();
        assert!(estimator.total() > 0.0);

        estimator.reset().unwrap();

        for section in Section::ALL {
            assert_eq!(estimator.subtotals().get(section), 0.0);
        }
        assert_eq!(estimator.total(), 0.0);
        assert_eq!(estimator.state().days.working, 20.0);
        assert!(estimator.state().lamps.is_empty());
        assert_eq!(
            estimator.store().load(&AnnualizationDefaults::default()).unwrap(),
            None
        );
    }

    #[test]
    fn test_restores_saved_state() {
        let store = Store::open_in_memory().unwrap();
        let mut state = UsageState::default();
        state.hours.appliances.insert("Ventilador".into(), 2.0);
        store.save(&state).unwrap();

        let estimator = Estimator::new(reference_data(), store);
        assert_eq!(estimator.state(), &state);
        assert!((estimator.total() - 35.1).abs() < 1e-9);
    }

    #[test]
    fn test_summary_equivalences() {
        let mut equivalences = BTreeMap::new();
        equivalences.insert("km en auto".to_string(), 8.0);
        let base = reference_data();
        let data = ReferenceData::new(
            base.factors().to_vec(),
            base.catalogs().clone(),
            base.defaults().clone(),
            equivalences,
            base.foods().to_vec(),
        );

        let mut estimator = Estimator::new(data, Store::open_in_memory().unwrap());
        estimator.set_commute("Auto", 5.0, 5.0).unwrap();

        let summary = estimator.summary();
        assert!((summary.total - 24.0).abs() < 1e-9);
        assert_eq!(summary.equivalences.len(), 1);
        assert_eq!(summary.equivalences[0].unit, "km en auto");
        assert!((summary.equivalences[0].amount - 192.0).abs() < 1e-9);
    }
}
