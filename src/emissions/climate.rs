//! Heating and cooling, each over its own season length

use super::{catalog_row, SectionCalculator};
use crate::core::{RowEmission, Section, UsageState};
use crate::reference::ReferenceData;

pub struct ClimateCalculator;

impl SectionCalculator for ClimateCalculator {
    fn section(&self) -> Section {
        Section::Climate
    }

    fn rows(&self, data: &ReferenceData, state: &UsageState) -> Vec<RowEmission> {
        let catalogs = data.catalogs();

        let heating = catalogs.heating.iter().map(|name| {
            let hours = state.hours.heating.get(name).copied().unwrap_or(0.0);
            catalog_row(data, Section::Climate, "heating", name, hours, state.days.heating)
        });
        let cooling = catalogs.cooling.iter().map(|name| {
            let hours = state.hours.cooling.get(name).copied().unwrap_or(0.0);
            catalog_row(data, Section::Climate, "cooling", name, hours, state.days.cooling)
        });

        heating.chain(cooling).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emissions::test_support::reference_data;

    #[test]
    fn test_heating_and_cooling_use_own_days() {
        let data = reference_data();
        let mut state = UsageState::default();
        state.hours.heating.insert("Estufa a gas".into(), 4.0);
        state.hours.cooling.insert("Aire acondicionado".into(), 3.0);
        state.days.heating = 100.0;
        state.days.cooling = 60.0;

        let rows = ClimateCalculator.rows(&data, &state);
        assert_eq!(rows[0].group, "heating");
        assert!((rows[0].emission - 0.4 * 4.0 * 100.0).abs() < 1e-9);
        assert_eq!(rows[1].group, "cooling");
        assert!((rows[1].emission - 0.5 * 3.0 * 60.0).abs() < 1e-9);

        let subtotal = ClimateCalculator.subtotal(&data, &state);
        assert!((subtotal - (160.0 + 90.0)).abs() < 1e-9);
    }

    #[test]
    fn test_same_name_in_wrong_season_is_ignored() {
        let data = reference_data();
        let mut state = UsageState::default();
        state.hours.cooling.insert("Estufa a gas".into(), 4.0);

        assert_eq!(ClimateCalculator.subtotal(&data, &state), 0.0);
    }
}
