//! Household appliances: hours per day over the appliance day count

use super::{catalog_row, SectionCalculator};
use crate::core::{RowEmission, Section, UsageState};
use crate::reference::ReferenceData;

pub struct AppliancesCalculator;

impl SectionCalculator for AppliancesCalculator {
    fn section(&self) -> Section {
        Section::Appliances
    }

    fn rows(&self, data: &ReferenceData, state: &UsageState) -> Vec<RowEmission> {
        data.catalogs()
            .appliances
            .iter()
            .map(|name| {
                let hours = state.hours.appliances.get(name).copied().unwrap_or(0.0);
                catalog_row(
                    data,
                    Section::Appliances,
                    "appliances",
                    name,
                    hours,
                    state.days.appliances,
                )
            })
            .collect()
    }
}
