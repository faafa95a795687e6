//! Lighting fixtures
//!
//! Rows come from the user's fixture list rather than a catalog. The factor
//! is looked up under the composed key "<type> <wattage>".

use super::{compute_row, sanitize, SectionCalculator};
use crate::core::{LampEntry, RowEmission, Section, UsageState};
use crate::reference::ReferenceData;

pub struct LightingCalculator;

impl LightingCalculator {
    /// Emission of one fixture over `days` per year
    pub fn row(data: &ReferenceData, lamp: &LampEntry, days: f64) -> RowEmission {
        let factor = data.factor_for_lamp(&lamp.kind, &lamp.wattage);
        let quantity = sanitize(lamp.qty) * sanitize(lamp.hrs);
        RowEmission {
            section: Section::Lighting,
            group: "lighting",
            label: format!("{} {}", lamp.kind, lamp.wattage).trim().to_string(),
            factor,
            quantity,
            multiplier: sanitize(days),
            emission: compute_row(factor, quantity, days),
        }
    }
}

impl SectionCalculator for LightingCalculator {
    fn section(&self) -> Section {
        Section::Lighting
    }

    fn rows(&self, data: &ReferenceData, state: &UsageState) -> Vec<RowEmission> {
        state
            .lamps
            .iter()
            .map(|lamp| Self::row(data, lamp, state.days.lighting))
            .collect()
    }
}
