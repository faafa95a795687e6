//! Transport: daily commute and business travel

use super::{catalog_row, sanitize, SectionCalculator};
use crate::core::{RowEmission, Section, UsageState};
use crate::reference::ReferenceData;

pub struct TransportCalculator;

impl SectionCalculator for TransportCalculator {
    fn section(&self) -> Section {
        Section::Transport
    }

    fn rows(&self, data: &ReferenceData, state: &UsageState) -> Vec<RowEmission> {
        let catalogs = data.catalogs();
        let commute_km = &state.km.commute;

        // Both legs are summed, then multiplied by working days
        let commute = catalogs.commute.iter().map(|mode| {
            let outbound = commute_km.outbound.get(mode).copied().unwrap_or(0.0);
            let inbound = commute_km.inbound.get(mode).copied().unwrap_or(0.0);
            let km = sanitize(outbound) + sanitize(inbound);
            catalog_row(data, Section::Transport, "commute", mode, km, state.days.working)
        });

        // Business distances are already yearly totals
        let business = catalogs.business.iter().map(|mode| {
            let km = state.km.business.get(mode).copied().unwrap_or(0.0);
            catalog_row(data, Section::Transport, "business", mode, km, 1.0)
        });

        commute.chain(business).collect()
    }
}
