//! Core module - Configuration, errors, and common types

mod config;
mod error;
mod types;

pub use config::{Config, DataConfig, DisplayConfig, GeneralConfig, StorageConfig};
pub use error::{Error, Result};
pub use types::{
    AnnualizationDefaults, Catalogs, CommuteDistances, DayCount, DayCounts, Distances,
    EmissionFactor, FoodItem, FoodPref, LampEntry, LightingCatalog, RowEmission, Section,
    Subtotals, UsageHours, UsageState, parse_number,
};
pub(crate) use types::{lenient_field, lenient_opt_f64};
