//! Common types used across the application
//!
//! Reference data mirrors the JSON files it is loaded from, so the wire
//! names stay in the original Spanish (`artefactos`, `potencias`, ...).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Emission factor entry: kg CO2e per unit of activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub factor: f64,
}

impl EmissionFactor {
    pub fn new(name: &str, factor: f64) -> Self {
        Self {
            name: name.to_string(),
            factor,
        }
    }
}

/// Item catalogs per section, as found in `categories.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogs {
    /// Appliance names
    #[serde(rename = "artefactos", default)]
    pub appliances: Vec<String>,
    /// Heating devices (winter)
    #[serde(rename = "invierno", default)]
    pub heating: Vec<String>,
    /// Cooling devices (summer)
    #[serde(rename = "verano", default)]
    pub cooling: Vec<String>,
    /// Commute transport modes
    #[serde(default)]
    pub commute: Vec<String>,
    /// Business travel modes
    #[serde(default)]
    pub business: Vec<String>,
    /// Lamp types and the wattages available for each
    #[serde(rename = "iluminacion", default)]
    pub lighting: LightingCatalog,
}

/// Lamp types and wattages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightingCatalog {
    #[serde(rename = "tipos", default)]
    pub kinds: Vec<String>,
    #[serde(rename = "potencias", default, deserialize_with = "lenient_string_lists")]
    pub wattages: BTreeMap<String, Vec<String>>,
}

/// Day counts used to annualize daily quantities, from `defaults.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualizationDefaults {
    /// Working days per year (commute)
    #[serde(
        rename = "laborales",
        default = "default_working_days",
        deserialize_with = "lenient_f64"
    )]
    pub working_days: f64,
    /// Heating days per year
    #[serde(rename = "invierno", default = "default_season_days", deserialize_with = "lenient_f64")]
    pub heating_days: f64,
    /// Cooling days per year
    #[serde(rename = "verano", default = "default_season_days", deserialize_with = "lenient_f64")]
    pub cooling_days: f64,
    /// Appliance usage days per year
    #[serde(
        rename = "diasArtefactos",
        default = "default_usage_days",
        deserialize_with = "lenient_f64"
    )]
    pub appliance_days: f64,
    /// Lighting usage days per year
    #[serde(
        rename = "diasIluminacion",
        default = "default_usage_days",
        deserialize_with = "lenient_f64"
    )]
    pub lighting_days: f64,
    /// Weeks per year food portions are counted over
    #[serde(
        rename = "semanasAlimentos",
        default = "default_food_weeks",
        deserialize_with = "lenient_f64"
    )]
    pub food_weeks: f64,
}

fn default_working_days() -> f64 {
    20.0
}

fn default_season_days() -> f64 {
    90.0
}

fn default_usage_days() -> f64 {
    351.0
}

fn default_food_weeks() -> f64 {
    52.0
}

impl Default for AnnualizationDefaults {
    fn default() -> Self {
        Self {
            working_days: default_working_days(),
            heating_days: default_season_days(),
            cooling_days: default_season_days(),
            appliance_days: default_usage_days(),
            lighting_days: default_usage_days(),
            food_weeks: default_food_weeks(),
        }
    }
}

/// Food table entry, from `foods.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// kg CO2e per kg of food; falls back to the factor table by name
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    /// Default portion size in grams
    #[serde(default, deserialize_with = "lenient_f64")]
    pub portion_g: f64,
}

/// Daily hours per item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageHours {
    #[serde(rename = "artefactos", default, deserialize_with = "lenient_map")]
    pub appliances: BTreeMap<String, f64>,
    #[serde(rename = "invierno", default, deserialize_with = "lenient_map")]
    pub heating: BTreeMap<String, f64>,
    #[serde(rename = "verano", default, deserialize_with = "lenient_map")]
    pub cooling: BTreeMap<String, f64>,
}

/// Commute distance per trip leg, in km
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommuteDistances {
    #[serde(rename = "ida", default, deserialize_with = "lenient_map")]
    pub outbound: BTreeMap<String, f64>,
    #[serde(rename = "vuelta", default, deserialize_with = "lenient_map")]
    pub inbound: BTreeMap<String, f64>,
}

/// Travel distances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distances {
    #[serde(default)]
    pub commute: CommuteDistances,
    /// Total business travel per mode, in km
    #[serde(default, deserialize_with = "lenient_map")]
    pub business: BTreeMap<String, f64>,
}

/// One lighting fixture row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LampEntry {
    #[serde(rename = "tipo", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(rename = "potencia", default, deserialize_with = "lenient_string")]
    pub wattage: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub qty: f64,
    /// Hours per day
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hrs: f64,
}

impl LampEntry {
    pub fn new(kind: &str, wattage: &str, qty: f64, hrs: f64) -> Self {
        Self {
            kind: kind.to_string(),
            wattage: wattage.to_string(),
            qty,
            hrs,
        }
    }
}

/// Food consumption preference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodPref {
    /// Portions per week
    #[serde(alias = "pors", default, deserialize_with = "lenient_f64")]
    pub portions: f64,
    /// Grams per portion; None means the food's default portion
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub grams: Option<f64>,
}

/// User-overridable annualization day counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCounts {
    pub appliances: f64,
    pub heating: f64,
    pub cooling: f64,
    pub working: f64,
    pub lighting: f64,
}

impl DayCounts {
    pub fn from_defaults(defaults: &AnnualizationDefaults) -> Self {
        Self {
            appliances: defaults.appliance_days,
            heating: defaults.heating_days,
            cooling: defaults.cooling_days,
            working: defaults.working_days,
            lighting: defaults.lighting_days,
        }
    }

    pub fn get(&self, which: DayCount) -> f64 {
        match which {
            DayCount::Appliances => self.appliances,
            DayCount::Heating => self.heating,
            DayCount::Cooling => self.cooling,
            DayCount::Working => self.working,
            DayCount::Lighting => self.lighting,
        }
    }

    pub fn set(&mut self, which: DayCount, days: f64) {
        let slot = match which {
            DayCount::Appliances => &mut self.appliances,
            DayCount::Heating => &mut self.heating,
            DayCount::Cooling => &mut self.cooling,
            DayCount::Working => &mut self.working,
            DayCount::Lighting => &mut self.lighting,
        };
        *slot = days;
    }
}

impl Default for DayCounts {
    fn default() -> Self {
        Self::from_defaults(&AnnualizationDefaults::default())
    }
}

/// Which annualization count an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCount {
    Appliances,
    Heating,
    Cooling,
    Working,
    Lighting,
}

/// Everything the user has entered
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageState {
    pub hours: UsageHours,
    pub km: Distances,
    pub lamps: Vec<LampEntry>,
    pub days: DayCounts,
    pub food_prefs: BTreeMap<String, FoodPref>,
}

impl UsageState {
    /// Empty usage with day counts taken from the defaults
    pub fn from_defaults(defaults: &AnnualizationDefaults) -> Self {
        Self {
            days: DayCounts::from_defaults(defaults),
            ..Default::default()
        }
    }
}

/// Calculator sections, in the order they are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Appliances,
    Climate,
    Lighting,
    Transport,
    Food,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Appliances,
        Section::Climate,
        Section::Lighting,
        Section::Transport,
        Section::Food,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Appliances => "appliances",
            Section::Climate => "climate",
            Section::Lighting => "lighting",
            Section::Transport => "transport",
            Section::Food => "food",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-section emission subtotals in kg CO2e per year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Subtotals {
    pub appliances: f64,
    pub climate: f64,
    pub transport: f64,
    pub lighting: f64,
    pub food: f64,
}

impl Subtotals {
    pub fn get(&self, section: Section) -> f64 {
        match section {
            Section::Appliances => self.appliances,
            Section::Climate => self.climate,
            Section::Lighting => self.lighting,
            Section::Transport => self.transport,
            Section::Food => self.food,
        }
    }

    pub fn set(&mut self, section: Section, value: f64) {
        let slot = match section {
            Section::Appliances => &mut self.appliances,
            Section::Climate => &mut self.climate,
            Section::Lighting => &mut self.lighting,
            Section::Transport => &mut self.transport,
            Section::Food => &mut self.food,
        };
        *slot = value;
    }

    /// Grand total across all sections
    pub fn total(&self) -> f64 {
        self.appliances + self.climate + self.transport + self.lighting + self.food
    }
}

/// Emission of a single calculator row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowEmission {
    pub section: Section,
    /// Sub-list within the section, e.g. "heating" or "business"
    pub group: &'static str,
    pub label: String,
    pub factor: f64,
    pub quantity: f64,
    /// Annualization multiplier applied to the quantity
    pub multiplier: f64,
    pub emission: f64,
}

/// Coerce a loosely typed JSON value to a finite number, 0 otherwise
pub(crate) fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => finite_or_zero(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => parse_number(s),
        _ => 0.0,
    }
}

/// Parse user-entered text as a quantity; garbage and non-finite values are 0
pub fn parse_number(text: &str) -> f64 {
    finite_or_zero(text.trim().parse::<f64>().unwrap_or(0.0))
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

pub(crate) fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(coerce_number(&other)),
    })
}

fn lenient_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, coerce_number(&v)))
        .collect())
}

/// Optional field that falls back to `None` when its value has the wrong shape
pub(crate) fn lenient_field<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_to_string)
}

fn lenient_string_lists<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Vec<Value>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, list)| (k, list.into_iter().map(value_to_string).collect()))
        .collect())
}
