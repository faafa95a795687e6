//! Local storage for user inputs
//!
//! A flat key-value table in SQLite. The usage state lives as a single JSON
//! blob under one fixed key; subtotals are never stored, only their inputs.

use crate::core::{
    lenient_field, lenient_opt_f64, AnnualizationDefaults, DayCounts, Distances, Error, FoodPref,
    LampEntry, Result, UsageHours, UsageState,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key the usage snapshot is stored under
pub const STORAGE_KEY: &str = "hc.mobile.full";

/// Key-value store manager
pub struct Store {
    conn: Connection,
    key: String,
}

/// Persisted form of [`UsageState`]
///
/// Every field is optional on its own; a field with the wrong shape is
/// treated as absent instead of discarding the whole snapshot.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default, deserialize_with = "lenient_field")]
    horas: Option<UsageHours>,
    #[serde(default, deserialize_with = "lenient_field")]
    km: Option<Distances>,
    #[serde(default, deserialize_with = "lenient_field")]
    ilum: Option<Vec<LampEntry>>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    dias_artefactos: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    dias_invierno: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    dias_verano: Option<f64>,
    #[serde(rename = "diasLaboralesT", default, deserialize_with = "lenient_opt_f64")]
    dias_laborales: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    dias_iluminacion: Option<f64>,
    #[serde(default, deserialize_with = "lenient_field")]
    food_prefs: Option<BTreeMap<String, FoodPref>>,
}

impl Snapshot {
    fn from_state(state: &UsageState) -> Self {
        Self {
            horas: Some(state.hours.clone()),
            km: Some(state.km.clone()),
            ilum: Some(state.lamps.clone()),
            dias_artefactos: Some(state.days.appliances),
            dias_invierno: Some(state.days.heating),
            dias_verano: Some(state.days.cooling),
            dias_laborales: Some(state.days.working),
            dias_iluminacion: Some(state.days.lighting),
            food_prefs: Some(state.food_prefs.clone()),
        }
    }

    /// Merge over the defaults; absent fields keep their default value
    fn into_state(self, defaults: &AnnualizationDefaults) -> UsageState {
        let base = DayCounts::from_defaults(defaults);
        UsageState {
            hours: self.horas.unwrap_or_default(),
            km: self.km.unwrap_or_default(),
            lamps: self.ilum.unwrap_or_default(),
            days: DayCounts {
                appliances: self.dias_artefactos.unwrap_or(base.appliances),
                heating: self.dias_invierno.unwrap_or(base.heating),
                cooling: self.dias_verano.unwrap_or(base.cooling),
                working: self.dias_laborales.unwrap_or(base.working),
                lighting: self.dias_iluminacion.unwrap_or(base.lighting),
            },
            food_prefs: self.food_prefs.unwrap_or_default(),
        }
    }
}

impl Store {
    /// Open the store at the default location
    pub fn new() -> Result<Self> {
        let path = Self::db_path()?;
        Self::open(&path)
    }

    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Volatile store, used by the demo and tests
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn,
            key: STORAGE_KEY.to_string(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Store the snapshot under a different key
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the database file path
    fn db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))?;

        let app_dir = data_dir.join("carbon-footprint");
        std::fs::create_dir_all(&app_dir)?;

        Ok(app_dir.join("storage.db"))
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    // ===== Key-value access =====

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            r#"INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3"#,
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Remove a key; returns whether it existed
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    /// Unix timestamp of the last write to `key`
    pub fn updated_at(&self, key: &str) -> Result<Option<i64>> {
        let ts = self
            .conn
            .query_row(
                "SELECT updated_at FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ts)
    }

    // ===== Usage snapshot =====

    /// Persist the user inputs
    pub fn save(&self, state: &UsageState) -> Result<()> {
        let json = serde_json::to_string(&Snapshot::from_state(state))
            .map_err(|e| Error::Serialization(e.to_string()))?;
        self.set_item(&self.key, &json)
    }

    /// Restore the user inputs merged over `defaults`
    ///
    /// Returns `None` when nothing is stored or the stored blob cannot be
    /// parsed; a malformed snapshot is discarded, not reported.
    pub fn load(&self, defaults: &AnnualizationDefaults) -> Result<Option<UsageState>> {
        let Some(raw) = self.get_item(&self.key)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => Ok(Some(snapshot.into_state(defaults))),
            Err(e) => {
                log::warn!("Ignoring malformed snapshot under '{}': {}", self.key, e);
                Ok(None)
            }
        }
    }

    /// Drop the persisted snapshot
    pub fn clear(&self) -> Result<()> {
        self.remove_item(&self.key)?;
        Ok(())
    }
}
