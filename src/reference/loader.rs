//! Reference data loading
//!
//! The five JSON files are fetched concurrently, either from a local
//! directory or from an HTTP base URL. Any missing or malformed file fails
//! the whole load.

use super::ReferenceData;
use crate::core::{
    AnnualizationDefaults, Catalogs, DataConfig, EmissionFactor, Error, FoodItem, Result,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const FACTORS_FILE: &str = "emission_factors.json";
pub const CATALOGS_FILE: &str = "categories.json";
pub const DEFAULTS_FILE: &str = "defaults.json";
pub const EQUIVALENCES_FILE: &str = "equivalences.json";
pub const FOODS_FILE: &str = "foods.json";

/// Where the reference files live
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Directory(PathBuf),
    Http(String),
}

impl DataSource {
    pub fn from_config(config: &DataConfig) -> Result<Self> {
        match config.source.as_str() {
            "local" => Ok(Self::Directory(config.directory.clone())),
            "http" if !config.base_url.is_empty() => Ok(Self::Http(config.base_url.clone())),
            "http" => Err(Error::Config("http data source requires base_url".to_string())),
            other => Err(Error::Config(format!("Unknown data source: {}", other))),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Directory(dir) => dir.display().to_string(),
            Self::Http(base) => base.clone(),
        }
    }
}

/// Load all reference tables in parallel
pub async fn load(source: &DataSource) -> Result<ReferenceData> {
    let client = match source {
        DataSource::Http(_) => Some(reqwest::Client::new()),
        DataSource::Directory(_) => None,
    };
    let client = client.as_ref();

    let (factors, catalogs, defaults, equivalences, foods) = tokio::try_join!(
        fetch_json::<Vec<EmissionFactor>>(client, source, FACTORS_FILE),
        fetch_json::<Catalogs>(client, source, CATALOGS_FILE),
        fetch_json::<AnnualizationDefaults>(client, source, DEFAULTS_FILE),
        fetch_json::<BTreeMap<String, f64>>(client, source, EQUIVALENCES_FILE),
        fetch_json::<Vec<FoodItem>>(client, source, FOODS_FILE),
    )?;

    log::info!(
        "Loaded reference data from {}: {} factors, {} foods",
        source.describe(),
        factors.len(),
        foods.len()
    );

    Ok(ReferenceData::new(factors, catalogs, defaults, equivalences, foods))
}

async fn fetch_json<T: DeserializeOwned>(
    client: Option<&reqwest::Client>,
    source: &DataSource,
    file: &str,
) -> Result<T> {
    let body = match (source, client) {
        (DataSource::Directory(dir), _) => tokio::fs::read_to_string(dir.join(file))
            .await
            .map_err(|e| data_error(file, e))?,
        (DataSource::Http(base), Some(client)) => {
            let url = format!("{}/{}", base.trim_end_matches('/'), file);
            log::debug!("Fetching {}", url);
            client
                .get(&url)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|e| data_error(file, e))?
                .text()
                .await
                .map_err(|e| data_error(file, e))?
        }
        (DataSource::Http(_), None) => {
            return Err(data_error(file, "no HTTP client available"));
        }
    };

    serde_json::from_str(&body).map_err(|e| data_error(file, e))
}

fn data_error(file: &str, reason: impl std::fmt::Display) -> Error {
    Error::DataLoad {
        file: file.to_string(),
        reason: reason.to_string(),
    }
}
