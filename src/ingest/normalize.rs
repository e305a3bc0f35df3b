use serde::Deserialize;
use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{clean_name, PlanetRecord};

/// Upstream token for a population nobody knows
pub const UNKNOWN_POPULATION: &str = "unknown";

/// Largest population SQLite can store in an INTEGER column
pub const MAX_POPULATION: u64 = i64::MAX as u64;

/// A planet exactly as SWAPI returns it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPlanet {
    pub name: String,
    #[serde(default)]
    pub population: Option<Value>,
    #[serde(default)]
    pub terrains: Option<Vec<String>>,
    #[serde(default)]
    pub climates: Option<Vec<String>>,
}

/// Convert a raw SWAPI planet into a record the reconciler can upsert.
///
/// Missing tag lists become empty lists, so ingestion always replaces a
/// planet's tags with what upstream reports. Names follow the same rules as
/// the HTTP API; a name that breaks them is a malformed response.
pub fn normalize(raw: RawPlanet) -> CatalogResult<PlanetRecord> {
    let population = parse_population(&raw.name, raw.population.as_ref())?;

    let malformed = |err: CatalogError| {
        CatalogError::MalformedResponse(format!("planet {:?}: {}", raw.name, err))
    };
    let name = clean_name("name", &raw.name).map_err(malformed)?;
    let climates = clean_names("climates", raw.climates.as_deref()).map_err(malformed)?;
    let terrains = clean_names("terrains", raw.terrains.as_deref()).map_err(malformed)?;

    Ok(PlanetRecord {
        name,
        population,
        climates: Some(climates),
        terrains: Some(terrains),
    })
}

fn clean_names(field: &'static str, names: Option<&[String]>) -> CatalogResult<Vec<String>> {
    names
        .unwrap_or_default()
        .iter()
        .map(|name| clean_name(field, name))
        .collect()
}

/// Parse an upstream population value.
///
/// Null, absent and `"unknown"` all mean "no value". Anything that is not a
/// non-negative integer up to `MAX_POPULATION` (or a string holding one) is
/// rejected.
pub fn parse_population(planet: &str, value: Option<&Value>) -> CatalogResult<Option<u64>> {
    let invalid = || CatalogError::InvalidPopulation {
        planet: planet.to_string(),
        value: value.map(Value::to_string).unwrap_or_default(),
    };

    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s == UNKNOWN_POPULATION => return Ok(None),
        Some(Value::String(s)) => s.parse::<u64>().ok(),
        Some(Value::Number(n)) => n.as_u64(),
        Some(_) => None,
    };

    parsed
        .filter(|n| *n <= MAX_POPULATION)
        .map(Some)
        .ok_or_else(invalid)
}
