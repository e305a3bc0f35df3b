use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::normalize::RawPlanet;
use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_ENDPOINT: &str = "https://swapi-graphql.netlify.app/graphql";

const PLANETS_QUERY: &str = r#"
query Query {
    allPlanets {
        planets {
            name
            population
            terrains
            climates
        }
    }
}
"#;

/// Anything that can hand over a batch of raw planets
pub trait PlanetSource {
    fn fetch_planets(&self) -> CatalogResult<Vec<RawPlanet>>;
}

/// Client for the SWAPI GraphQL endpoint
pub struct SwapiClient {
    client: Client,
    endpoint: String,
}

impl SwapiClient {
    pub fn new(endpoint: impl Into<String>) -> CatalogResult<Self> {
        let client = Client::builder()
            .user_agent("planet-catalog")
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PlanetSource for SwapiClient {
    /// Post the planets query once. No retries.
    fn fetch_planets(&self) -> CatalogResult<Vec<RawPlanet>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": PLANETS_QUERY }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Fetch(format!(
                "{} responded with {}",
                self.endpoint, status
            )));
        }

        let text = response.text()?;
        parse_planets_response(&text)
    }
}

/// Extract `data.allPlanets.planets` from a GraphQL response body.
///
/// A missing or null level anywhere on that path yields an empty list. Any
/// other unexpected shape is a `MalformedResponse`.
pub fn parse_planets_response(body: &str) -> CatalogResult<Vec<RawPlanet>> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| CatalogError::MalformedResponse(format!("body is not JSON: {}", e)))?;

    if let Some(errors) = json.get("errors") {
        warn!("Upstream reported errors: {}", errors);
    }

    let planets = descend(Some(&json), "data")
        .and_then(|data| descend(data, "allPlanets"))
        .and_then(|all| descend(all, "planets"))?;

    match planets {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                RawPlanet::deserialize(item).map_err(|e| {
                    CatalogError::MalformedResponse(format!("planet #{}: {}", idx, e))
                })
            })
            .collect(),
        Some(other) => Err(CatalogError::MalformedResponse(format!(
            "expected a list of planets, got {}",
            other
        ))),
    }
}

/// Step into `key` of an object. Absent or null values give `None`.
fn descend<'a>(value: Option<&'a Value>, key: &str) -> CatalogResult<Option<&'a Value>> {
    match value {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(map.get(key).filter(|v| !v.is_null())),
        Some(other) => Err(CatalogError::MalformedResponse(format!(
            "expected an object around '{}', got {}",
            key, other
        ))),
    }
}
