//! Wire representation of planets for the HTTP API.
//!
//! Reads render tags as plain name lists. Writes take `climates_input` and
//! `terrains_input`; leaving one out means "no change", `[]` means "clear".

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::model::{clean_name, Planet, PlanetChanges, PlanetRecord};

/// Read representation of a planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetView {
    pub id: i64,
    pub name: String,
    pub population: Option<u64>,
    pub climates: Vec<String>,
    pub terrains: Vec<String>,
}

impl From<Planet> for PlanetView {
    fn from(planet: Planet) -> Self {
        Self {
            id: planet.id,
            name: planet.name,
            population: planet.population,
            climates: planet.climates,
            terrains: planet.terrains,
        }
    }
}

/// Write representation of a planet.
///
/// Each field is `None` when absent from the body and `Some(None)` when it was
/// an explicit `null`. Read-only and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlanetWrite {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub population: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub climates_input: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    pub terrains_input: Option<Option<Vec<String>>>,
}

/// Marks a field as present, keeping an explicit `null` as `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl PlanetWrite {
    /// Body of a create: `name` required, missing population is null
    pub fn into_record(self) -> CatalogResult<PlanetRecord> {
        Ok(PlanetRecord {
            name: required_name(self.name)?,
            population: population(self.population)?.flatten(),
            climates: tags("climates_input", self.climates_input)?,
            terrains: tags("terrains_input", self.terrains_input)?,
        })
    }

    /// Body of a full update: like a create, but omitted tag lists stay as they are
    pub fn into_replacement(self) -> CatalogResult<PlanetChanges> {
        Ok(PlanetChanges {
            name: Some(required_name(self.name)?),
            population: Some(population(self.population)?.flatten()),
            climates: tags("climates_input", self.climates_input)?,
            terrains: tags("terrains_input", self.terrains_input)?,
        })
    }

    /// Body of a partial update: everything omitted stays as it is
    pub fn into_changes(self) -> CatalogResult<PlanetChanges> {
        let name = match self.name {
            Some(name) => Some(required_name(Some(name))?),
            None => None,
        };

        Ok(PlanetChanges {
            name,
            population: population(self.population)?,
            climates: tags("climates_input", self.climates_input)?,
            terrains: tags("terrains_input", self.terrains_input)?,
        })
    }
}

fn required_name(name: Option<Option<String>>) -> CatalogResult<String> {
    match name {
        None => Err(CatalogError::validation("name", "This field is required.")),
        Some(None) => Err(CatalogError::validation("name", "This field may not be null.")),
        Some(Some(name)) => clean_name("name", &name),
    }
}

fn population(value: Option<Option<i64>>) -> CatalogResult<Option<Option<u64>>> {
    match value {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(n)) => u64::try_from(n).map(|n| Some(Some(n))).map_err(|_| {
            CatalogError::validation(
                "population",
                "Ensure this value is greater than or equal to 0.",
            )
        }),
    }
}

fn tags(field: &'static str, value: Option<Option<Vec<String>>>) -> CatalogResult<Option<Vec<String>>> {
    match value {
        None => Ok(None),
        Some(None) => Err(CatalogError::validation(field, "This field may not be null.")),
        Some(Some(names)) => names
            .iter()
            .map(|name| clean_name(field, name))
            .collect::<CatalogResult<Vec<_>>>()
            .map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> PlanetWrite {
        serde_json::from_value(body).unwrap()
    }

    fn field_of(err: CatalogError) -> &'static str {
        match err {
            CatalogError::Validation { field, .. } => field,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_null_and_empty_are_distinct() {
        let write = parse(json!({"population": null, "terrains_input": []}));
        assert_eq!(write.name, None);
        assert_eq!(write.population, Some(None));
        assert_eq!(write.climates_input, None);
        assert_eq!(write.terrains_input, Some(Some(vec![])));
    }

    #[test]
    fn test_into_record() {
        let record = parse(json!({
            "name": "  Naboo ",
            "population": 4500000000i64,
            "climates_input": ["temperate", "moist"],
            "id": 99,
            "climates": ["ignored"]
        }))
        .into_record()
        .unwrap();

        assert_eq!(record.name, "Naboo");
        assert_eq!(record.population, Some(4_500_000_000));
        assert_eq!(record.climates, Some(vec!["temperate".to_string(), "moist".to_string()]));
        assert_eq!(record.terrains, None);
    }

    #[test]
    fn test_replacement_nulls_missing_population() {
        let changes = parse(json!({"name": "Tatooine II"})).into_replacement().unwrap();
        assert_eq!(changes.name.as_deref(), Some("Tatooine II"));
        assert_eq!(changes.population, Some(None));
        assert_eq!(changes.climates, None);
    }

    #[test]
    fn test_partial_changes_leave_everything_else() {
        let changes = parse(json!({"population": 250000})).into_changes().unwrap();
        assert_eq!(
            changes,
            PlanetChanges {
                population: Some(Some(250_000)),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(field_of(parse(json!({})).into_record().unwrap_err()), "name");
        assert_eq!(field_of(parse(json!({"name": null})).into_changes().unwrap_err()), "name");
        assert_eq!(field_of(parse(json!({"name": "   "})).into_record().unwrap_err()), "name");
        assert_eq!(
            field_of(parse(json!({"name": "x".repeat(101)})).into_record().unwrap_err()),
            "name"
        );
        assert_eq!(
            field_of(parse(json!({"name": "Hoth", "population": -1})).into_record().unwrap_err()),
            "population"
        );
        assert_eq!(
            field_of(parse(json!({"climates_input": null})).into_changes().unwrap_err()),
            "climates_input"
        );
        assert_eq!(
            field_of(parse(json!({"terrains_input": [""]})).into_changes().unwrap_err()),
            "terrains_input"
        );
    }

    #[test]
    fn test_view_from_planet() {
        let view = PlanetView::from(Planet {
            id: 1,
            name: "Tatooine".to_string(),
            population: None,
            climates: vec!["arid".to_string()],
            terrains: vec!["desert".to_string()],
        });
        assert_eq!(
            serde_json::to_value(view).unwrap(),
            json!({"id": 1, "name": "Tatooine", "population": null, "climates": ["arid"], "terrains": ["desert"]})
        );
    }
}
