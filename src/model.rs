//! Domain records shared by ingestion, the reconciler and the HTTP codec

use crate::error::{CatalogError, CatalogResult};
use crate::schema::{TableSchema, CLIMATES, PLANET_CLIMATES, PLANET_TERRAINS, TERRAINS};

/// Longest accepted planet or tag name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Trim a planet or tag name and check it is non-blank and short enough
pub fn clean_name(field: &'static str, raw: &str) -> CatalogResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CatalogError::validation(field, "This field may not be blank."));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CatalogError::validation(
            field,
            format!("Ensure this field has no more than {} characters.", MAX_NAME_LEN),
        ));
    }
    Ok(name.to_string())
}

/// A stored planet with its tags in association order
#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    pub id: i64,
    pub name: String,
    pub population: Option<u64>,
    pub climates: Vec<String>,
    pub terrains: Vec<String>,
}

/// The two kinds of shared tag a planet can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Climate,
    Terrain,
}

impl TagKind {
    /// Table holding the tag rows
    pub fn table(self) -> &'static TableSchema {
        match self {
            TagKind::Climate => &CLIMATES,
            TagKind::Terrain => &TERRAINS,
        }
    }

    /// Table linking planets to tags of this kind
    pub fn link_table(self) -> &'static TableSchema {
        match self {
            TagKind::Climate => &PLANET_CLIMATES,
            TagKind::Terrain => &PLANET_TERRAINS,
        }
    }

    /// Column in the link table pointing at the tag
    pub fn link_column(self) -> &'static str {
        match self {
            TagKind::Climate => "climate_id",
            TagKind::Terrain => "terrain_id",
        }
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagKind::Climate => write!(f, "climate"),
            TagKind::Terrain => write!(f, "terrain"),
        }
    }
}

/// A planet in the shape the reconciler consumes.
///
/// `None` tag lists leave existing associations alone; `Some(vec![])` clears them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanetRecord {
    pub name: String,
    pub population: Option<u64>,
    pub climates: Option<Vec<String>>,
    pub terrains: Option<Vec<String>>,
}

/// Changes applied to an existing planet by id. Every `None` means "leave as is".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanetChanges {
    pub name: Option<String>,
    pub population: Option<Option<u64>>,
    pub climates: Option<Vec<String>>,
    pub terrains: Option<Vec<String>>,
}
