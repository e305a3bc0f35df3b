//! Table schema definitions for the planet catalog

use super::types::*;

// =============================================================================
// Tag Tables (shared by name across planets)
// =============================================================================

pub static CLIMATES: TableSchema = TableSchema {
    name: "climates",
    primary_key: PrimaryKey::Surrogate,
    columns: &[Column::required("name", ColumnType::Text).unique()],
    foreign_keys: &[],
};

pub static TERRAINS: TableSchema = TableSchema {
    name: "terrains",
    primary_key: PrimaryKey::Surrogate,
    columns: &[Column::required("name", ColumnType::Text).unique()],
    foreign_keys: &[],
};

// =============================================================================
// Planets
// =============================================================================

pub static PLANETS: TableSchema = TableSchema {
    name: "planets",
    primary_key: PrimaryKey::Surrogate,
    columns: &[
        Column::required("name", ColumnType::Text).unique(),
        Column::new("population", ColumnType::Integer),
    ],
    foreign_keys: &[],
};

// =============================================================================
// Association Tables
// =============================================================================

pub static PLANET_CLIMATES: TableSchema = TableSchema {
    name: "planet_climates",
    primary_key: PrimaryKey::Composite(&["planet_id", "climate_id"]),
    columns: &[
        Column::required("planet_id", ColumnType::Integer),
        Column::required("climate_id", ColumnType::Integer),
        Column::required("position", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("planet_id", "planets").cascade(),
        ForeignKey::new("climate_id", "climates").cascade(),
    ],
};

pub static PLANET_TERRAINS: TableSchema = TableSchema {
    name: "planet_terrains",
    primary_key: PrimaryKey::Composite(&["planet_id", "terrain_id"]),
    columns: &[
        Column::required("planet_id", ColumnType::Integer),
        Column::required("terrain_id", ColumnType::Integer),
        Column::required("position", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("planet_id", "planets").cascade(),
        ForeignKey::new("terrain_id", "terrains").cascade(),
    ],
};

/// All tables, parents before children
pub static ALL_TABLES: &[&TableSchema] = &[
    &CLIMATES,
    &TERRAINS,
    &PLANETS,
    &PLANET_CLIMATES,
    &PLANET_TERRAINS,
];

/// Names of all tables, in creation order
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
