use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{Planet, TagKind};
use crate::schema::{TableSchema, ALL_TABLES, PLANETS};

/// How long a writer waits on another connection's lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed persistence for planets and their tags
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file and make sure all tables exist
    pub fn open(db_path: &Path) -> CatalogResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, used by tests
    pub fn open_in_memory() -> CatalogResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> CatalogResult<Self> {
        // Foreign keys are off by default in SQLite; the link tables rely on cascades
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let store = Self { conn };
        store.create_tables(ALL_TABLES)?;
        Ok(store)
    }

    /// Create the given tables and their indexes if they do not exist yet
    pub fn create_tables(&self, schemas: &[&TableSchema]) -> CatalogResult<()> {
        for schema in schemas {
            debug!(table = schema.name, "ensuring table");
            self.conn.execute(&generate_create_table(schema), [])?;

            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, [])?;
            }
        }

        Ok(())
    }

    /// Start a write transaction that takes the database write lock up front
    pub fn write(&mut self) -> CatalogResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    /// All planets ordered by name
    pub fn list_planets(&self) -> CatalogResult<Vec<Planet>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT id, name, population FROM {} ORDER BY name ASC",
            PLANETS.name
        ))?;
        let rows = stmt
            .query_map([], planet_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, name, population)| with_tags(&self.conn, id, name, population))
            .collect()
    }

    pub fn get_planet(&self, id: i64) -> CatalogResult<Option<Planet>> {
        load_planet(&self.conn, id)
    }

    /// Number of rows in a table
    pub fn count(&self, table: &TableSchema) -> CatalogResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// All tag names of one kind, in creation order
    pub fn tag_names(&self, kind: TagKind) -> CatalogResult<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT name FROM {} ORDER BY id",
            kind.table().name
        ))?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }
}

// =============================================================================
// Row-level operations
//
// These take a plain `&Connection` so they work both on the store's connection
// and inside a `Transaction` (which derefs to one).
// =============================================================================

fn planet_row(row: &rusqlite::Row) -> rusqlite::Result<(i64, String, Option<i64>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn with_tags(
    conn: &Connection,
    id: i64,
    name: String,
    population: Option<i64>,
) -> CatalogResult<Planet> {
    Ok(Planet {
        id,
        name,
        population: population_from_sql(population),
        climates: planet_tags(conn, id, TagKind::Climate)?,
        terrains: planet_tags(conn, id, TagKind::Terrain)?,
    })
}

fn population_to_sql(population: Option<u64>) -> CatalogResult<Option<i64>> {
    population
        .map(|p| {
            i64::try_from(p).map_err(|_| {
                CatalogError::validation("population", format!("{} is out of range", p))
            })
        })
        .transpose()
}

fn population_from_sql(population: Option<i64>) -> Option<u64> {
    population.and_then(|p| u64::try_from(p).ok())
}

pub fn load_planet(conn: &Connection, id: i64) -> CatalogResult<Option<Planet>> {
    let row = conn
        .prepare_cached(&format!(
            "SELECT id, name, population FROM {} WHERE id = ?1",
            PLANETS.name
        ))?
        .query_row(params![id], planet_row)
        .optional()?;

    row.map(|(id, name, population)| with_tags(conn, id, name, population))
        .transpose()
}

pub fn find_planet_id(conn: &Connection, name: &str) -> CatalogResult<Option<i64>> {
    let id = conn
        .prepare_cached(&format!("SELECT id FROM {} WHERE name = ?1", PLANETS.name))?
        .query_row(params![name], |row| row.get(0))
        .optional()?;
    Ok(id)
}

pub fn insert_planet(conn: &Connection, name: &str, population: Option<u64>) -> CatalogResult<i64> {
    conn.prepare_cached(&format!(
        "INSERT INTO {} (name, population) VALUES (?1, ?2)",
        PLANETS.name
    ))?
    .execute(params![name, population_to_sql(population)?])?;
    Ok(conn.last_insert_rowid())
}

pub fn update_planet(
    conn: &Connection,
    id: i64,
    name: &str,
    population: Option<u64>,
) -> CatalogResult<()> {
    conn.prepare_cached(&format!(
        "UPDATE {} SET name = ?2, population = ?3 WHERE id = ?1",
        PLANETS.name
    ))?
    .execute(params![id, name, population_to_sql(population)?])?;
    Ok(())
}

/// Delete a planet; its link rows go with it through the cascade
pub fn delete_planet(conn: &Connection, id: i64) -> CatalogResult<bool> {
    let deleted = conn
        .prepare_cached(&format!("DELETE FROM {} WHERE id = ?1", PLANETS.name))?
        .execute(params![id])?;
    Ok(deleted > 0)
}

/// Return the id of the tag with this name, creating the tag if needed
pub fn find_or_create_tag(conn: &Connection, kind: TagKind, name: &str) -> CatalogResult<i64> {
    let table = kind.table().name;
    let inserted = conn
        .prepare_cached(&format!("INSERT OR IGNORE INTO {} (name) VALUES (?1)", table))?
        .execute(params![name])?;
    if inserted > 0 {
        debug!(%kind, name, "created tag");
        return Ok(conn.last_insert_rowid());
    }

    let id = conn
        .prepare_cached(&format!("SELECT id FROM {} WHERE name = ?1", table))?
        .query_row(params![name], |row| row.get(0))?;
    Ok(id)
}

/// Remove every link of one kind from a planet. Tag rows are kept.
pub fn clear_tags(conn: &Connection, planet_id: i64, kind: TagKind) -> CatalogResult<()> {
    conn.prepare_cached(&format!(
        "DELETE FROM {} WHERE planet_id = ?1",
        kind.link_table().name
    ))?
    .execute(params![planet_id])?;
    Ok(())
}

/// Link a tag to a planet; linking an already linked tag is a no-op
pub fn attach_tag(
    conn: &Connection,
    planet_id: i64,
    kind: TagKind,
    tag_id: i64,
    position: i64,
) -> CatalogResult<()> {
    conn.prepare_cached(&format!(
        "INSERT OR IGNORE INTO {} (planet_id, {}, position) VALUES (?1, ?2, ?3)",
        kind.link_table().name,
        kind.link_column()
    ))?
    .execute(params![planet_id, tag_id, position])?;
    Ok(())
}

/// Tag names linked to a planet, in the order they were attached
pub fn planet_tags(conn: &Connection, planet_id: i64, kind: TagKind) -> CatalogResult<Vec<String>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT t.name FROM {link} l JOIN {tags} t ON t.id = l.{column}
         WHERE l.planet_id = ?1 ORDER BY l.position",
        link = kind.link_table().name,
        tags = kind.table().name,
        column = kind.link_column()
    ))?;
    let names = stmt
        .query_map(params![planet_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}
