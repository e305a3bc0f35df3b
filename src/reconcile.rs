//! Idempotent planet upserts shared by ingestion and the HTTP API.
//!
//! Every public function here runs inside a single immediate transaction, so a
//! concurrent writer targeting the same planet waits instead of losing updates.
//! Tag lists follow one rule everywhere: `None` leaves the planet's links of
//! that kind untouched, `Some(list)` replaces them with `list` (in order,
//! duplicates collapsed), creating missing tags by name.

use rusqlite::Connection;
use std::collections::HashSet;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Planet, PlanetChanges, PlanetRecord, TagKind};
use crate::store::sqlite::{
    attach_tag, clear_tags, delete_planet, find_or_create_tag, find_planet_id, insert_planet,
    load_planet, update_planet,
};
use crate::store::Store;

/// Conflict policy when the planet name already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail with `Conflict` (API create)
    Create,
    /// Overwrite the existing planet (ingestion)
    Upsert,
}

/// Outcome of an upsert
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub planet: Planet,
    pub created: bool,
}

/// Create or overwrite the planet called `record.name`.
///
/// Population is always overwritten, including with `None`.
pub fn upsert(store: &mut Store, record: &PlanetRecord, mode: WriteMode) -> CatalogResult<Reconciled> {
    let tx = store.write()?;

    let (planet_id, created) = match (find_planet_id(&tx, &record.name)?, mode) {
        (Some(_), WriteMode::Create) => return Err(CatalogError::Conflict(record.name.clone())),
        (Some(id), WriteMode::Upsert) => {
            update_planet(&tx, id, &record.name, record.population)?;
            (id, false)
        }
        (None, _) => (insert_planet(&tx, &record.name, record.population)?, true),
    };

    apply_tags(&tx, planet_id, TagKind::Climate, record.climates.as_deref())?;
    apply_tags(&tx, planet_id, TagKind::Terrain, record.terrains.as_deref())?;

    let planet = reload(&tx, planet_id)?;
    tx.commit()?;

    debug!(id = planet.id, name = %planet.name, created, "reconciled planet");
    Ok(Reconciled { planet, created })
}

/// Apply `changes` to the planet with the given id
pub fn update(store: &mut Store, id: i64, changes: &PlanetChanges) -> CatalogResult<Planet> {
    let tx = store.write()?;

    let current = load_planet(&tx, id)?.ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

    let name = changes.name.as_deref().unwrap_or(&current.name);
    if name != current.name {
        if let Some(other) = find_planet_id(&tx, name)? {
            if other != id {
                return Err(CatalogError::Conflict(name.to_string()));
            }
        }
    }
    let population = changes.population.unwrap_or(current.population);
    update_planet(&tx, id, name, population)?;

    apply_tags(&tx, id, TagKind::Climate, changes.climates.as_deref())?;
    apply_tags(&tx, id, TagKind::Terrain, changes.terrains.as_deref())?;

    let planet = reload(&tx, id)?;
    tx.commit()?;
    Ok(planet)
}

/// Delete a planet and its links. Tags stay.
pub fn delete(store: &mut Store, id: i64) -> CatalogResult<()> {
    let tx = store.write()?;
    if !delete_planet(&tx, id)? {
        return Err(CatalogError::NotFound(id.to_string()));
    }
    tx.commit()?;
    Ok(())
}

fn apply_tags(
    conn: &Connection,
    planet_id: i64,
    kind: TagKind,
    names: Option<&[String]>,
) -> CatalogResult<()> {
    let Some(names) = names else {
        return Ok(());
    };

    clear_tags(conn, planet_id, kind)?;

    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let tag_id = find_or_create_tag(conn, kind, name)?;
        attach_tag(conn, planet_id, kind, tag_id, seen.len() as i64 - 1)?;
    }

    Ok(())
}

fn reload(conn: &Connection, planet_id: i64) -> CatalogResult<Planet> {
    load_planet(conn, planet_id)?
        .ok_or_else(|| CatalogError::Internal(format!("planet {} vanished mid-write", planet_id)))
}
