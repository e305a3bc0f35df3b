//! One-shot ingestion of SWAPI planets into the store

pub mod client;
pub mod normalize;

pub use client::*;
pub use normalize::*;

use tracing::{info, warn};

use crate::error::CatalogResult;
use crate::reconcile::{self, WriteMode};
use crate::store::Store;

/// What an ingestion run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub created: usize,
    pub updated: usize,
}

impl IngestSummary {
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

/// Fetch every planet from `source` and upsert each one.
///
/// Each planet is committed on its own; an error stops the run but keeps
/// what was already written.
pub fn run(store: &mut Store, source: &impl PlanetSource) -> CatalogResult<IngestSummary> {
    info!("Fetching data from SWAPI...");
    let raw_planets = source.fetch_planets()?;

    let mut summary = IngestSummary::default();
    if raw_planets.is_empty() {
        warn!("No planets found in the response.");
        return Ok(summary);
    }

    for raw in raw_planets {
        let record = normalize(raw)?;
        let outcome = reconcile::upsert(store, &record, WriteMode::Upsert)?;

        if outcome.created {
            summary.created += 1;
            info!("Created planet: {}", outcome.planet.name);
        } else {
            summary.updated += 1;
            info!("Updated planet: {}", outcome.planet.name);
        }
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        "Database population complete."
    );
    Ok(summary)
}
