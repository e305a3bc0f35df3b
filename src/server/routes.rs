//! Axum router and handlers for the `planets` collection

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::info;

use super::AppState;
use crate::codec::{PlanetView, PlanetWrite};
use crate::error::{CatalogError, CatalogResult};
use crate::reconcile::{self, WriteMode};

/// Build the API router wired to the given shared state.
///
/// No middleware is attached here so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/planets", get(list_planets).post(create_planet))
        .route(
            "/planets/:id",
            get(retrieve_planet)
                .put(replace_planet)
                .patch(patch_planet)
                .delete(delete_planet),
        )
        .with_state(state)
}

type Body = Result<Json<PlanetWrite>, JsonRejection>;

fn read_body(body: Body) -> CatalogResult<PlanetWrite> {
    body.map(|Json(write)| write)
        .map_err(|rejection| CatalogError::validation("non_field_errors", rejection.body_text()))
}

/// Ids are system-generated integers; anything else can't exist
fn parse_id(raw: &str) -> CatalogResult<i64> {
    raw.parse()
        .map_err(|_| CatalogError::NotFound(raw.to_string()))
}

// GET /planets
async fn list_planets(State(st): State<Arc<AppState>>) -> CatalogResult<Json<Vec<PlanetView>>> {
    let planets = st.with_store(|store| store.list_planets()).await?;
    Ok(Json(planets.into_iter().map(PlanetView::from).collect()))
}

// POST /planets
async fn create_planet(
    State(st): State<Arc<AppState>>,
    body: Body,
) -> CatalogResult<(StatusCode, Json<PlanetView>)> {
    let record = read_body(body)?.into_record()?;
    let outcome = st
        .with_store(move |store| reconcile::upsert(store, &record, WriteMode::Create))
        .await?;

    info!(id = outcome.planet.id, name = %outcome.planet.name, "planet created");
    Ok((StatusCode::CREATED, Json(outcome.planet.into())))
}

// GET /planets/:id
async fn retrieve_planet(
    State(st): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> CatalogResult<Json<PlanetView>> {
    let id = parse_id(&raw_id)?;
    let planet = st
        .with_store(move |store| store.get_planet(id))
        .await?
        .ok_or(CatalogError::NotFound(raw_id))?;
    Ok(Json(planet.into()))
}

// PUT /planets/:id
async fn replace_planet(
    State(st): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    body: Body,
) -> CatalogResult<Json<PlanetView>> {
    let id = parse_id(&raw_id)?;
    let changes = read_body(body)?.into_replacement()?;
    let planet = st
        .with_store(move |store| reconcile::update(store, id, &changes))
        .await?;

    info!(id, name = %planet.name, "planet replaced");
    Ok(Json(planet.into()))
}

// PATCH /planets/:id
async fn patch_planet(
    State(st): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    body: Body,
) -> CatalogResult<Json<PlanetView>> {
    let id = parse_id(&raw_id)?;
    let changes = read_body(body)?.into_changes()?;
    let planet = st
        .with_store(move |store| reconcile::update(store, id, &changes))
        .await?;

    info!(id, name = %planet.name, "planet updated");
    Ok(Json(planet.into()))
}

// DELETE /planets/:id
async fn delete_planet(
    State(st): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> CatalogResult<StatusCode> {
    let id = parse_id(&raw_id)?;
    st.with_store(move |store| reconcile::delete(store, id)).await?;

    info!(id, "planet deleted");
    Ok(StatusCode::NO_CONTENT)
}
