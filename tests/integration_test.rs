//! End-to-end ingestion tests: a mock SWAPI endpoint feeding a real SQLite file.
//!
//! These tests:
//! 1. Serve a canned GraphQL response from a local mock server
//! 2. Run ingestion into a temporary database file
//! 3. Check planets, tags and links as stored

use httpmock::prelude::*;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tempfile::TempDir;

use planet_catalog::ingest::{self, IngestSummary, SwapiClient};
use planet_catalog::schema::{CLIMATES, PLANETS, PLANET_TERRAINS, TERRAINS};
use planet_catalog::{CatalogError, Store, TagKind};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Three planets with overlapping tags, as SWAPI would return them
static SWAPI_RESPONSE: Lazy<Value> = Lazy::new(|| {
    json!({
        "data": {
            "allPlanets": {
                "planets": [
                    {
                        "name": "Tatooine",
                        "population": "200000",
                        "terrains": ["desert"],
                        "climates": ["arid"]
                    },
                    {
                        "name": "Alderaan",
                        "population": "2000000000",
                        "terrains": ["grasslands", "mountains"],
                        "climates": ["temperate"]
                    },
                    {
                        "name": "Hoth",
                        "population": null,
                        "terrains": ["tundra", "ice caves", "mountain ranges"],
                        "climates": ["frozen", "murky"]
                    },
                    {
                        "name": "Yavin IV",
                        "population": "unknown",
                        "terrains": ["jungle", "rainforests"],
                        "climates": ["temperate", "tropical"]
                    }
                ]
            }
        }
    })
});

/// A temporary database file that lives as long as the struct
struct TestDatabase {
    _dir: TempDir,
    store: Store,
}

impl TestDatabase {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Store::open(&dir.path().join("planets.sqlite3")).expect("Failed to open store");
        Self { _dir: dir, store }
    }
}

fn mock_swapi<'a>(server: &'a MockServer, status: u16, body: &Value) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(POST).path("/graphql").body_contains("allPlanets");
        then.status(status)
            .header("content-type", "application/json")
            .json_body(body.clone());
    })
}

fn planet_names(store: &Store) -> Vec<String> {
    store
        .list_planets()
        .expect("list planets")
        .into_iter()
        .map(|p| p.name)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_ingest_populates_database() {
    let server = MockServer::start();
    let mock = mock_swapi(&server, 200, &SWAPI_RESPONSE);
    let mut db = TestDatabase::new();
    let client = SwapiClient::new(server.url("/graphql")).unwrap();

    let summary = ingest::run(&mut db.store, &client).unwrap();

    mock.assert();
    assert_eq!(summary, IngestSummary { created: 4, updated: 0 });
    assert_eq!(db.store.count(&PLANETS).unwrap(), 4);
    assert_eq!(db.store.count(&CLIMATES).unwrap(), 5);
    assert_eq!(db.store.count(&TERRAINS).unwrap(), 8);

    let planets = db.store.list_planets().unwrap();
    let tatooine = planets.iter().find(|p| p.name == "Tatooine").unwrap();
    assert_eq!(tatooine.population, Some(200_000));
    assert_eq!(tatooine.climates, vec!["arid"]);

    let alderaan = planets.iter().find(|p| p.name == "Alderaan").unwrap();
    assert_eq!(alderaan.terrains, vec!["grasslands", "mountains"]);

    for name in ["Hoth", "Yavin IV"] {
        let planet = planets.iter().find(|p| p.name == name).unwrap();
        assert_eq!(planet.population, None, "{} population should be null", name);
    }
}

#[test]
fn test_ingest_twice_is_idempotent() {
    let server = MockServer::start();
    let mock = mock_swapi(&server, 200, &SWAPI_RESPONSE);
    let mut db = TestDatabase::new();
    let client = SwapiClient::new(server.url("/graphql")).unwrap();

    ingest::run(&mut db.store, &client).unwrap();
    let counts = |store: &Store| {
        [&PLANETS, &CLIMATES, &TERRAINS, &PLANET_TERRAINS]
            .map(|table| store.count(table).unwrap())
    };
    let first = counts(&db.store);

    let summary = ingest::run(&mut db.store, &client).unwrap();

    mock.assert_hits(2);
    assert_eq!(summary, IngestSummary { created: 0, updated: 4 });
    assert_eq!(counts(&db.store), first);
}

#[test]
fn test_ingest_replaces_tags_from_upstream() {
    let server = MockServer::start();
    let mut db = TestDatabase::new();
    let client = SwapiClient::new(server.url("/graphql")).unwrap();

    let mut first = mock_swapi(&server, 200, &SWAPI_RESPONSE);
    ingest::run(&mut db.store, &client).unwrap();
    first.delete();

    let trimmed = json!({"data": {"allPlanets": {"planets": [
        {"name": "Hoth", "population": "1500", "terrains": ["tundra"], "climates": null}
    ]}}});
    mock_swapi(&server, 200, &trimmed);
    ingest::run(&mut db.store, &client).unwrap();

    let hoth = db
        .store
        .list_planets()
        .unwrap()
        .into_iter()
        .find(|p| p.name == "Hoth")
        .unwrap();
    assert_eq!(hoth.population, Some(1500));
    assert_eq!(hoth.terrains, vec!["tundra"]);
    assert!(hoth.climates.is_empty());
    // Tags detached from Hoth still exist
    assert!(db
        .store
        .tag_names(TagKind::Climate)
        .unwrap()
        .contains(&"murky".to_string()));
}

#[test]
fn test_ingest_fetch_failure_aborts() {
    let server = MockServer::start();
    mock_swapi(&server, 500, &json!({"error": "down"}));
    let mut db = TestDatabase::new();
    let client = SwapiClient::new(server.url("/graphql")).unwrap();

    let err = ingest::run(&mut db.store, &client).unwrap_err();

    assert!(matches!(err, CatalogError::Fetch(_)));
    assert!(planet_names(&db.store).is_empty());
}

#[test]
fn test_ingest_missing_structure_is_empty_run() {
    let server = MockServer::start();
    mock_swapi(&server, 200, &json!({"data": {"allPlanets": null}}));
    let mut db = TestDatabase::new();
    let client = SwapiClient::new(server.url("/graphql")).unwrap();

    let summary = ingest::run(&mut db.store, &client).unwrap();

    assert_eq!(summary.total(), 0);
    assert!(planet_names(&db.store).is_empty());
}

#[test]
fn test_ingest_malformed_response() {
    let server = MockServer::start();
    mock_swapi(
        &server,
        200,
        &json!({"data": {"allPlanets": {"planets": "Tatooine"}}}),
    );
    let mut db = TestDatabase::new();
    let client = SwapiClient::new(server.url("/graphql")).unwrap();

    let err = ingest::run(&mut db.store, &client).unwrap_err();
    assert!(matches!(err, CatalogError::MalformedResponse(_)));
}

#[test]
fn test_ingest_invalid_population_keeps_earlier_planets() {
    let server = MockServer::start();
    mock_swapi(
        &server,
        200,
        &json!({"data": {"allPlanets": {"planets": [
            {"name": "Tatooine", "population": "200000", "terrains": ["desert"], "climates": ["arid"]},
            {"name": "Kamino", "population": "a billion", "terrains": ["ocean"], "climates": ["temperate"]}
        ]}}}),
    );
    let mut db = TestDatabase::new();
    let client = SwapiClient::new(server.url("/graphql")).unwrap();

    let err = ingest::run(&mut db.store, &client).unwrap_err();

    assert!(matches!(err, CatalogError::InvalidPopulation { ref planet, .. } if planet == "Kamino"));
    assert_eq!(planet_names(&db.store), vec!["Tatooine"]);
}

#[test]
fn test_store_reopens_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planets.sqlite3");

    let server = MockServer::start();
    mock_swapi(&server, 200, &SWAPI_RESPONSE);
    let client = SwapiClient::new(server.url("/graphql")).unwrap();
    {
        let mut store = Store::open(&path).unwrap();
        ingest::run(&mut store, &client).unwrap();
    }

    let store = Store::open(&path).unwrap();
    assert_eq!(
        planet_names(&store),
        vec!["Alderaan", "Hoth", "Tatooine", "Yavin IV"]
    );
}
