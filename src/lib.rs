pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod reconcile;
pub mod schema;
pub mod server;
pub mod store;

pub use cli::{Cli, Commands};
pub use error::{CatalogError, CatalogResult};
pub use model::{Planet, PlanetChanges, PlanetRecord, TagKind};
pub use store::Store;
