use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::DEFAULT_BIND;
use crate::ingest::DEFAULT_ENDPOINT;

#[derive(Parser, Debug)]
#[command(name = "planet-catalog")]
#[command(version, about = "Ingest SWAPI planets into SQLite and serve them over HTTP")]
pub struct Cli {
    /// SQLite database path (default: platform data directory)
    #[arg(short, long, global = true, env = "PLANETS_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch planets from the SWAPI GraphQL endpoint and upsert them
    Fetch {
        /// GraphQL endpoint to query
        #[arg(short, long, env = "SWAPI_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },

    /// Serve the planets CRUD API
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "PLANETS_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
    },

    /// Create the database tables and exit
    Init,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_defaults() {
        let cli = Cli::try_parse_from(["planet-catalog", "fetch"]).unwrap();
        match cli.command {
            Commands::Fetch { endpoint } => assert_eq!(endpoint, DEFAULT_ENDPOINT),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_with_database() {
        let cli = Cli::try_parse_from([
            "planet-catalog",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--database",
            "/tmp/p.db",
        ])
        .unwrap();

        assert_eq!(cli.database, Some(PathBuf::from("/tmp/p.db")));
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.port(), 9000),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
