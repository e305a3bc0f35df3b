use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the database inside the data directory
pub const DATABASE_FILE: &str = "planets.sqlite3";

/// Default address for `serve`
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Where the catalog database lives
pub struct DataDir {
    data_dir: PathBuf,
}

impl DataDir {
    /// Use `custom_dir`, or the platform data directory when none is given
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "planet-catalog")
                    .context("Could not determine data directory")?;
                proj_dirs.data_dir().to_path_buf()
            }
        };

        Ok(Self { data_dir })
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the default database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

/// Resolve the database file to use and make sure its directory exists.
///
/// An explicit path wins; otherwise the file lives in the platform data directory.
pub fn resolve_database_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path,
        None => DataDir::new(None)?.database_path(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    Ok(path)
}
