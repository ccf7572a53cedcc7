//! Process configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Result;

pub const DEFAULT_PORT: u16 = 8088;
const DATABASE_FILE: &str = "story-points.db";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Directory holding the SQLite store (from STORY_POINTS_DATA_DIR)
    pub data_dir: Option<PathBuf>,
    /// HTTP port (from STORY_POINTS_PORT)
    pub port: u16,
    /// Allowed CORS origins (from STORY_POINTS_CORS_ORIGINS, comma-separated)
    pub cors_origins: Option<Vec<String>>,
    /// Train on the seed set at startup when nothing is stored (from STORY_POINTS_BOOTSTRAP)
    pub bootstrap: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("STORY_POINTS_DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let port = lookup("STORY_POINTS_PORT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = lookup("STORY_POINTS_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        });

        let bootstrap = lookup("STORY_POINTS_BOOTSTRAP")
            .map(|s| !matches!(s.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"))
            .unwrap_or(true);

        Self {
            data_dir,
            port,
            cors_origins,
            bootstrap,
        }
    }

    /// Location of the SQLite file, falling back to the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.join(DATABASE_FILE));
        }

        let dirs = directories::ProjectDirs::from("", "", "story-points")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join(DATABASE_FILE))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
