mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

use story_points_core::EstimationModel;

/// SQLite store holding the single served model artifact.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Metadata of the stored artifact, readable without deserializing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredModel {
    pub model_id: Uuid,
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Model artifact
    // ============================================================

    /// Replace the stored artifact in one transaction.
    pub fn save_model(&self, model: &EstimationModel) -> Result<()> {
        let artifact = model.to_json().context("Failed to serialize model")?;
        let now = Utc::now();

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO model_artifact
                 (slot, model_id, version, artifact, trained_at, updated_at)
             VALUES (1, ?, ?, ?, ?, ?)",
            (
                model.id.to_string(),
                &model.version,
                &artifact,
                model.stats().trained_at.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        tx.commit().context("Failed to commit model artifact")?;

        tracing::info!(model_id = %model.id, "Model saved");
        Ok(())
    }

    /// The stored model, if any. Corrupt or incompatible artifacts are errors.
    pub fn load_model(&self) -> Result<Option<EstimationModel>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let artifact: Option<String> = conn
            .query_row("SELECT artifact FROM model_artifact WHERE slot = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        drop(conn);

        artifact
            .map(|json| {
                EstimationModel::from_json(&json).context("Stored model artifact is unusable")
            })
            .transpose()
    }

    pub fn stored_model(&self) -> Result<Option<StoredModel>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let row = conn
            .query_row(
                "SELECT model_id, version, trained_at, updated_at
                 FROM model_artifact WHERE slot = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, version, trained_at, updated_at)| {
            Ok::<_, anyhow::Error>(StoredModel {
                model_id: Uuid::parse_str(&id).context("Invalid stored model id")?,
                version,
                trained_at: parse_datetime(&trained_at)?,
                updated_at: parse_datetime(&updated_at)?,
            })
        })
        .transpose()
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid timestamp {}", s))?
        .with_timezone(&Utc))
}
