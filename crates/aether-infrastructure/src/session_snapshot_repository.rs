//! File-backed session snapshot repository.
//!
//! Persists the whole session collection under two fixed keys, one JSON file
//! each, in the data directory:
//!
//! - `aether-sessions`: array of camelCase session records, each carrying
//!   its own `version`
//! - `aether-active-session`: the active session id

use crate::dto::{SESSION_ENTITY, create_session_migrator};
use aether_core::error::{AetherError, Result};
use aether_core::session::{Session, SessionSnapshot, SessionSnapshotRepository};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use version_migrate::Migrator;

pub const SESSIONS_KEY: &str = "aether-sessions";
pub const ACTIVE_SESSION_KEY: &str = "aether-active-session";

/// Version key written by version-migrate's flat format.
const VERSION_KEY: &str = "version";
/// Version key of records written before the switch to version-migrate.
const LEGACY_VERSION_KEY: &str = "schemaVersion";

/// Snapshot repository over two JSON files.
///
/// # Features
///
/// - **Atomic writes**: each key is replaced via tmp file + fsync + rename
/// - **Version migration**: every record is migrated on its own via version-migrate;
///   a record that fails is skipped with a warning instead of failing the load
#[derive(Clone)]
pub struct FileSessionSnapshotRepository {
    data_dir: PathBuf,
    migrator: Arc<Migrator>,
}

impl FileSessionSnapshotRepository {
    /// Creates a repository storing its keys under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            migrator: Arc::new(create_session_migrator()),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }

    /// Migrates one stored record into the domain model.
    fn load_record(&self, mut record: Value) -> Result<Session> {
        let Some(fields) = record.as_object_mut() else {
            return Err(AetherError::migration("session record is not an object"));
        };
        if let Some(version) = fields.remove(LEGACY_VERSION_KEY) {
            fields.entry(VERSION_KEY).or_insert(version);
        }
        if !fields.contains_key(VERSION_KEY) {
            let inferred = infer_version(fields);
            fields.insert(VERSION_KEY.to_string(), Value::from(inferred));
        }

        self.migrator
            .load_flat_from(SESSION_ENTITY, record)
            .map_err(|e| AetherError::migration(e.to_string()))
    }

    fn save_record(&self, session: &Session) -> Result<Value> {
        let json = self
            .migrator
            .save_domain_flat(SESSION_ENTITY, session)
            .map_err(|e| AetherError::migration(format!("Failed to serialize session: {}", e)))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Infers the schema of records written before versioning existed.
fn infer_version(fields: &serde_json::Map<String, Value>) -> &'static str {
    if fields.contains_key("codeHistory") {
        "1.1.0"
    } else {
        "1.0.0"
    }
}

/// Accepts both a JSON string and the bare id older writers stored.
fn parse_active_id(raw: &str) -> String {
    serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.trim().to_string())
}

/// Reads a key file, treating a missing or blank file as absent.
async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AetherError::io(format!(
            "Failed to read '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Replaces `path` with `bytes` via temp file, fsync and rename.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_error = |action: &str, target: &Path, e: std::io::Error| {
        AetherError::io(format!("Failed to {} '{}': {}", action, target.display(), e))
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error("create directory", parent, e))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let mut tmp_file = fs::File::create(&tmp_path)
        .await
        .map_err(|e| io_error("create temp file", &tmp_path, e))?;
    tmp_file
        .write_all(bytes)
        .await
        .map_err(|e| io_error("write temp file", &tmp_path, e))?;
    tmp_file
        .sync_all()
        .await
        .map_err(|e| io_error("sync temp file", &tmp_path, e))?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)
        .await
        .map_err(|e| io_error("replace", path, e))
}

#[async_trait]
impl SessionSnapshotRepository for FileSessionSnapshotRepository {
    async fn load(&self) -> Result<SessionSnapshot> {
        let records: Vec<Value> = match read_optional(&self.key_path(SESSIONS_KEY)).await? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        let mut sessions = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match self.load_record(record) {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!("Skipping unreadable session record #{}: {}", index, e),
            }
        }

        let active_session_id = read_optional(&self.key_path(ACTIVE_SESSION_KEY))
            .await?
            .map(|raw| parse_active_id(&raw));

        tracing::debug!(
            "Loaded {} session(s), active={:?}",
            sessions.len(),
            active_session_id
        );
        Ok(SessionSnapshot {
            sessions,
            active_session_id,
        })
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let records = snapshot
            .sessions
            .iter()
            .map(|session| self.save_record(session))
            .collect::<Result<Vec<_>>>()?;
        let content = serde_json::to_string_pretty(&records)?;
        write_atomic(&self.key_path(SESSIONS_KEY), content.as_bytes()).await?;

        if let Some(active) = &snapshot.active_session_id {
            let content = serde_json::to_string(active)?;
            write_atomic(&self.key_path(ACTIVE_SESSION_KEY), content.as_bytes()).await?;
        }
        Ok(())
    }
}
