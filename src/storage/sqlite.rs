use super::{
    format_timestamp, new_session_id, parse_timestamp, DocumentStore, MessagePair, Session,
    SessionUpdate,
};
use crate::error::{Result, VaidyaError};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

const SESSION_COLUMNS: &str = "id, owner_id, title, message_count, created_at, updated_at";

/// Storage backend for chat history
pub struct SqliteStorage {
    db_path: PathBuf,
}

/// Session row as stored, before timestamp parsing
struct SessionRow {
    id: String,
    owner_id: String,
    title: String,
    message_count: i64,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            message_count: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_session(self) -> Result<Session> {
        Ok(Session {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            message_count: u64::try_from(self.message_count).unwrap_or(0),
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory, unless
    /// `VAIDYA_HISTORY_DB` points somewhere else.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("VAIDYA_HISTORY_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "vaidya", "vaidya")
            .ok_or_else(|| VaidyaError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("history.db"))
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use vaidya::storage::SqliteStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("history.db")).unwrap();
    /// assert!(storage.db_path().ends_with("history.db"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| VaidyaError::Storage(format!("{:#}", e)))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        tracing::debug!("Opened history database at {}", storage.db_path.display());
        Ok(storage)
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = open_connection(&self.db_path)
            .map_err(|e| VaidyaError::Storage(format!("{:#}", e)))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                message_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_owner_updated
                ON sessions (owner_id, updated_at DESC);
            CREATE TABLE IF NOT EXISTS message_pairs (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                user_text TEXT NOT NULL,
                assistant_text TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_pairs_session
                ON message_pairs (owner_id, session_id, timestamp, seq);",
        )
        .context("Failed to create tables")
        .map_err(|e| VaidyaError::Storage(format!("{:#}", e)))?;

        Ok(())
    }

    /// Run blocking database work off the async executor
    async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> anyhow::Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = open_connection(&db_path)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| VaidyaError::Storage(format!("{} task failed: {}", op, e)))?
        .map_err(|e| {
            tracing::error!(op, "SQLite operation failed: {:#}", e);
            VaidyaError::Storage(format!("{:#}", e))
        })
    }
}

fn open_connection(db_path: &Path) -> anyhow::Result<Connection> {
    Connection::open(db_path).context("Failed to open database")
}

fn select_session(
    conn: &Connection,
    owner_id: &str,
    session_id: &str,
) -> anyhow::Result<Option<Session>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM sessions WHERE owner_id = ?1 AND id = ?2",
                SESSION_COLUMNS
            ),
            params![owner_id, session_id],
            SessionRow::from_row,
        )
        .optional()
        .context("Failed to query session")?;

    match row {
        Some(row) => Ok(Some(row.into_session()?)),
        None => Ok(None),
    }
}

#[async_trait]
impl DocumentStore for SqliteStorage {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn create_session(
        &self,
        owner_id: &str,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let session = Session {
            id: new_session_id(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            message_count: 0,
            created_at: now,
            updated_at: now,
        };
        let record = session.clone();

        self.run("create_session", move |conn| {
            let ts = format_timestamp(record.created_at);
            conn.execute(
                "INSERT INTO sessions (id, owner_id, title, message_count, created_at, updated_at)
                VALUES (?1, ?2, ?3, 0, ?4, ?4)",
                params![record.id, record.owner_id, record.title, ts],
            )
            .context("Failed to insert session")?;
            Ok(())
        })
        .await?;

        Ok(session)
    }

    async fn get_session(&self, owner_id: &str, session_id: &str) -> Result<Option<Session>> {
        let owner_id = owner_id.to_string();
        let session_id = session_id.to_string();
        self.run("get_session", move |conn| {
            select_session(conn, &owner_id, &session_id)
        })
        .await
    }

    async fn update_session(
        &self,
        owner_id: &str,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<Option<Session>> {
        let owner_id = owner_id.to_string();
        let session_id = session_id.to_string();
        let update = update.clone();

        self.run("update_session", move |conn| {
            let tx = conn.transaction().context("Failed to start transaction")?;

            let count = update.message_count.map(|c| c as i64);
            let changed = tx
                .execute(
                    "UPDATE sessions SET
                        title = COALESCE(?1, title),
                        message_count = COALESCE(?2, message_count),
                        updated_at = ?3
                    WHERE owner_id = ?4 AND id = ?5",
                    params![
                        update.title,
                        count,
                        format_timestamp(update.updated_at),
                        owner_id,
                        session_id
                    ],
                )
                .context("Failed to update session")?;

            let session = if changed == 0 {
                None
            } else {
                select_session(&tx, &owner_id, &session_id)?
            };

            tx.commit().context("Failed to commit transaction")?;
            Ok(session)
        })
        .await
    }

    async fn delete_session(&self, owner_id: &str, session_id: &str) -> Result<bool> {
        let owner_id = owner_id.to_string();
        let session_id = session_id.to_string();
        self.run("delete_session", move |conn| {
            let removed = conn
                .execute(
                    "DELETE FROM sessions WHERE owner_id = ?1 AND id = ?2",
                    params![owner_id, session_id],
                )
                .context("Failed to delete session")?;
            Ok(removed > 0)
        })
        .await
    }

    async fn query_sessions(&self, owner_id: &str) -> Result<Vec<Session>> {
        let owner_id = owner_id.to_string();
        self.run("query_sessions", move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM sessions
                    WHERE owner_id = ?1
                    ORDER BY updated_at DESC, created_at DESC",
                    SESSION_COLUMNS
                ))
                .context("Failed to prepare statement")?;

            let rows = stmt
                .query_map(params![owner_id], SessionRow::from_row)
                .context("Failed to query sessions")?;

            let mut sessions = Vec::new();
            for row in rows {
                let row = row.context("Failed to read session row")?;
                sessions.push(row.into_session()?);
            }
            Ok(sessions)
        })
        .await
    }

    async fn create_pair(
        &self,
        owner_id: &str,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
        now: DateTime<Utc>,
    ) -> Result<MessagePair> {
        let owner_id = owner_id.to_string();
        let mut pair = MessagePair {
            session_id: session_id.to_string(),
            user_text: user_text.to_string(),
            assistant_text: assistant_text.to_string(),
            timestamp: now,
            seq: 0,
        };
        let record = pair.clone();

        let seq = self
            .run("create_pair", move |conn| {
                conn.execute(
                    "INSERT INTO message_pairs
                        (session_id, owner_id, user_text, assistant_text, timestamp)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        record.session_id,
                        owner_id,
                        record.user_text,
                        record.assistant_text,
                        format_timestamp(record.timestamp)
                    ],
                )
                .context("Failed to insert message pair")?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        pair.seq = u64::try_from(seq).unwrap_or(0);
        Ok(pair)
    }

    async fn query_pairs(&self, owner_id: &str, session_id: &str) -> Result<Vec<MessagePair>> {
        let owner_id = owner_id.to_string();
        let session_id = session_id.to_string();
        self.run("query_pairs", move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT seq, session_id, user_text, assistant_text, timestamp
                    FROM message_pairs
                    WHERE owner_id = ?1 AND session_id = ?2
                    ORDER BY timestamp ASC, seq ASC",
                )
                .context("Failed to prepare statement")?;

            let rows = stmt
                .query_map(params![owner_id, session_id], |row| {
                    let seq: i64 = row.get(0)?;
                    let session_id: String = row.get(1)?;
                    let user_text: String = row.get(2)?;
                    let assistant_text: String = row.get(3)?;
                    let timestamp: String = row.get(4)?;
                    Ok((seq, session_id, user_text, assistant_text, timestamp))
                })
                .context("Failed to query message pairs")?;

            let mut pairs = Vec::new();
            for row in rows {
                let (seq, session_id, user_text, assistant_text, timestamp) =
                    row.context("Failed to read message pair row")?;
                pairs.push(MessagePair {
                    session_id,
                    user_text,
                    assistant_text,
                    timestamp: parse_timestamp(&timestamp)?,
                    seq: u64::try_from(seq).unwrap_or(0),
                });
            }
            Ok(pairs)
        })
        .await
    }

    async fn delete_pairs(&self, owner_id: &str, session_id: &str) -> Result<usize> {
        let owner_id = owner_id.to_string();
        let session_id = session_id.to_string();
        self.run("delete_pairs", move |conn| {
            let removed = conn
                .execute(
                    "DELETE FROM message_pairs WHERE owner_id = ?1 AND session_id = ?2",
                    params![owner_id, session_id],
                )
                .context("Failed to delete message pairs")?;
            Ok(removed)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DEFAULT_SESSION_TITLE;
    use serial_test::serial;
    use std::env;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Helper: create a temporary storage instance backed by a temp directory.
    ///
    /// Returns both the `SqliteStorage` and the `TempDir` so the caller keeps
    /// ownership of the directory (preventing it from being removed).
    fn create_test_storage() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("history.db");
        let storage = SqliteStorage::new_with_path(db_path).expect("failed to create storage");
        (storage, dir)
    }

    #[test]
    fn test_sqlite_storage_init_creates_tables() {
        let (storage, _dir) = create_test_storage();
        let conn = Connection::open(&storage.db_path).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table'
                    AND name IN ('sessions', 'message_pairs')",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (storage, _dir) = create_test_storage();
        let created = storage
            .create_session("alice", DEFAULT_SESSION_TITLE, Utc::now())
            .await
            .expect("create failed");

        let loaded = storage
            .get_session("alice", &created.id)
            .await
            .expect("get failed")
            .expect("session missing");
        assert_eq!(loaded.title, DEFAULT_SESSION_TITLE);
        assert_eq!(loaded.message_count, 0);
        assert_eq!(loaded.created_at, loaded.updated_at);
    }

    #[tokio::test]
    async fn test_get_session_is_owner_scoped() {
        let (storage, _dir) = create_test_storage();
        let created = storage
            .create_session("alice", "mine", Utc::now())
            .await
            .unwrap();
        assert!(storage
            .get_session("bob", &created.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_session_partial_fields() {
        let (storage, _dir) = create_test_storage();
        let created = storage
            .create_session("alice", DEFAULT_SESSION_TITLE, Utc::now())
            .await
            .unwrap();

        let later = created.updated_at + chrono::Duration::seconds(2);
        let updated = storage
            .update_session(
                "alice",
                &created.id,
                &SessionUpdate::touch(later).with_message_count(3),
            )
            .await
            .unwrap()
            .expect("session missing");

        assert_eq!(updated.title, DEFAULT_SESSION_TITLE);
        assert_eq!(updated.message_count, 3);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_session_returns_none() {
        let (storage, _dir) = create_test_storage();
        let result = storage
            .update_session("alice", "nope", &SessionUpdate::touch(Utc::now()))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_query_sessions_ordered_by_updated_at() {
        let (storage, _dir) = create_test_storage();
        let first = storage
            .create_session("alice", "A", Utc::now())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = storage
            .create_session("alice", "B", Utc::now())
            .await
            .unwrap();

        let sessions = storage.query_sessions("alice").await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, second.id);
        assert_eq!(sessions[1].id, first.id);
    }

    #[tokio::test]
    async fn test_query_sessions_returns_empty_for_new_db() {
        let (storage, _dir) = create_test_storage();
        assert!(storage.query_sessions("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pairs_roundtrip_in_insertion_order() {
        let (storage, _dir) = create_test_storage();
        let now = Utc::now();
        let session = storage.create_session("alice", "t", now).await.unwrap();

        let a = storage
            .create_pair("alice", &session.id, "q1", "a1", now)
            .await
            .unwrap();
        let b = storage
            .create_pair("alice", &session.id, "q2", "a2", now)
            .await
            .unwrap();
        assert!(b.seq > a.seq);

        let pairs = storage.query_pairs("alice", &session.id).await.unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].user_text, "q1");
        assert_eq!(pairs[1].assistant_text, "a2");
        assert_eq!(pairs[0].timestamp.timestamp_micros(), now.timestamp_micros());
    }

    #[tokio::test]
    async fn test_delete_session_and_pairs() {
        let (storage, _dir) = create_test_storage();
        let now = Utc::now();
        let session = storage.create_session("alice", "t", now).await.unwrap();
        storage
            .create_pair("alice", &session.id, "q", "a", now)
            .await
            .unwrap();

        assert!(storage.delete_session("alice", &session.id).await.unwrap());
        assert!(!storage.delete_session("alice", &session.id).await.unwrap());
        assert_eq!(storage.delete_pairs("alice", &session.id).await.unwrap(), 1);
        assert!(storage
            .query_pairs("alice", &session.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    #[serial]
    fn test_new_respects_env_override() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("nested").join("history.db");
        env::set_var("VAIDYA_HISTORY_DB", db_path.to_string_lossy().to_string());

        let storage = SqliteStorage::new().expect("new failed with env override");
        assert_eq!(storage.db_path, db_path);
        assert!(db_path.parent().unwrap().exists());

        env::remove_var("VAIDYA_HISTORY_DB");
    }
}
