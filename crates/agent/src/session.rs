//! Conversation persistence keyed by session id.
//!
//! Stores hold JSON snapshots of [`ConversationState`]. Runs for the same
//! session are serialized through [`SessionLocks`]; runs for different
//! sessions never contend.

use crate::state::ConversationState;
use axon_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Keyed store of conversation snapshots.
pub trait SessionStore: Send + Sync {
    fn load(&self, session_id: &str) -> AppResult<Option<ConversationState>>;

    fn save(&self, session_id: &str, state: &ConversationState) -> AppResult<()>;
}

/// Process-local store; state is lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, ConversationState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session_id: &str) -> AppResult<Option<ConversationState>> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| AppError::Session("Session map lock poisoned".to_string()))?;
        Ok(sessions.get(session_id).cloned())
    }

    fn save(&self, session_id: &str, state: &ConversationState) -> AppResult<()> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AppError::Session("Session map lock poisoned".to_string()))?;
        sessions.insert(session_id.to_string(), state.clone());
        Ok(())
    }
}

/// SQLite-backed store surviving restarts.
#[derive(Debug)]
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Session(format!("Failed to create session directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Session(format!("Failed to open session database: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Session(format!("Failed to create sessions table: {}", e)))?;

        tracing::debug!("Opened session store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self, session_id: &str) -> AppResult<Option<ConversationState>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Session("Session database lock poisoned".to_string()))?;

        let raw: Option<String> = conn
            .query_row(
                "SELECT state FROM sessions WHERE id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Session(format!("Failed to load session: {}", e)))?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| AppError::Session(format!("Corrupt session '{}': {}", session_id, e)))
        })
        .transpose()
    }

    fn save(&self, session_id: &str, state: &ConversationState) -> AppResult<()> {
        let json = serde_json::to_string(state)?;
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Session("Session database lock poisoned".to_string()))?;

        conn.execute(
            "INSERT INTO sessions (id, state, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
            params![session_id, json, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| AppError::Session(format!("Failed to save session: {}", e)))?;

        Ok(())
    }
}

/// Per-session async locks.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`.
    pub async fn acquire(&self, session_id: &str) -> AppResult<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|_| AppError::Session("Session lock registry poisoned".to_string()))?;
            // Drop entries no run holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        Ok(lock.lock_owned().await)
    }
}
