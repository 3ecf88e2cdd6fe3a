use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::access::Role;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Display object kept next to the token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: String,
    pub role: Role,
}

/// The signed-in context passed explicitly to the shell and screens
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    pub fn new(token: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Session {
            token: token.into(),
            user: SessionUser {
                name: name.into(),
                role,
            },
        }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn initials(&self) -> String {
        initials(&self.user.name)
    }
}

/// Up to two uppercase initials for an avatar, `U` when the name is blank
pub fn initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();

    if initials.is_empty() {
        "U".to_string()
    } else {
        initials
    }
}

/// The SessionStore keeps the bearer token and user across restarts.
///
/// It is a two-row key/value table in a SQLite file under the user's data
/// directory. A stored token means the user is signed in.
pub struct SessionStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SessionStore {
    /// Open (or create) the session database at `db_path`
    pub fn open(db_path: &Path) -> SqlResult<Self> {
        if let Some(parent) = db_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("could not create {}: {}", parent.display(), e);
            }
        }

        let conn = Connection::open(db_path)?;
        tracing::debug!("session database at {}", db_path.display());

        let store = SessionStore {
            conn,
            db_path: Some(db_path.to_path_buf()),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// A store that forgets everything when the process exits
    pub fn in_memory() -> SqlResult<Self> {
        let store = SessionStore {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        store.init_schema()?;

        Ok(store)
    }

    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS session (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Load the stored session, if any.
    ///
    /// A token without a readable user object still counts as signed in;
    /// the user then shows up as an unnamed client.
    pub fn load(&self) -> SqlResult<Option<Session>> {
        let token = match self.get(TOKEN_KEY)? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };

        let user = self
            .get(USER_KEY)?
            .and_then(|json| match serde_json::from_str::<SessionUser>(&json) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("stored user is unreadable: {}", e);
                    None
                }
            })
            .unwrap_or(SessionUser {
                name: String::new(),
                role: Role::Client,
            });

        Ok(Some(Session { token, user }))
    }

    /// Persist the session, replacing any previous one
    pub fn save(&self, session: &Session) -> crate::error::Result<()> {
        let user = serde_json::to_string(&session.user)?;

        self.set(TOKEN_KEY, &session.token)?;
        self.set(USER_KEY, &user)?;
        Ok(())
    }

    /// Forget the stored session
    pub fn clear(&self) -> SqlResult<()> {
        self.conn.execute(
            "DELETE FROM session WHERE key IN (?1, ?2)",
            params![TOKEN_KEY, USER_KEY],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> SqlResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM session WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    fn set(&self, key: &str, value: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT INTO session (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}
