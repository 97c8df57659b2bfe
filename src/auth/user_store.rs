//! User Storage
//! Mission: Store and look up user accounts with SQLite

use crate::auth::models::User;
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        // Usernames are unique; the constraint backstops racing
        // registrations that pass the handler's existence pre-check.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login TEXT
            )",
            [],
        )?;

        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        let id: String = row.get(0)?;
        Ok(User {
            id: Uuid::parse_str(&id).unwrap_or_default(),
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
            last_login: row.get(4)?,
        })
    }

    /// Get user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, created_at, last_login
             FROM users WHERE username = ?1",
        )?;

        match stmt.query_row(params![username], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by id (token subject resolution)
    pub fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, created_at, last_login
             FROM users WHERE id = ?1",
        )?;

        match stmt.query_row(params![user_id.to_string()], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify username and password.
    ///
    /// Returns false for an unknown username as well as a wrong password;
    /// callers must not distinguish the two in responses.
    pub fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        match self.get_user_by_username(username)? {
            Some(user) => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid)
            }
            None => Ok(false),
        }
    }

    /// Create a new user with a bcrypt-hashed password
    pub fn create_user(&self, username: &str, password: &str) -> Result<User> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
            last_login: None,
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at, last_login)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.password_hash,
                user.created_at,
                user.last_login,
            ],
        )
        .context("Failed to insert user")?;

        info!("✅ Created user: {}", user.username);

        Ok(user)
    }

    /// Stamp the last successful login instant on a record
    pub fn record_login(&self, username: &str) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE users SET last_login = ?1 WHERE username = ?2",
            params![Utc::now().to_rfc3339(), username],
        )
        .context("Failed to record login")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let (store, _temp) = create_test_store();

        let user = store.create_user("alice", "password123").unwrap();
        assert_eq!(user.username, "alice");

        let retrieved = store.get_user_by_username("alice").unwrap();
        assert!(retrieved.is_some());

        let retrieved = retrieved.unwrap();
        assert_eq!(retrieved.username, "alice");
        assert_eq!(retrieved.id, user.id);

        let by_id = store.get_user_by_id(&user.id).unwrap();
        assert_eq!(by_id.unwrap().username, "alice");
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (store, _temp) = create_test_store();

        store.create_user("alice", "password123").unwrap();

        // Second registration under the same username hits the UNIQUE
        // constraint.
        let result = store.create_user("alice", "otherpassword");
        assert!(result.is_err());
    }

    #[test]
    fn test_password_is_hashed() {
        let (store, _temp) = create_test_store();

        let user = store.create_user("alice", "password123").unwrap();
        assert_ne!(user.password_hash, "password123");
        assert!(user.password_hash.starts_with("$2"));
    }

    #[test]
    fn test_password_verification() {
        let (store, _temp) = create_test_store();

        store.create_user("alice", "password123").unwrap();

        // Correct password
        assert!(store.verify_password("alice", "password123").unwrap());

        // Incorrect password
        assert!(!store.verify_password("alice", "wrongpassword").unwrap());

        // Non-existent user
        assert!(!store.verify_password("nonexistent", "password123").unwrap());
    }

    #[test]
    fn test_record_login() {
        let (store, _temp) = create_test_store();

        store.create_user("alice", "password123").unwrap();
        assert!(store
            .get_user_by_username("alice")
            .unwrap()
            .unwrap()
            .last_login
            .is_none());

        store.record_login("alice").unwrap();

        let user = store.get_user_by_username("alice").unwrap().unwrap();
        assert!(user.last_login.is_some());
    }
}
