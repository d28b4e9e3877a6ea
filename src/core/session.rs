//! Logged-in identity and the durable key-value slot it lives in.
//!
//! The login here is a stub: any non-empty email/password pair is accepted.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::error::{AuthError, SessionError};

/// Well-known key the identity is stored under.
pub const SESSION_KEY: &str = "traffic_ai_user";

/// The minimal authenticated-user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl Identity {
    /// Build the mock identity for an email: the display name is the local part.
    pub fn from_email(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or(email);
        Self {
            id: "1".to_string(),
            email: email.to_string(),
            name: name.to_string(),
        }
    }
}

/// String-valued durable storage, the local-storage analogue.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> io::Result<()>;
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

/// Volatile store, for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Key-value entries persisted as one JSON object in the data directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join("storage.json"),
        }
    }

    fn read_all(&self) -> io::Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        // A corrupt file reads as empty; the next write replaces it.
        Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring unreadable storage file {:?}: {}", self.path, e);
            HashMap::new()
        }))
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Holds at most one logged-in identity, backed by a key-value slot.
pub struct SessionHolder<S> {
    store: S,
}

impl<S: KeyValueStore> SessionHolder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the stored identity. Missing, unreadable or unparsable means no session.
    pub fn load(&self) -> Option<Identity> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read session slot: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!("Discarding malformed session: {}", e);
                None
            }
        }
    }

    pub fn save(&mut self, identity: &Identity) -> Result<(), SessionError> {
        let raw = serde_json::to_string(identity)?;
        self.store.set(SESSION_KEY, raw)?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.store.remove(SESSION_KEY)?;
        Ok(())
    }

    /// Mock authentication: both fields non-empty is the only rule.
    ///
    /// On success the identity is persisted. A failed write is logged and the
    /// login still succeeds for this run.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity::from_email(email);
        if let Err(e) = self.save(&identity) {
            warn!("Session for {} not persisted: {}", identity.email, e);
        }
        info!("Logged in as {}", identity.name);
        Ok(identity)
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.clear()?;
        info!("Logged out");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
