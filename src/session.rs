//! Explicit user session.
//!
//! A [`Session`] is created on login and handed to the engine; every store
//! call is scoped to its [`UserId`]. Logging out drops the session.

use crate::error::{Result, StoreError};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Identifier of the user owning a set of records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user_id: UserId,
}

impl Session {
    /// Starts a session for a known user.
    pub fn new(user_id: UserId) -> Self {
        Session { user_id }
    }

    /// Starts a session under a freshly generated anonymous identity.
    pub fn anonymous() -> Self {
        Session::new(UserId(format!("anon-{}", Uuid::new_v4().simple())))
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Remembers the active session between CLI invocations.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    const FILE_NAME: &'static str = "session.json";

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        SessionFile {
            path: dir.as_ref().join(Self::FILE_NAME),
        }
    }

    /// Returns the saved session, or `None` when nobody is signed in.
    pub fn load(&self) -> Result<Option<Session>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let session = serde_json::from_slice(&bytes).map_err(StoreError::from)?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the saved session, or signs in anonymously and saves that.
    pub fn load_or_login(&self) -> Result<Session> {
        if let Some(session) = self.load()? {
            return Ok(session);
        }

        let session = Session::anonymous();
        self.save(&session)?;
        info!("Signed in anonymously as {}", session.user_id());
        Ok(session)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(session).map_err(StoreError::from)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Ends the saved session. Returns `false` if there was none.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
