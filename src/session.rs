//! The root bearer token.
//!
//! A [`Session`] is created once and handed to whatever needs it; flows that
//! obtain a token (sign-in, root-token reset) call [`Session::set`], flows
//! that invalidate it (root-password reset) call [`Session::clear`].
//! [`SessionFile`] persists it between CLI invocations.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use zeroize::Zeroizing;

#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<Zeroizing<String>>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set(token);
        session
    }

    // The slot holds plain data, so a poisoned lock is still usable.
    pub fn set(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Zeroizing::new(token.into()));
    }

    pub fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    pub fn token(&self) -> Option<Zeroizing<String>> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

/// On-disk copy of the session token (one line, owner-only permissions on
/// unix).
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no session was saved.
    pub fn load(&self) -> std::io::Result<Option<Zeroizing<String>>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let raw = Zeroizing::new(raw);
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Zeroizing::new(token.to_string())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    pub fn remove(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Mirror the in-memory session to disk: save when signed in, remove
    /// otherwise.
    pub fn sync(&self, session: &Session) -> std::io::Result<()> {
        match session.token() {
            Some(token) => self.save(&token),
            None => self.remove(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let session = Session::new();
        assert!(!session.is_signed_in());

        session.set("root-token");
        assert_eq!(session.token().as_deref().map(String::as_str), Some("root-token"));

        // clones share state
        let other = session.clone();
        other.clear();
        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_clear_after_poisoned_lock() {
        let session = Session::with_token("root-1");
        let held = session.clone();
        let crashed = std::thread::spawn(move || {
            let _guard = held.token.write().unwrap();
            panic!("writer crashed");
        })
        .join();
        assert!(crashed.is_err());
        assert!(session.token.is_poisoned());

        session.clear();
        assert!(!session.is_signed_in());
        session.set("root-2");
        assert_eq!(session.token().unwrap().as_str(), "root-2");
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let session = Session::with_token("very-secret");
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("very-secret"));
    }

    #[test]
    fn test_session_file_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("nested").join("session"));

        assert!(file.load().unwrap().is_none());

        let session = Session::with_token("tok-1");
        file.sync(&session).unwrap();
        assert_eq!(file.load().unwrap().as_deref().map(String::as_str), Some("tok-1"));

        session.clear();
        file.sync(&session).unwrap();
        assert!(file.load().unwrap().is_none());
        // removing twice is fine
        file.remove().unwrap();
    }
}
