//! Credential storage for persisting login fields between runs.
//!
//! The store is an opaque key-value map; encryption is supplied by the
//! caller so the library stays out of the cryptography business.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, ErrorKind, Result};

/// Field map persisted for one login, e.g. server url, username, password.
pub type StoredCredentials = BTreeMap<String, String>;

/// Caller-supplied routine that transforms one field value.
///
/// The first argument is the field key, the second the plaintext (for
/// encrypt) or ciphertext (for decrypt).
pub type CredentialCipher = Arc<dyn Fn(&str, &str) -> Result<String> + Send + Sync>;

/// Trait for credential storage implementations.
pub trait CredentialStore: Send + Sync {
    /// Load the stored fields, if any exist.
    fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Save the fields, replacing anything previously stored.
    fn save(&self, fields: &StoredCredentials) -> Result<()>;

    /// Delete the stored fields. Returns true if something was deleted.
    fn delete(&self) -> Result<bool>;
}

/// File-based credential storage with caller-supplied encryption.
pub struct FileCredentialStore {
    path: PathBuf,
    encrypt: CredentialCipher,
    decrypt: CredentialCipher,
}

impl FileCredentialStore {
    /// Create a store at the default path (`~/.rally/credentials.json`).
    pub fn new(encrypt: CredentialCipher, decrypt: CredentialCipher) -> Result<Self> {
        let base = dirs::home_dir().ok_or_else(|| {
            Error::new(ErrorKind::Storage(
                "could not determine home directory".to_string(),
            ))
        })?;
        Ok(Self::with_path(
            base.join(".rally").join("credentials.json"),
            encrypt,
            decrypt,
        ))
    }

    /// Create a store at a custom path.
    pub fn with_path(
        path: impl AsRef<Path>,
        encrypt: CredentialCipher,
        decrypt: CredentialCipher,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            encrypt,
            decrypt,
        }
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&self.path)?;
        let encrypted: StoredCredentials = serde_json::from_str(&text)?;

        let mut fields = StoredCredentials::new();
        for (key, ciphertext) in &encrypted {
            fields.insert(key.clone(), (self.decrypt)(key, ciphertext)?);
        }
        Ok(Some(fields))
    }

    fn save(&self, fields: &StoredCredentials) -> Result<()> {
        self.ensure_parent()?;

        let mut encrypted = StoredCredentials::new();
        for (key, plaintext) in fields {
            encrypted.insert(key.clone(), (self.encrypt)(key, plaintext)?);
        }

        let text = serde_json::to_string_pretty(&encrypted)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
