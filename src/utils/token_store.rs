//! Encrypted key-value storage for the auth token.
//!
//! Values are sealed with AES-256-GCM before they touch disk. The key is
//! derived from an app salt and the storage path, so a copied file does not
//! decrypt elsewhere. Layout on disk: `{ "<key>": base64(nonce || ciphertext) }`.

use crate::constants::{STORAGE_FILE_NAME, STORAGE_KEY_SALT};
use crate::error::{AppError, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const NONCE_LEN: usize = 12;

pub struct TokenStore {
    path: PathBuf,
    cipher: Aes256Gcm,
}

impl TokenStore {
    /// Store living in `data_dir/storage.json`
    pub fn open(data_dir: &Path) -> Result<Self> {
        Self::at(data_dir.join(STORAGE_FILE_NAME))
    }

    pub fn at(path: PathBuf) -> Result<Self> {
        let mut hasher = Sha256::new();
        hasher.update(STORAGE_KEY_SALT);
        hasher.update(path.to_string_lossy().as_bytes());
        let key = hasher.finalize();

        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| AppError::Storage(format!("invalid key: {}", e)))?;
        Ok(Self { path, cipher })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), self.seal(value)?);
        self.write_entries(&entries)?;
        log::debug!("[TokenStore] Saved '{}'", key);
        Ok(())
    }

    /// `None` when the key is missing. An entry that fails to decrypt is
    /// treated as missing and dropped from the file.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.read_entries()?;
        let Some(sealed) = entries.get(key) else {
            return Ok(None);
        };
        match self.open_value(sealed) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("[TokenStore] Discarding unreadable '{}': {}", key, e);
                self.remove(key)?;
                Ok(None)
            }
        }
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
            log::debug!("[TokenStore] Removed '{}'", key);
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn seal(&self, value: &str) -> Result<String> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), value.as_bytes())
            .map_err(|e| AppError::Storage(format!("encryption failed: {}", e)))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(payload))
    }

    fn open_value(&self, sealed: &str) -> Result<String> {
        let payload = STANDARD
            .decode(sealed)
            .map_err(|e| AppError::Storage(format!("bad encoding: {}", e)))?;
        if payload.len() <= NONCE_LEN {
            return Err(AppError::Storage("value too short".to_string()));
        }
        let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| AppError::Storage(format!("decryption failed: {}", e)))?;
        String::from_utf8(plain).map_err(|e| AppError::Storage(e.to_string()))
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("[TokenStore] Corrupt storage file, starting fresh: {}", e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
