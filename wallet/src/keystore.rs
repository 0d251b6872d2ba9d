// Copyright (C) 2024 The ferrocoin developers
// This file is part of the ferrocoin library.

// The ferrocoin library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The ferrocoin library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the ferrocoin library. If not, see <https://www.gnu.org/licenses/>.

use crate::{Identity, WalletError};

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm,
    Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const MIN_PASSWORD_LENGTH: usize = 8;

const SALT_LENGTH: usize = 16;
const IV_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;
const KEY_LENGTH: usize = 32;

/// An encrypted file of JSON-encoded identities, one record per line.
///
/// Each record is `hex(salt):hex(iv):hex(tag):hex(ciphertext)` under
/// AES-256-GCM with a PBKDF2-SHA256 key derived per record from the store
/// password.
pub struct Keystore {
    path: PathBuf,
}

impl Keystore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Encrypts and writes all identities, replacing the file contents.
    pub fn save(&self, identities: &[Identity], password: &str) -> Result<(), WalletError> {
        check_password(password)?;

        let mut records = Vec::with_capacity(identities.len());
        for identity in identities {
            let plaintext = serde_json::to_vec(identity)
                .map_err(|error| WalletError::Message(error.to_string()))?;
            records.push(encrypt_record(&plaintext, password)?);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, records.join("\n"))?;
        debug!("saved {} identities to {}", identities.len(), self.path.display());

        Ok(())
    }

    /// Reads and decrypts every identity in the store.
    pub fn load(&self, password: &str) -> Result<Vec<Identity>, WalletError> {
        check_password(password)?;

        let contents = fs::read_to_string(&self.path)?;
        let mut identities = Vec::new();

        for line in contents.lines().filter(|line| !line.trim().is_empty()) {
            let plaintext = decrypt_record(line, password, &self.path)?;
            let identity = serde_json::from_slice(&plaintext).map_err(|error| {
                WalletError::CorruptStore(self.path.display().to_string(), error.to_string())
            })?;
            identities.push(identity);
        }

        if identities.is_empty() {
            return Err(WalletError::EmptyStore(self.path.display().to_string()));
        }

        Ok(identities)
    }

    /// Loads the store and returns its first (active) identity.
    pub fn load_active(&self, password: &str) -> Result<Identity, WalletError> {
        let mut identities = self.load(password)?;
        Ok(identities.remove(0))
    }
}

fn check_password(password: &str) -> Result<(), WalletError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(WalletError::WeakPassword(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

fn encrypt_record(plaintext: &[u8], password: &str) -> Result<String, WalletError> {
    let mut salt = [0u8; SALT_LENGTH];
    let mut iv = [0u8; IV_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| WalletError::DecryptionFailed)?;

    let sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| WalletError::DecryptionFailed)?;

    // The AEAD appends the tag to the ciphertext; the record format keeps
    // them as separate fields.
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LENGTH);

    Ok(format!(
        "{}:{}:{}:{}",
        hex::encode(salt),
        hex::encode(iv),
        hex::encode(tag),
        hex::encode(ciphertext)
    ))
}

fn decrypt_record(record: &str, password: &str, path: &std::path::Path) -> Result<Vec<u8>, WalletError> {
    let corrupt = |reason: &str| {
        WalletError::CorruptStore(path.display().to_string(), reason.to_string())
    };

    let parts: Vec<&str> = record.trim().split(':').collect();
    if parts.len() != 4 {
        return Err(corrupt("expected salt:iv:tag:ciphertext"));
    }

    let salt = hex::decode(parts[0]).map_err(|_| corrupt("salt is not hex"))?;
    let iv = hex::decode(parts[1]).map_err(|_| corrupt("iv is not hex"))?;
    let tag = hex::decode(parts[2]).map_err(|_| corrupt("tag is not hex"))?;
    let ciphertext = hex::decode(parts[3]).map_err(|_| corrupt("ciphertext is not hex"))?;

    if salt.len() != SALT_LENGTH || iv.len() != IV_LENGTH || tag.len() != TAG_LENGTH {
        return Err(corrupt("field lengths are wrong"));
    }

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| WalletError::DecryptionFailed)?;

    let mut sealed = ciphertext;
    sealed.extend_from_slice(&tag);

    cipher
        .decrypt(Nonce::from_slice(&iv), sealed.as_slice())
        .map_err(|_| WalletError::DecryptionFailed)
}
