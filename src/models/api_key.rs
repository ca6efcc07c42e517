//! API Key model for authentication.
//!
//! API keys come from configuration and are hashed with SHA-256 once at
//! startup. Only the hashes are kept in memory afterwards.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

/// A registered API key.
#[derive(Debug, Clone)]
pub struct ApiKey {
    /// Human-readable name of the key owner, used in logs
    pub name: String,

    /// SHA-256 hash of the actual API key (64 hex characters)
    pub key_hash: String,
}

/// Immutable set of API keys, indexed by hash.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyRegistry {
    keys: HashMap<String, ApiKey>,
}

/// Hash a raw API key the way the registry stores it.
pub fn hash_key(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

impl ApiKeyRegistry {
    /// Build the registry from `secret` or `name:secret` entries.
    ///
    /// Blank entries are skipped. Unnamed keys are named after the first
    /// eight characters of their hash.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = HashMap::new();

        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }

            let (name, secret) = match entry.split_once(':') {
                Some((name, secret)) if !name.is_empty() && !secret.is_empty() => {
                    (Some(name), secret)
                }
                _ => (None, entry),
            };

            let key_hash = hash_key(secret);
            let name = name
                .map(str::to_string)
                .unwrap_or_else(|| key_hash[..8].to_string());

            keys.insert(key_hash.clone(), ApiKey { name, key_hash });
        }

        Self { keys }
    }

    /// Look up a raw key presented by a client.
    pub fn verify(&self, raw: &str) -> Option<&ApiKey> {
        self.keys.get(&hash_key(raw))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
