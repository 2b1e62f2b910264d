// Allow dead code: Infrastructure methods for future use
#![allow(dead_code)]

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::warn;

const SERVICE_NAME: &str = "tornwatch";

/// Keychain entry name for the Torn limited-access key
const TORN_KEY_ENTRY: &str = "torn-api-key";

/// Keychain entry name for the optional FFScouter key
const FFSCOUTER_KEY_ENTRY: &str = "ffscouter-api-key";

/// OS keychain storage for the two API keys.
pub struct CredentialStore;

impl CredentialStore {
    fn entry(name: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, name).context("Failed to create keyring entry")
    }

    pub fn store_torn_key(key: &str) -> Result<()> {
        Self::entry(TORN_KEY_ENTRY)?
            .set_password(key)
            .context("Failed to store Torn key in keychain")
    }

    pub fn get_torn_key() -> Result<String> {
        Self::entry(TORN_KEY_ENTRY)?
            .get_password()
            .context("Failed to retrieve Torn key from keychain")
    }

    pub fn store_ffscouter_key(key: &str) -> Result<()> {
        Self::entry(FFSCOUTER_KEY_ENTRY)?
            .set_password(key)
            .context("Failed to store FFScouter key in keychain")
    }

    pub fn get_ffscouter_key() -> Result<String> {
        Self::entry(FFSCOUTER_KEY_ENTRY)?
            .get_password()
            .context("Failed to retrieve FFScouter key from keychain")
    }

    pub fn delete_torn_key() -> Result<()> {
        Self::entry(TORN_KEY_ENTRY)?
            .delete_credential()
            .context("Failed to delete Torn key from keychain")
    }

    pub fn delete_ffscouter_key() -> Result<()> {
        Self::entry(FFSCOUTER_KEY_ENTRY)?
            .delete_credential()
            .context("Failed to delete FFScouter key from keychain")
    }
}

/// The two API keys, resolved at startup. Env vars take precedence over
/// the keychain so that `.env` files work for development.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub torn_key: Option<String>,
    pub ffscouter_key: Option<String>,
}

impl Credentials {
    /// Resolve keys from `TORN_API_KEY` / `FFSCOUTER_API_KEY` env vars,
    /// falling back to the OS keychain.
    pub fn load() -> Self {
        let torn_key = std::env::var("TORN_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| CredentialStore::get_torn_key().ok());

        let ffscouter_key = std::env::var("FFSCOUTER_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| CredentialStore::get_ffscouter_key().ok());

        Self { torn_key, ffscouter_key }
    }

    pub fn has_torn_key(&self) -> bool {
        self.torn_key.as_deref().map(|k| !k.is_empty()).unwrap_or(false)
    }

    pub fn has_ffscouter_key(&self) -> bool {
        self.ffscouter_key.as_deref().map(|k| !k.is_empty()).unwrap_or(false)
    }

    /// Persist the Torn key to the keychain and keep it in memory.
    pub fn set_torn_key(&mut self, key: String) {
        if let Err(e) = CredentialStore::store_torn_key(&key) {
            warn!(error = %e, "Failed to store Torn key in keychain");
        }
        self.torn_key = Some(key);
    }

    /// Persist or clear the FFScouter key. Clearing removes the
    /// keychain entry so a stale key never resurfaces.
    pub fn set_ffscouter_key(&mut self, key: Option<String>) {
        match key {
            Some(key) => {
                if let Err(e) = CredentialStore::store_ffscouter_key(&key) {
                    warn!(error = %e, "Failed to store FFScouter key in keychain");
                }
                self.ffscouter_key = Some(key);
            }
            None => {
                let _ = CredentialStore::delete_ffscouter_key();
                self.ffscouter_key = None;
            }
        }
    }
}

/// Mask a key for display, keeping the first three characters visible.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 3 {
        return key.to_string();
    }
    let visible: String = chars[..3].iter().collect();
    format!("{}{}", visible, "\u{2022}".repeat(chars.len() - 3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "");
        assert_eq!(mask_key("abc"), "abc");
        assert_eq!(mask_key("abcdef"), "abc\u{2022}\u{2022}\u{2022}");
    }

    #[test]
    fn test_credentials_has_key() {
        let creds = Credentials { torn_key: Some("LLHrCIqC3Tfp0yJc".to_string()), ffscouter_key: None };
        assert!(creds.has_torn_key());
        assert!(!creds.has_ffscouter_key());

        let empty = Credentials { torn_key: Some(String::new()), ffscouter_key: None };
        assert!(!empty.has_torn_key());
    }
}
