//! Credential management for the two API keys.
//!
//! This module provides:
//! - `CredentialStore`: secure OS-level key storage via keyring
//! - `Credentials`: resolved keys with env-var override for development
//!
//! The Torn limited-access key is required; the FFScouter key is
//! optional and only enables the stat-estimate columns.

pub mod credentials;

pub use credentials::{mask_key, CredentialStore, Credentials};
