//! Local persisted state and the identity providers built on it.
//!
//! The state file is a JSON object of string keys to string values. The
//! logged-in user is kept as a serialized JSON object under [`USER_KEY`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use evalform_core::error::IdentityError;
use evalform_core::model::UserProfile;
use evalform_core::traits::IdentityProvider;

/// Key under which the logged-in user is stored.
pub const USER_KEY: &str = "user";

/// String key/value state persisted in a JSON file.
#[derive(Debug, Clone)]
pub struct LocalState {
    path: PathBuf,
}

impl LocalState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read state: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse state: {}", self.path.display()))
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write state: {}", self.path.display()))
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let mut items = self.read_all()?;
        let removed = items.remove(key).is_some();
        if removed {
            self.write_all(&items)?;
        }
        Ok(removed)
    }
}

/// Persist `profile` as the logged-in user.
pub fn store_user(state: &LocalState, profile: &UserProfile) -> Result<()> {
    let raw = serde_json::to_string(profile)?;
    state.set_item(USER_KEY, &raw)
}

/// Parse a stored user record, requiring an object with a non-blank `name`.
pub fn parse_user(raw: &str) -> Result<UserProfile, IdentityError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| IdentityError::Malformed {
            reason: e.to_string(),
        })?;

    let serde_json::Value::Object(mut fields) = value else {
        return Err(IdentityError::Malformed {
            reason: "expected a JSON object".into(),
        });
    };

    match fields.remove("name") {
        Some(serde_json::Value::String(name)) if !name.trim().is_empty() => Ok(UserProfile {
            name,
            extra: fields,
        }),
        _ => Err(IdentityError::MissingName),
    }
}

/// Reads the current user from local state.
pub struct LocalStateIdentity {
    state: LocalState,
    key: String,
}

impl LocalStateIdentity {
    pub fn new(state: LocalState) -> Self {
        Self {
            state,
            key: USER_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

#[async_trait]
impl IdentityProvider for LocalStateIdentity {
    async fn current_user(&self) -> Result<UserProfile, IdentityError> {
        let raw = self
            .state
            .get_item(&self.key)
            .map_err(|e| IdentityError::Storage(format!("{e:#}")))?
            .ok_or_else(|| IdentityError::Missing {
                key: self.key.clone(),
            })?;
        parse_user(&raw)
    }
}

/// A fixed, explicitly supplied user.
pub struct StaticIdentity(pub UserProfile);

impl StaticIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(UserProfile::new(name))
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Result<UserProfile, IdentityError> {
        if self.0.name.trim().is_empty() {
            return Err(IdentityError::MissingName);
        }
        Ok(self.0.clone())
    }
}
