//! Persistence gateway.
//!
//! Backends only move strings. Each [`Key`] names the value type it holds
//! and the encoding used for it, so callers never hand-serialize.

mod keys;
mod memory;
mod sqlite;

pub use keys::*;
pub use memory::MemoryStore;
pub use sqlite::{open_pool, SqliteStore};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to encode {key}: {message}")]
    Encode { key: &'static str, message: String },

    #[error("failed to decode {key}: {message}")]
    Decode { key: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Raw string key/value backend.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub trait Encoding<T> {
    fn encode(value: &T) -> std::result::Result<String, String>;

    fn decode(raw: &str) -> std::result::Result<T, String>;
}

/// JSON document.
pub struct Json;

/// Plain `Display`/`FromStr` text, e.g. `"42"` or `"true"`.
pub struct Text;

impl<T: Serialize + DeserializeOwned> Encoding<T> for Json {
    fn encode(value: &T) -> std::result::Result<String, String> {
        serde_json::to_string(value).map_err(|error| error.to_string())
    }

    fn decode(raw: &str) -> std::result::Result<T, String> {
        serde_json::from_str(raw).map_err(|error| error.to_string())
    }
}

impl<T> Encoding<T> for Text
where
    T: Display + FromStr,
    T::Err: Display,
{
    fn encode(value: &T) -> std::result::Result<String, String> {
        Ok(value.to_string())
    }

    fn decode(raw: &str) -> std::result::Result<T, String> {
        raw.trim().parse::<T>().map_err(|error| error.to_string())
    }
}

pub struct Key<T, E> {
    name: &'static str,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<T, E> Key<T, E> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KeyValueStore>,
}

impl Store {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn load<T, E: Encoding<T>>(&self, key: &Key<T, E>) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key.name()).await? else {
            return Ok(None);
        };
        E::decode(&raw)
            .map(Some)
            .map_err(|message| StoreError::Decode {
                key: key.name(),
                message,
            })
    }

    pub async fn save<T, E: Encoding<T>>(&self, key: &Key<T, E>, value: &T) -> Result<()> {
        let raw = E::encode(value).map_err(|message| StoreError::Encode {
            key: key.name(),
            message,
        })?;
        self.backend.set(key.name(), &raw).await
    }

    /// Startup read: missing keys and unreadable values both fall back.
    pub async fn load_or<T, E: Encoding<T>>(&self, key: &Key<T, E>, fallback: T) -> T {
        match self.load(key).await {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(error) => {
                tracing::warn!(%error, key = key.name(), "ignoring stored value");
                fallback
            }
        }
    }

    /// Write-through that never fails the caller; in-memory state stays as is.
    pub async fn save_logged<T, E: Encoding<T>>(&self, key: &Key<T, E>, value: &T) {
        if let Err(error) = self.save(key, value).await {
            tracing::warn!(%error, key = key.name(), "persist failed");
        }
    }
}
