// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Write-through helper shared by the stores

use crate::diagnostics::{Diagnostics, StoreWarning};
use crate::storage::KeyValueStore;
use crate::types::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns one storage key and serializes writes to it
pub(crate) struct WriteThrough {
    storage: Arc<dyn KeyValueStore>,
    key: &'static str,
    diagnostics: Diagnostics,
    write_lock: Mutex<()>,
}

impl WriteThrough {
    pub fn new(storage: Arc<dyn KeyValueStore>, key: &'static str, diagnostics: Diagnostics) -> Self {
        Self {
            storage,
            key,
            diagnostics,
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Read the raw value. Failures are reported and returned as warnings.
    pub async fn read(&self) -> Result<Option<String>, StoreWarning> {
        self.storage.get(self.key).await.map_err(|e| {
            self.diagnostics.report(StoreWarning::ReadFailed {
                key: self.key.to_string(),
                reason: e.to_string(),
            })
        })
    }

    /// Encode the current state and store it.
    ///
    /// `encode` runs after the previous write has finished, so the value on
    /// disk always ends up matching the latest in-memory state.
    pub async fn write<F>(&self, encode: F) -> Option<StoreWarning>
    where
        F: FnOnce() -> Result<String, AppError>,
    {
        let _guard = self.write_lock.lock().await;

        let result = match encode() {
            Ok(value) => self.storage.set(self.key, &value).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => None,
            Err(e) => Some(self.diagnostics.report(StoreWarning::WriteFailed {
                key: self.key.to_string(),
                reason: e.to_string(),
            })),
        }
    }

    /// Report a payload that could not be decoded
    pub fn decode_failed(&self, reason: impl ToString) -> StoreWarning {
        self.diagnostics.report(StoreWarning::DecodeFailed {
            key: self.key.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// Decode a persisted payload whose top level must be a JSON object.
///
/// serde's derived structs also accept the sequence form, so `[]` would
/// otherwise decode as an all-default record.
pub(crate) fn decode_object<T: DeserializeOwned>(raw: &str) -> Result<T, AppError> {
    match serde_json::from_str::<Value>(raw)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
        other => Err(AppError::Serialization(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
