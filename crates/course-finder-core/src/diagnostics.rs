// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Store diagnostics
//
// Persistence problems never reach the UI as errors. They are logged and
// published here so frontends and tests can observe them.

use async_channel::{Receiver, Sender};
use std::fmt;
use std::sync::{Arc, Mutex};

/// A persistence problem that was absorbed by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWarning {
    ReadFailed { key: String, reason: String },
    WriteFailed { key: String, reason: String },
    DecodeFailed { key: String, reason: String },
}

impl StoreWarning {
    /// Storage key the warning refers to
    pub fn key(&self) -> &str {
        match self {
            Self::ReadFailed { key, .. }
            | Self::WriteFailed { key, .. }
            | Self::DecodeFailed { key, .. } => key,
        }
    }
}

impl fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { key, reason } => write!(f, "failed to read '{}': {}", key, reason),
            Self::WriteFailed { key, reason } => write!(f, "failed to write '{}': {}", key, reason),
            Self::DecodeFailed { key, reason } => {
                write!(f, "failed to decode '{}': {}", key, reason)
            }
        }
    }
}

/// Cloneable handle that logs warnings and fans them out to subscribers
#[derive(Clone, Default)]
pub struct Diagnostics {
    subscribers: Arc<Mutex<Vec<Sender<StoreWarning>>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the warning and forward it to every live subscriber
    pub fn report(&self, warning: StoreWarning) -> StoreWarning {
        tracing::warn!("{}", warning);
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.try_send(warning.clone()).is_ok());
        warning
    }

    /// Receiver for every warning reported from now on.
    ///
    /// Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> Receiver<StoreWarning> {
        let (tx, rx) = async_channel::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }
}
