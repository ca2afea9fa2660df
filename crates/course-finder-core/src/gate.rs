// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Persistence gate
//
// Restores the session and favourites before anything interactive runs.
// Each payload is restored or defaulted on its own; the gate never fails.

use crate::auth::{decode_session, AuthStore, SessionState};
use crate::diagnostics::{Diagnostics, StoreWarning};
use crate::favourites::{decode_favourites, Favourites, FavouritesStore};
use crate::persist::WriteThrough;
use crate::storage::{KeyValueStore, AUTH_KEY, FAVOURITES_KEY};
use crate::types::AppError;
use std::sync::Arc;
use tokio::sync::watch;

/// Whether rehydration has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Loading,
    Ready,
}

/// Stores restored by [`PersistenceGate::open`]
pub struct Rehydrated {
    pub auth: AuthStore,
    pub favourites: FavouritesStore,
    /// Problems absorbed while restoring
    pub warnings: Vec<StoreWarning>,
}

pub struct PersistenceGate {
    storage: Arc<dyn KeyValueStore>,
    diagnostics: Diagnostics,
    status: watch::Sender<GateStatus>,
}

impl PersistenceGate {
    pub fn new(storage: Arc<dyn KeyValueStore>, diagnostics: Diagnostics) -> Self {
        let (status, _) = watch::channel(GateStatus::Loading);
        Self {
            storage,
            diagnostics,
            status,
        }
    }

    /// Watch this to decide between the loading indicator and the app
    pub fn status(&self) -> watch::Receiver<GateStatus> {
        self.status.subscribe()
    }

    /// Restore both stores. Consumes the gate, so it can only open once.
    pub async fn open(self) -> Rehydrated {
        tracing::info!("Rehydrating session and favourites");

        let auth_slot = WriteThrough::new(self.storage.clone(), AUTH_KEY, self.diagnostics.clone());
        let favourites_slot = WriteThrough::new(
            self.storage.clone(),
            FAVOURITES_KEY,
            self.diagnostics.clone(),
        );

        let (session, favourites) = tokio::join!(
            restore(&auth_slot, decode_session),
            restore(&favourites_slot, decode_favourites),
        );

        let mut warnings = Vec::new();
        let session: SessionState = session.unwrap_or_else(|w| {
            warnings.push(w);
            SessionState::default()
        });
        let favourites: Favourites = favourites.unwrap_or_else(|w| {
            warnings.push(w);
            Favourites::default()
        });

        tracing::info!(
            "Rehydrated: authenticated={}, favourites={}, warnings={}",
            session.is_authenticated(),
            favourites.len(),
            warnings.len()
        );

        let rehydrated = Rehydrated {
            auth: AuthStore::with_state(session, self.storage.clone(), self.diagnostics.clone()),
            favourites: FavouritesStore::with_state(
                favourites,
                self.storage.clone(),
                self.diagnostics.clone(),
            ),
            warnings,
        };

        self.status.send_replace(GateStatus::Ready);
        rehydrated
    }
}

/// Read and decode one key. Missing values decode to the default.
async fn restore<T, F>(slot: &WriteThrough, decode: F) -> Result<T, StoreWarning>
where
    T: Default,
    F: Fn(&str) -> Result<T, AppError>,
{
    match slot.read().await? {
        None => {
            tracing::debug!("Nothing persisted under '{}'", slot.key());
            Ok(T::default())
        }
        Some(raw) => decode(&raw).map_err(|e| slot.decode_failed(e)),
    }
}
