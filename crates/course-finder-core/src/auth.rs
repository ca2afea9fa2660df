// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Auth store
//
// Holds the signed-in user. The authenticated flag is derived from the
// user, so a session can never claim to be authenticated without one.

use crate::diagnostics::{Diagnostics, StoreWarning};
use crate::persist::{decode_object, WriteThrough};
use crate::storage::{KeyValueStore, AUTH_KEY};
use crate::types::{AppError, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Current session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SessionRecord", into = "SessionRecord")]
pub struct SessionState {
    user: Option<User>,
}

impl SessionState {
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Persisted shape of a session
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    is_authenticated: bool,
}

impl From<SessionRecord> for SessionState {
    fn from(record: SessionRecord) -> Self {
        if record.is_authenticated != record.user.is_some() {
            tracing::warn!(
                "Persisted session flag disagrees with user presence, trusting the user field"
            );
        }
        Self { user: record.user }
    }
}

impl From<SessionState> for SessionRecord {
    fn from(state: SessionState) -> Self {
        Self {
            is_authenticated: state.user.is_some(),
            user: state.user,
        }
    }
}

/// Operations accepted by [`AuthStore::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    LoginSuccess(User),
    Logout,
    UpdateProfileImage(String),
}

/// Session state with write-through persistence
pub struct AuthStore {
    state: watch::Sender<SessionState>,
    persist: WriteThrough,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, diagnostics: Diagnostics) -> Self {
        Self::with_state(SessionState::default(), storage, diagnostics)
    }

    /// Create a store with rehydrated state
    pub fn with_state(
        initial: SessionState,
        storage: Arc<dyn KeyValueStore>,
        diagnostics: Diagnostics,
    ) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            persist: WriteThrough::new(storage, AUTH_KEY, diagnostics),
        }
    }

    /// Apply an action in memory without persisting. Returns true if the state changed.
    pub fn apply(&self, action: AuthAction) -> bool {
        self.state.send_if_modified(|state| match action {
            AuthAction::LoginSuccess(user) => {
                tracing::info!("Signed in as {}", user.username);
                state.user = Some(user);
                true
            }
            AuthAction::Logout => {
                if let Some(user) = state.user.take() {
                    tracing::info!("Signed out {}", user.username);
                    true
                } else {
                    false
                }
            }
            AuthAction::UpdateProfileImage(image) => match state.user.as_mut() {
                Some(user) => {
                    user.profile_image = Some(image);
                    true
                }
                None => {
                    tracing::debug!("Ignoring profile image update without a user");
                    false
                }
            },
        })
    }

    /// Write the current session to storage
    pub async fn persist(&self) -> Option<StoreWarning> {
        self.persist.write(|| self.encode()).await
    }

    /// Apply an action and write the result through to storage
    pub async fn dispatch(&self, action: AuthAction) -> Option<StoreWarning> {
        self.apply(action);
        self.persist().await
    }

    pub async fn login_success(&self, user: User) -> Option<StoreWarning> {
        self.dispatch(AuthAction::LoginSuccess(user)).await
    }

    pub async fn logout(&self) -> Option<StoreWarning> {
        self.dispatch(AuthAction::Logout).await
    }

    pub async fn update_profile_image(&self, image: impl Into<String>) -> Option<StoreWarning> {
        self.dispatch(AuthAction::UpdateProfileImage(image.into()))
            .await
    }

    /// Snapshot of the current session
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receiver notified with the whole session on every change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn encode(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(&*self.state.borrow())?)
    }
}

/// Decode a persisted session payload
pub fn decode_session(raw: &str) -> Result<SessionState, AppError> {
    decode_object(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyStore;

    fn alice() -> User {
        let mut user = User::new("alice");
        user.email = "alice@example.com".to_string();
        user.first_name = Some("Alice".to_string());
        user
    }

    fn new_store(storage: Arc<FlakyStore>) -> AuthStore {
        AuthStore::new(storage, Diagnostics::new())
    }

    fn assert_invariant(store: &AuthStore) {
        let state = store.state();
        assert_eq!(state.is_authenticated(), state.user().is_some());
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let storage = Arc::new(FlakyStore::new());
        let store = new_store(storage.clone());
        assert!(!store.is_authenticated());
        assert_invariant(&store);

        assert!(store.login_success(alice()).await.is_none());
        assert!(store.is_authenticated());
        assert_eq!(store.current_user().unwrap().username, "alice");
        assert_invariant(&store);

        store.logout().await;
        assert!(!store.is_authenticated());
        assert_eq!(store.current_user(), None);
        assert_invariant(&store);
        assert_eq!(storage.writes(), 2);
    }

    #[tokio::test]
    async fn test_login_replaces_user_wholesale() {
        let store = new_store(Arc::new(FlakyStore::new()));
        store.login_success(alice()).await;
        store.update_profile_image("file:///me.png").await;

        store.login_success(User::new("bob")).await;
        let user = store.current_user().unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.profile_image, None);
    }

    #[tokio::test]
    async fn test_update_profile_image_preserves_other_fields() {
        let store = new_store(Arc::new(FlakyStore::new()));
        store.login_success(alice()).await;

        store.update_profile_image("file:///me.png").await;

        let user = store.current_user().unwrap();
        assert_eq!(user.profile_image.as_deref(), Some("file:///me.png"));
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.first_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_update_profile_image_without_user_is_noop() {
        let store = new_store(Arc::new(FlakyStore::new()));
        assert!(!store.apply(AuthAction::UpdateProfileImage("x.png".to_string())));
        assert_eq!(store.state(), SessionState::default());
        assert_invariant(&store);
    }

    #[tokio::test]
    async fn test_persisted_snapshot_matches_memory() {
        let storage = Arc::new(FlakyStore::new());
        let store = new_store(storage.clone());

        store.login_success(alice()).await;
        let raw = storage.get(AUTH_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["isAuthenticated"], true);
        assert_eq!(value["user"]["username"], "alice");
        assert_eq!(decode_session(&raw).unwrap(), store.state());

        store.logout().await;
        let raw = storage.get(AUTH_KEY).await.unwrap().unwrap();
        assert_eq!(decode_session(&raw).unwrap(), SessionState::default());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let storage = Arc::new(FlakyStore::new());
        let store = new_store(storage.clone());
        storage.fail_writes(true);

        let warning = store.login_success(alice()).await;
        assert!(matches!(warning, Some(StoreWarning::WriteFailed { .. })));
        assert!(store.is_authenticated());

        storage.fail_writes(false);
        assert!(store.persist().await.is_none());
        let raw = storage.get(AUTH_KEY).await.unwrap().unwrap();
        assert!(decode_session(&raw).unwrap().is_authenticated());
    }

    #[test]
    fn test_decode_derives_flag_from_user() {
        let state = decode_session(r#"{"user":null,"isAuthenticated":true}"#).unwrap();
        assert!(!state.is_authenticated());

        let state = decode_session(r#"{"user":{"username":"alice"},"isAuthenticated":false}"#)
            .unwrap();
        assert!(state.is_authenticated());

        assert!(decode_session("not json").is_err());
        assert!(decode_session("[]").is_err());
        assert!(decode_session("3").is_err());
        assert!(decode_session("null").is_err());
        assert_eq!(decode_session("{}").unwrap(), SessionState::default());
    }

    #[tokio::test]
    async fn test_subscribers_receive_whole_state() {
        let store = new_store(Arc::new(FlakyStore::new()));
        let mut rx = store.subscribe();

        store.login_success(alice()).await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());

        // logging out twice only notifies once
        store.logout().await;
        rx.borrow_and_update();
        store.logout().await;
        assert!(!rx.has_changed().unwrap());
    }
}
