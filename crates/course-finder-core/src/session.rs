// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Session coordinator
//
// Owns the operations that span more than one store: login (network call
// followed by the auth store update) and logout (auth store and favourites
// cleared together).

use crate::auth::{AuthAction, AuthStore};
use crate::auth_api::{validate_credentials, AuthApi};
use crate::diagnostics::StoreWarning;
use crate::favourites::{FavouritesAction, FavouritesStore};
use crate::types::User;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Message returned when a second login is started before the first resolves
pub const LOGIN_IN_PROGRESS: &str = "Login already in progress";

pub struct SessionCoordinator {
    auth: Arc<AuthStore>,
    favourites: Arc<FavouritesStore>,
    auth_api: Arc<dyn AuthApi>,
    login_in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the login attempt ends
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionCoordinator {
    pub fn new(
        auth: Arc<AuthStore>,
        favourites: Arc<FavouritesStore>,
        auth_api: Arc<dyn AuthApi>,
    ) -> Self {
        Self {
            auth,
            favourites,
            auth_api,
            login_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a login request is pending; screens use it to disable the button
    pub fn is_login_in_flight(&self) -> bool {
        self.login_in_flight.load(Ordering::SeqCst)
    }

    /// Authenticate and record the user.
    ///
    /// On failure the session is left untouched and the reason is returned
    /// as a message suitable for display.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, String> {
        validate_credentials(username, password).map_err(|e| e.to_string())?;

        if self
            .login_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(LOGIN_IN_PROGRESS.to_string());
        }
        let _in_flight = InFlight(self.login_in_flight.clone());

        let user = self
            .auth_api
            .login(username.trim(), password)
            .await
            .map_err(|e| {
                tracing::warn!("Login failed for {}: {}", username.trim(), e);
                e.to_string()
            })?;

        // persistence problems are already reported through diagnostics
        let _ = self.auth.login_success(user.clone()).await;
        Ok(user)
    }

    /// Sign out and drop the favourites in one step.
    ///
    /// Both in-memory changes land before anything is written, so no
    /// observer sees a signed-out session that still has favourites.
    pub async fn perform_logout(&self) -> Vec<StoreWarning> {
        self.auth.apply(AuthAction::Logout);
        self.favourites.apply(FavouritesAction::Clear);

        let (auth_warning, favourites_warning) =
            tokio::join!(self.auth.persist(), self.favourites.persist());

        auth_warning.into_iter().chain(favourites_warning).collect()
    }
}
