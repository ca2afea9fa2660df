// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Application state
//
// Composition root: builds the collaborators, runs the persistence gate
// and the theme load, and hands frontends one struct holding every store.

use crate::auth::AuthStore;
use crate::auth_api::{AuthApi, HttpAuthApi};
use crate::catalog::{CourseCatalog, MockCourseCatalog};
use crate::config::AppConfig;
use crate::diagnostics::{Diagnostics, StoreWarning};
use crate::favourites::FavouritesStore;
use crate::gate::{GateStatus, PersistenceGate};
use crate::session::SessionCoordinator;
use crate::storage::{FileKeyValueStore, KeyValueStore};
use crate::theme::ThemeStore;
use crate::types::AppError;
use std::sync::Arc;
use tokio::sync::watch;

/// External collaborators the stores depend on
#[derive(Clone)]
pub struct Services {
    pub storage: Arc<dyn KeyValueStore>,
    pub auth_api: Arc<dyn AuthApi>,
    pub catalog: Arc<dyn CourseCatalog>,
}

impl Services {
    /// File storage, HTTP login and the generated catalog, as configured
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        config.validate()?;

        let storage = FileKeyValueStore::open(config.data_dir()?).await?;
        let auth_api = HttpAuthApi::new(&config.auth_endpoint, config.request_timeout())?;
        let catalog = MockCourseCatalog::new(
            config.catalog_delay(),
            config.page_size,
            &config.default_query,
        );

        Ok(Self {
            storage: Arc::new(storage),
            auth_api: Arc::new(auth_api),
            catalog: Arc::new(catalog),
        })
    }
}

/// Everything a frontend needs once startup has finished
pub struct AppState {
    pub config: AppConfig,
    pub diagnostics: Diagnostics,
    pub theme: Arc<ThemeStore>,
    pub auth: Arc<AuthStore>,
    pub favourites: Arc<FavouritesStore>,
    pub session: SessionCoordinator,
    pub catalog: Arc<dyn CourseCatalog>,
    /// Problems absorbed during startup
    pub startup_warnings: Vec<StoreWarning>,
}

impl AppState {
    /// Run startup to completion
    pub async fn bootstrap(config: AppConfig, services: Services) -> Self {
        Startup::new(config, services).finish().await
    }

    /// Build from configuration with the default collaborators
    pub async fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let services = Services::from_config(&config).await?;
        Ok(Self::bootstrap(config, services).await)
    }
}

/// Startup in progress. Frontends watch [`Startup::status`] to show a
/// loading indicator until [`Startup::finish`] resolves.
pub struct Startup {
    config: AppConfig,
    services: Services,
    diagnostics: Diagnostics,
    gate: PersistenceGate,
    theme: ThemeStore,
}

impl Startup {
    pub fn new(config: AppConfig, services: Services) -> Self {
        let diagnostics = Diagnostics::new();
        let gate = PersistenceGate::new(services.storage.clone(), diagnostics.clone());
        let theme = ThemeStore::new(services.storage.clone(), diagnostics.clone());
        Self {
            config,
            services,
            diagnostics,
            gate,
            theme,
        }
    }

    pub fn status(&self) -> watch::Receiver<GateStatus> {
        self.gate.status()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Rehydrate the stores and load the theme. Never fails.
    pub async fn finish(self) -> AppState {
        let (rehydrated, theme_warning) = tokio::join!(self.gate.open(), self.theme.load());

        let auth = Arc::new(rehydrated.auth);
        let favourites = Arc::new(rehydrated.favourites);
        let session = SessionCoordinator::new(
            auth.clone(),
            favourites.clone(),
            self.services.auth_api.clone(),
        );

        let mut startup_warnings = rehydrated.warnings;
        startup_warnings.extend(theme_warning);

        tracing::info!("Startup complete");
        AppState {
            config: self.config,
            diagnostics: self.diagnostics,
            theme: Arc::new(self.theme),
            auth,
            favourites,
            session,
            catalog: self.services.catalog,
            startup_warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryKeyValueStore, FAVOURITES_KEY, THEME_KEY};
    use crate::testing::FlakyStore;
    use crate::theme::ThemeMode;
    use crate::types::User;
    use async_trait::async_trait;
    use std::time::Duration;

    struct AcceptAll;

    #[async_trait]
    impl AuthApi for AcceptAll {
        async fn login(&self, username: &str, _password: &str) -> Result<User, AppError> {
            Ok(User::new(username))
        }
    }

    fn services(storage: Arc<dyn KeyValueStore>) -> Services {
        Services {
            storage,
            auth_api: Arc::new(AcceptAll),
            catalog: Arc::new(MockCourseCatalog::new(
                Duration::ZERO,
                20,
                "computer science",
            )),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_session() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let app = AppState::bootstrap(AppConfig::default(), services(storage)).await;

        let user = app.session.login("alice", "alicepass").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(app.auth.is_authenticated());

        let courses = app.catalog.fetch_courses("computer science").await.unwrap();
        let mut first = courses[0].clone();
        first.key = "course-1".to_string();
        first.title = "X".to_string();

        app.favourites.add(first.clone()).await;
        app.favourites.add(first).await;
        assert_eq!(app.favourites.len(), 1);

        app.session.perform_logout().await;
        let session = app.auth.state();
        assert!(session.user().is_none());
        assert!(!session.is_authenticated());
        assert_eq!(app.favourites.len(), 0);
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        {
            let app = AppState::bootstrap(AppConfig::default(), services(storage.clone())).await;
            app.session.login("alice", "pw").await.unwrap();
            let course = app.catalog.fetch_courses("marketing").await.unwrap().remove(0);
            app.favourites.add(course).await;
            app.theme.toggle().await;
        }

        let app = AppState::bootstrap(AppConfig::default(), services(storage)).await;
        assert_eq!(app.auth.current_user().unwrap().username, "alice");
        assert_eq!(app.favourites.list()[0].title, "Digital Marketing Strategy");
        assert_eq!(app.theme.mode(), ThemeMode::Dark);
        assert!(app.startup_warnings.is_empty());
    }

    #[tokio::test]
    async fn test_startup_absorbs_corruption() {
        let storage = Arc::new(FlakyStore::with_values([
            (FAVOURITES_KEY, "]["),
            (THEME_KEY, "dark"),
        ]));
        let startup = Startup::new(AppConfig::default(), services(storage));
        let status = startup.status();
        let events = startup.diagnostics().subscribe();

        let app = startup.finish().await;

        assert_eq!(*status.borrow(), GateStatus::Ready);
        assert!(app.favourites.is_empty());
        assert!(app.theme.is_dark_mode());
        assert_eq!(app.startup_warnings.len(), 1);
        assert_eq!(events.try_recv().unwrap().key(), FAVOURITES_KEY);
    }

    #[tokio::test]
    async fn test_from_config_uses_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            catalog_delay_ms: 0,
            ..AppConfig::default()
        };

        let app = AppState::from_config(config).await.unwrap();
        app.theme.toggle().await;

        assert!(dir.path().join("theme.json").exists());
    }
}
