// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Shared logic for all frontends
//
// This crate provides:
// - AuthStore, FavouritesStore and ThemeStore with write-through persistence
// - PersistenceGate for restoring state at startup
// - SessionCoordinator for login and logout across stores
// - Auth API client, generated course catalog and configuration
//
// Frontend-specific code lives in separate crates.

pub mod auth;
pub mod auth_api;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod favourites;
pub mod gate;
mod persist;
pub mod session;
pub mod state;
pub mod storage;
pub mod theme;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use auth::{AuthAction, AuthStore, SessionState};
pub use auth_api::{AuthApi, HttpAuthApi};
pub use catalog::{CourseCatalog, MockCourseCatalog};
pub use config::AppConfig;
pub use diagnostics::{Diagnostics, StoreWarning};
pub use favourites::{Favourites, FavouritesAction, FavouritesStore};
pub use gate::{GateStatus, PersistenceGate, Rehydrated};
pub use session::SessionCoordinator;
pub use state::{AppState, Services, Startup};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use theme::{Palette, Theme, ThemeMode, ThemeStore};
pub use types::{AppError, Course, CourseLevel, User};
