// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Favourites store
//
// Saved courses in insertion order, unique by course key.
// Every change is written through to the key-value store.

use crate::diagnostics::{Diagnostics, StoreWarning};
use crate::persist::{decode_object, WriteThrough};
use crate::storage::{KeyValueStore, FAVOURITES_KEY};
use crate::types::{AppError, Course};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Ordered favourites, no two entries share a key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FavouritesRecord", into = "FavouritesRecord")]
pub struct Favourites {
    favourites: Vec<Course>,
}

/// Persisted shape of the collection
#[derive(Serialize, Deserialize)]
struct FavouritesRecord {
    favourites: Vec<Course>,
}

impl From<FavouritesRecord> for Favourites {
    fn from(record: FavouritesRecord) -> Self {
        let before = record.favourites.len();
        let favourites = Self::from_courses(record.favourites);
        if favourites.len() != before {
            tracing::warn!(
                "Dropped {} duplicate favourites while decoding",
                before - favourites.len()
            );
        }
        favourites
    }
}

impl From<Favourites> for FavouritesRecord {
    fn from(favourites: Favourites) -> Self {
        Self {
            favourites: favourites.favourites,
        }
    }
}

impl Favourites {
    /// Build a collection, dropping later entries whose key was already seen
    pub fn from_courses(courses: Vec<Course>) -> Self {
        let mut seen = HashSet::new();
        let favourites = courses
            .into_iter()
            .filter(|course| seen.insert(course.key.clone()))
            .collect();
        Self { favourites }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.favourites.iter().any(|course| course.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Course> {
        self.favourites.iter().find(|course| course.key == key)
    }

    pub fn len(&self) -> usize {
        self.favourites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favourites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.favourites.iter()
    }

    pub fn to_vec(&self) -> Vec<Course> {
        self.favourites.clone()
    }

    fn add(&mut self, course: Course) -> bool {
        if self.contains(&course.key) {
            return false;
        }
        self.favourites.push(course);
        true
    }

    fn remove(&mut self, key: &str) -> bool {
        let original_len = self.favourites.len();
        self.favourites.retain(|course| course.key != key);
        self.favourites.len() != original_len
    }

    fn clear(&mut self) -> bool {
        let changed = !self.favourites.is_empty();
        self.favourites.clear();
        changed
    }
}

/// Operations accepted by [`FavouritesStore::dispatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum FavouritesAction {
    Add(Course),
    Remove(String),
    Clear,
}

/// Favourites collection with write-through persistence
pub struct FavouritesStore {
    state: watch::Sender<Favourites>,
    persist: WriteThrough,
}

impl FavouritesStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, diagnostics: Diagnostics) -> Self {
        Self::with_state(Favourites::default(), storage, diagnostics)
    }

    /// Create a store with rehydrated state
    pub fn with_state(
        initial: Favourites,
        storage: Arc<dyn KeyValueStore>,
        diagnostics: Diagnostics,
    ) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            persist: WriteThrough::new(storage, FAVOURITES_KEY, diagnostics),
        }
    }

    /// Apply an action in memory without persisting. Returns true if the collection changed.
    pub fn apply(&self, action: FavouritesAction) -> bool {
        self.state.send_if_modified(|favourites| match action {
            FavouritesAction::Add(course) => favourites.add(course),
            FavouritesAction::Remove(key) => favourites.remove(&key),
            FavouritesAction::Clear => favourites.clear(),
        })
    }

    /// Write the current collection to storage
    pub async fn persist(&self) -> Option<StoreWarning> {
        self.persist.write(|| self.encode()).await
    }

    /// Apply an action and write the result through to storage
    pub async fn dispatch(&self, action: FavouritesAction) -> Option<StoreWarning> {
        self.apply(action);
        self.persist().await
    }

    pub async fn add(&self, course: Course) -> Option<StoreWarning> {
        self.dispatch(FavouritesAction::Add(course)).await
    }

    pub async fn remove(&self, key: impl Into<String>) -> Option<StoreWarning> {
        self.dispatch(FavouritesAction::Remove(key.into())).await
    }

    pub async fn clear(&self) -> Option<StoreWarning> {
        self.dispatch(FavouritesAction::Clear).await
    }

    /// Add the course if absent, remove it if present.
    ///
    /// Returns whether the course is a favourite afterwards.
    pub async fn toggle(&self, course: Course) -> (bool, Option<StoreWarning>) {
        let action = if self.contains(&course.key) {
            FavouritesAction::Remove(course.key)
        } else {
            FavouritesAction::Add(course)
        };
        let now_favourite = matches!(action, FavouritesAction::Add(_));
        (now_favourite, self.dispatch(action).await)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.borrow().contains(key)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    /// Snapshot of the collection
    pub fn state(&self) -> Favourites {
        self.state.borrow().clone()
    }

    /// Saved courses in insertion order
    pub fn list(&self) -> Vec<Course> {
        self.state.borrow().to_vec()
    }

    /// Receiver notified with the whole collection on every change
    pub fn subscribe(&self) -> watch::Receiver<Favourites> {
        self.state.subscribe()
    }

    fn encode(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(&*self.state.borrow())?)
    }
}

/// Decode a persisted favourites payload, dropping duplicate keys
pub fn decode_favourites(raw: &str) -> Result<Favourites, AppError> {
    decode_object(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{course, FlakyStore};

    fn new_store(storage: Arc<FlakyStore>) -> FavouritesStore {
        FavouritesStore::new(storage, Diagnostics::new())
    }

    fn keys(store: &FavouritesStore) -> Vec<String> {
        store.list().into_iter().map(|c| c.key).collect()
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let store = new_store(Arc::new(FlakyStore::new()));
        let c = course("course-1", "X");

        store.add(c.clone()).await;
        store.add(c.clone()).await;

        assert_eq!(store.len(), 1);
        assert!(store.contains("course-1"));
    }

    #[tokio::test]
    async fn test_duplicate_key_keeps_first_entry() {
        let store = new_store(Arc::new(FlakyStore::new()));
        store.add(course("course-1", "First")).await;
        store.add(course("course-1", "Second")).await;

        assert_eq!(store.list()[0].title, "First");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_insertion_order_preserved() {
        let store = new_store(Arc::new(FlakyStore::new()));
        for key in ["c", "a", "b"] {
            store.add(course(key, key)).await;
        }
        store.add(course("a", "again")).await;
        assert_eq!(keys(&store), vec!["c", "a", "b"]);

        store.remove("a").await;
        store.add(course("a", "a")).await;
        assert_eq!(keys(&store), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let store = new_store(Arc::new(FlakyStore::new()));
        assert!(!store.apply(FavouritesAction::Remove("missing".to_string())));
        assert!(store.is_empty());

        store.add(course("course-1", "X")).await;
        store.remove("missing").await;
        assert_eq!(keys(&store), vec!["course-1"]);

        store.remove("course-1").await;
        store.remove("course-1").await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_collection() {
        let store = new_store(Arc::new(FlakyStore::new()));
        store.add(course("a", "A")).await;
        store.add(course("b", "B")).await;

        store.clear().await;
        assert!(store.is_empty());
        assert!(!store.apply(FavouritesAction::Clear));
    }

    #[tokio::test]
    async fn test_toggle() {
        let store = new_store(Arc::new(FlakyStore::new()));
        let c = course("course-1", "X");

        let (added, _) = store.toggle(c.clone()).await;
        assert!(added);
        assert!(store.contains("course-1"));

        let (added, _) = store.toggle(c).await;
        assert!(!added);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_every_mutation_writes_through() {
        let storage = Arc::new(FlakyStore::new());
        let store = new_store(storage.clone());

        store.add(course("a", "A")).await;
        store.add(course("b", "B")).await;
        store.remove("a").await;

        let raw = storage.get(FAVOURITES_KEY).await.unwrap().unwrap();
        assert_eq!(decode_favourites(&raw).unwrap(), store.state());
        assert_eq!(storage.writes(), 3);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_not_raised() {
        let storage = Arc::new(FlakyStore::new());
        let diagnostics = Diagnostics::new();
        let events = diagnostics.subscribe();
        let store = FavouritesStore::new(storage.clone(), diagnostics);

        storage.fail_writes(true);
        let warning = store.add(course("a", "A")).await;

        assert!(matches!(warning, Some(StoreWarning::WriteFailed { .. })));
        assert!(store.contains("a"));
        assert_eq!(events.try_recv().unwrap().key(), FAVOURITES_KEY);
    }

    #[test]
    fn test_decode_drops_duplicates() {
        let payload = serde_json::to_string(&serde_json::json!({
            "favourites": [course("a", "A"), course("b", "B"), course("a", "A2")]
        }))
        .unwrap();

        let favourites = decode_favourites(&payload).unwrap();
        assert_eq!(favourites.len(), 2);
        assert_eq!(favourites.get("a").unwrap().title, "A");
    }

    #[test]
    fn test_deserialize_keeps_keys_unique() {
        let payload = serde_json::json!({
            "favourites": [course("a", "A"), course("a", "A2"), course("b", "B")]
        });

        let favourites: Favourites = serde_json::from_value(payload).unwrap();
        assert_eq!(favourites.len(), 2);
        assert_eq!(favourites.get("a").unwrap().title, "A");
        assert_eq!(
            favourites.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(decode_favourites("{\"favourites\": 3}").is_err());
        assert!(decode_favourites("").is_err());
        assert!(decode_favourites("[[]]").is_err());
        assert!(decode_favourites("3").is_err());
    }
}
