// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Test doubles shared by unit tests

use crate::storage::{KeyValueStore, MemoryKeyValueStore};
use crate::types::{AppError, Course, CourseLevel};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory store whose reads and writes can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<const N: usize>(values: [(&str, &str); N]) -> Self {
        Self {
            inner: MemoryKeyValueStore::with_values(values),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::FileIo("read refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::FileIo("write refused".to_string()));
        }
        self.inner.set(key, value).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.inner.remove(key).await
    }
}

pub fn course(key: &str, title: &str) -> Course {
    Course {
        key: key.to_string(),
        title: title.to_string(),
        instructor: "Dr. John Smith".to_string(),
        category: "Programming".to_string(),
        level: CourseLevel::Beginner,
        duration: "8 weeks".to_string(),
        rating: 4.2,
        students: 2500,
        price: 59,
        thumbnail: "https://example.com/thumb.jpg".to_string(),
        description: format!("Learn {} from industry experts.", title.to_lowercase()),
        last_updated: "2024".to_string(),
    }
}
