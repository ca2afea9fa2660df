// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated user profile as returned by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Numeric id assigned by the auth service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Avatar URL supplied by the auth service
    #[serde(default)]
    pub image: Option<String>,
    /// Locally chosen profile picture, overrides `image` when set
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl User {
    /// Create a user with only a username
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: String::new(),
            phone: None,
            first_name: None,
            last_name: None,
            image: None,
            profile_image: None,
            access_token: None,
        }
    }

    /// Full name if known, otherwise the username
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.username.clone(),
        }
    }

    /// Image to show for this user
    pub fn avatar(&self) -> Option<&str> {
        self.profile_image.as_deref().or(self.image.as_deref())
    }
}

/// Difficulty level of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}

/// A catalog entry. Never mutated after the catalog produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier, also the favourites membership key
    pub key: String,
    pub title: String,
    pub instructor: String,
    pub category: String,
    pub level: CourseLevel,
    #[serde(default)]
    pub duration: String,
    /// Average rating between 4.0 and 5.0, one decimal place
    pub rating: f32,
    pub students: u32,
    /// Price in whole dollars
    pub price: u32,
    pub thumbnail: String,
    pub description: String,
    pub last_updated: String,
}

impl Course {
    /// Case-insensitive match against title, instructor and category
    pub fn matches(&self, text: &str) -> bool {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.title, &self.instructor, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Validation(String),

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileIo(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}
