//! Blog post model and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::slugify;
use crate::errors::AppError;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// A blog post. `content` is always stored sanitized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub category: String,
    pub read_time: u32,
    pub featured: bool,
    pub status: PostStatus,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

/// Request body for creating a new post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub intro: Option<String>,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub featured: bool,
    pub status: PostStatus,
    pub author: String,
    /// Explicit estimate; zero or absent means "derive from content"
    #[serde(default)]
    pub read_time: Option<u32>,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_title(&self.title)?;
        require("Content", &self.content)?;
        require("Category", &self.category)?;
        require("Author", &self.author)?;
        Ok(())
    }
}

/// Request body for a partial post update. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub read_time: Option<u32>,
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            require_title(title)?;
        }
        if let Some(content) = &self.content {
            require("Content", content)?;
        }
        if let Some(category) = &self.category {
            require("Category", category)?;
        }
        if let Some(author) = &self.author {
            require("Author", author)?;
        }
        Ok(())
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// A title must be present and produce a usable slug.
fn require_title(title: &str) -> Result<(), AppError> {
    require("Title", title)?;
    if slugify(title).is_empty() {
        return Err(AppError::Validation(
            "Title must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(())
}
