//! Showcase project model and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::require;
use crate::errors::AppError;

/// A showcased project. `description` is always stored sanitized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub technologies: Vec<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a new project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub intro: Option<String>,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub technologies: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl CreateProjectRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("Title", &self.title)?;
        require("Description", &self.description)?;
        require("Category", &self.category)?;
        Ok(())
    }
}

/// Request body for a partial project update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub technologies: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl UpdateProjectRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            require("Title", title)?;
        }
        if let Some(description) = &self.description {
            require("Description", description)?;
        }
        if let Some(category) = &self.category {
            require("Category", category)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_request_camel_case() {
        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "title": "Ray Tracer",
            "description": "<p>Weekend project</p>",
            "technologies": ["Rust", "WGPU"],
            "category": "Graphics",
            "githubUrl": "https://github.com/me/rt"
        }))
        .unwrap();
        assert_eq!(req.github_url.as_deref(), Some("https://github.com/me/rt"));
        assert!(!req.featured);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_project_requires_description() {
        let req = CreateProjectRequest {
            title: "T".into(),
            intro: None,
            description: "  ".into(),
            image: None,
            technologies: vec![],
            category: "c".into(),
            demo_url: None,
            github_url: None,
            featured: false,
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_project_title_needs_no_slug_characters() {
        let req = UpdateProjectRequest {
            title: Some("日本語".into()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        let blank = UpdateProjectRequest {
            title: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(blank.validate(), Err(AppError::Validation(_))));
    }
}
