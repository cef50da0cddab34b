use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::content::sanitize_html;
use crate::db::{self, Repository};
use crate::errors::AppError;
use crate::models::{CreateProjectRequest, Project, UpdateProjectRequest};
use crate::query::ListQuery;

/// Create/update/delete for showcase projects. Projects have no status.
#[derive(Clone)]
pub struct ProjectService {
    repo: Arc<Repository>,
}

impl ProjectService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Project, AppError> {
        self.repo
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::project_not_found(id))
    }

    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<Project>, u64), AppError> {
        self.repo.list_projects(query).await
    }

    pub async fn featured(&self, limit: u32) -> Result<Vec<Project>, AppError> {
        self.repo.featured_projects(limit).await
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create(&self, request: CreateProjectRequest) -> Result<Project, AppError> {
        request.validate()?;

        let now = db::now();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            intro: request.intro,
            description: sanitize_html(&request.description),
            image: request.image,
            technologies: request.technologies,
            category: request.category,
            demo_url: request.demo_url,
            github_url: request.github_url,
            featured: request.featured,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert_project(&project).await?;
        tracing::info!(project_id = %project.id, "Project created");
        Ok(project)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: &str,
        request: UpdateProjectRequest,
    ) -> Result<Project, AppError> {
        request.validate()?;
        let mut project = self.get_by_id(id).await?;

        if let Some(title) = request.title {
            project.title = title;
        }
        if let Some(intro) = request.intro {
            project.intro = Some(intro);
        }
        if let Some(description) = request.description {
            project.description = sanitize_html(&description);
        }
        if let Some(image) = request.image {
            project.image = Some(image);
        }
        if let Some(technologies) = request.technologies {
            project.technologies = technologies;
        }
        if let Some(category) = request.category {
            project.category = category;
        }
        if let Some(demo_url) = request.demo_url {
            project.demo_url = Some(demo_url);
        }
        if let Some(github_url) = request.github_url {
            project.github_url = Some(github_url);
        }
        if let Some(featured) = request.featured {
            project.featured = featured;
        }
        project.updated_at = db::now();

        self.repo.save_project(&project).await?;
        tracing::info!(project_id = %project.id, "Project updated");
        Ok(project)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete_project(id).await?;
        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }
}
