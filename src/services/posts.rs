use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::content::{estimate_read_time, sanitize_html, slugify};
use crate::db::{self, PostScope, Repository};
use crate::errors::AppError;
use crate::models::{CreatePostRequest, Post, PostStatus, UpdatePostRequest};
use crate::query::ListQuery;

/// Draft/published state machine for blog posts.
///
/// `published_at` is stamped on the first transition into `Published` and is
/// never cleared or moved afterwards.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<Repository>,
}

impl PostService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Post, AppError> {
        self.repo
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::post_not_found(id))
    }

    /// Public lookup: drafts are invisible here.
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Post, AppError> {
        self.repo
            .get_post_by_slug(slug, Some(PostStatus::Published))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post '{}' not found", slug)))
    }

    pub async fn list_published(&self, query: &ListQuery) -> Result<(Vec<Post>, u64), AppError> {
        self.repo.list_posts(PostScope::Published, query).await
    }

    pub async fn list_all(&self, query: &ListQuery) -> Result<(Vec<Post>, u64), AppError> {
        self.repo.list_posts(PostScope::All, query).await
    }

    pub async fn featured(&self, limit: u32) -> Result<Vec<Post>, AppError> {
        self.repo.featured_posts(limit).await
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create(&self, request: CreatePostRequest) -> Result<Post, AppError> {
        request.validate()?;

        let now = db::now();
        let content = sanitize_html(&request.content);
        let read_time = match request.read_time {
            Some(minutes) if minutes > 0 => minutes,
            _ => estimate_read_time(&content),
        };

        let post = Post {
            id: Uuid::new_v4().to_string(),
            slug: slugify(&request.title),
            title: request.title,
            intro: request.intro,
            content,
            cover_image: request.cover_image,
            tags: request.tags,
            category: request.category,
            read_time,
            featured: request.featured,
            status: request.status,
            author: request.author,
            created_at: now,
            updated_at: now,
            published_at: (request.status == PostStatus::Published).then_some(now),
        };

        self.repo.insert_post(&post).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, status = post.status.as_str(), "Post created");
        Ok(post)
    }

    /// Merge the supplied fields into the stored post.
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: &str, request: UpdatePostRequest) -> Result<Post, AppError> {
        request.validate()?;
        let mut post = self.get_by_id(id).await?;
        let now = db::now();

        if let Some(title) = request.title {
            if title != post.title {
                post.slug = slugify(&title);
                post.title = title;
            }
        }
        if let Some(content) = request.content {
            post.content = sanitize_html(&content);
            post.read_time = estimate_read_time(&post.content);
        }
        if let Some(read_time) = request.read_time.filter(|minutes| *minutes > 0) {
            post.read_time = read_time;
        }
        if let Some(intro) = request.intro {
            post.intro = Some(intro);
        }
        if let Some(cover_image) = request.cover_image {
            post.cover_image = Some(cover_image);
        }
        if let Some(tags) = request.tags {
            post.tags = tags;
        }
        if let Some(category) = request.category {
            post.category = category;
        }
        if let Some(featured) = request.featured {
            post.featured = featured;
        }
        if let Some(author) = request.author {
            post.author = author;
        }
        if let Some(status) = request.status {
            transition(&mut post, status, now);
        }
        post.updated_at = now;

        self.repo.save_post(&post).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, "Post updated");
        Ok(post)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete_post(id).await?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    /// Draft to published. Already published posts come back untouched.
    #[instrument(skip(self))]
    pub async fn publish(&self, id: &str) -> Result<Post, AppError> {
        self.set_status(id, PostStatus::Published).await
    }

    /// Published to draft. Drafts come back untouched.
    #[instrument(skip(self))]
    pub async fn unpublish(&self, id: &str) -> Result<Post, AppError> {
        self.set_status(id, PostStatus::Draft).await
    }

    async fn set_status(&self, id: &str, status: PostStatus) -> Result<Post, AppError> {
        let mut post = self.get_by_id(id).await?;
        if post.status == status {
            tracing::debug!(post_id = %id, status = status.as_str(), "Status unchanged");
            return Ok(post);
        }

        let now = db::now();
        transition(&mut post, status, now);
        post.updated_at = now;

        self.repo.save_post(&post).await?;
        tracing::info!(post_id = %id, status = status.as_str(), "Post status changed");
        Ok(post)
    }
}

fn transition(post: &mut Post, status: PostStatus, now: DateTime<Utc>) {
    if status == PostStatus::Published && post.published_at.is_none() {
        post.published_at = Some(now);
    }
    post.status = status;
}
