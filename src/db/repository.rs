//! Database repository for posts and projects.
//!
//! Every write is a single statement against one row; concurrent edits to the
//! same row resolve as last write wins.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{decode_timestamp, encode_timestamp};
use crate::errors::AppError;
use crate::models::{Post, PostStatus, Project};
use crate::query::{search_text, ListQuery, Listing};

const POST_COLUMNS: &str = "id, slug, title, intro, content, cover_image, tags, category, \
     read_time, featured, status, author, created_at, updated_at, published_at";

const PROJECT_COLUMNS: &str = "id, title, intro, description, image, technologies, category, \
     demo_url, github_url, featured, created_at, updated_at";

/// Public blog listing: published posts only, dated by publication.
const PUBLISHED_POSTS: Listing = Listing {
    table: "posts",
    columns: POST_COLUMNS,
    search_column: "search_text",
    date_column: "published_at",
    read_time_column: Some("read_time"),
    scope: Some("status = 'published'"),
    status_filter: false,
};

/// Admin listing: every status unless narrowed, dated by creation.
const ALL_POSTS: Listing = Listing {
    date_column: "created_at",
    scope: None,
    status_filter: true,
    ..PUBLISHED_POSTS
};

const PROJECTS: Listing = Listing {
    table: "projects",
    columns: PROJECT_COLUMNS,
    search_column: "search_text",
    date_column: "created_at",
    read_time_column: None,
    scope: None,
    status_filter: false,
};

/// Which slice of the posts collection a listing runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    Published,
    All,
}

impl PostScope {
    fn listing(&self) -> &'static Listing {
        match self {
            PostScope::Published => &PUBLISHED_POSTS,
            PostScope::All => &ALL_POSTS,
        }
    }
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== POST OPERATIONS ====================

    /// Insert a fully derived post. A duplicate slug surfaces as `Conflict`.
    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        let tags_json = serde_json::to_string(&post.tags)?;

        sqlx::query(
            r#"INSERT INTO posts (
                id, slug, title, intro, content, cover_image, tags, category,
                read_time, featured, status, author, created_at, updated_at, published_at,
                search_text
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&post.id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.intro)
        .bind(&post.content)
        .bind(&post.cover_image)
        .bind(&tags_json)
        .bind(&post.category)
        .bind(i64::from(post.read_time))
        .bind(post.featured)
        .bind(post.status.as_str())
        .bind(&post.author)
        .bind(encode_timestamp(&post.created_at))
        .bind(encode_timestamp(&post.updated_at))
        .bind(post.published_at.as_ref().map(encode_timestamp))
        .bind(post_search_text(post))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a post by ID.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    /// Get a post by slug, optionally restricted to one status.
    pub async fn get_post_by_slug(
        &self,
        slug: &str,
        status: Option<PostStatus>,
    ) -> Result<Option<Post>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE slug = ? AND (? IS NULL OR status = ?)",
            POST_COLUMNS
        ))
        .bind(slug)
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    /// Overwrite every mutable column of an existing post.
    pub async fn save_post(&self, post: &Post) -> Result<(), AppError> {
        let tags_json = serde_json::to_string(&post.tags)?;

        let result = sqlx::query(
            r#"UPDATE posts SET
                slug = ?, title = ?, intro = ?, content = ?, cover_image = ?, tags = ?,
                category = ?, read_time = ?, featured = ?, status = ?, author = ?,
                updated_at = ?, published_at = ?, search_text = ?
            WHERE id = ?"#,
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.intro)
        .bind(&post.content)
        .bind(&post.cover_image)
        .bind(&tags_json)
        .bind(&post.category)
        .bind(i64::from(post.read_time))
        .bind(post.featured)
        .bind(post.status.as_str())
        .bind(&post.author)
        .bind(encode_timestamp(&post.updated_at))
        .bind(post.published_at.as_ref().map(encode_timestamp))
        .bind(post_search_text(post))
        .bind(&post.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::post_not_found(&post.id));
        }
        Ok(())
    }

    /// Delete a post.
    pub async fn delete_post(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::post_not_found(id));
        }
        Ok(())
    }

    /// One page of posts plus the total number of matching posts.
    pub async fn list_posts(
        &self,
        scope: PostScope,
        query: &ListQuery,
    ) -> Result<(Vec<Post>, u64), AppError> {
        let listing = scope.listing();
        let total = self.count(listing, query).await?;
        let rows = listing.page_query(query).build().fetch_all(&self.pool).await?;
        let posts = rows.iter().map(post_from_row).collect::<Result<_, _>>()?;
        Ok((posts, total))
    }

    /// Newest published featured posts.
    pub async fn featured_posts(&self, limit: u32) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE status = 'published' AND featured = 1 \
             ORDER BY published_at DESC, rowid ASC LIMIT ?",
            POST_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(post_from_row).collect()
    }

    // ==================== PROJECT OPERATIONS ====================

    /// Insert a new project.
    pub async fn insert_project(&self, project: &Project) -> Result<(), AppError> {
        let technologies_json = serde_json::to_string(&project.technologies)?;

        sqlx::query(
            r#"INSERT INTO projects (
                id, title, intro, description, image, technologies, category,
                demo_url, github_url, featured, created_at, updated_at, search_text
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&project.id)
        .bind(&project.title)
        .bind(&project.intro)
        .bind(&project.description)
        .bind(&project.image)
        .bind(&technologies_json)
        .bind(&project.category)
        .bind(&project.demo_url)
        .bind(&project.github_url)
        .bind(project.featured)
        .bind(encode_timestamp(&project.created_at))
        .bind(encode_timestamp(&project.updated_at))
        .bind(project_search_text(project))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a project by ID.
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE id = ?",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(project_from_row).transpose()
    }

    /// Overwrite every mutable column of an existing project.
    pub async fn save_project(&self, project: &Project) -> Result<(), AppError> {
        let technologies_json = serde_json::to_string(&project.technologies)?;

        let result = sqlx::query(
            r#"UPDATE projects SET
                title = ?, intro = ?, description = ?, image = ?, technologies = ?,
                category = ?, demo_url = ?, github_url = ?, featured = ?, updated_at = ?,
                search_text = ?
            WHERE id = ?"#,
        )
        .bind(&project.title)
        .bind(&project.intro)
        .bind(&project.description)
        .bind(&project.image)
        .bind(&technologies_json)
        .bind(&project.category)
        .bind(&project.demo_url)
        .bind(&project.github_url)
        .bind(project.featured)
        .bind(encode_timestamp(&project.updated_at))
        .bind(project_search_text(project))
        .bind(&project.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::project_not_found(&project.id));
        }
        Ok(())
    }

    /// Delete a project.
    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::project_not_found(id));
        }
        Ok(())
    }

    /// One page of projects plus the total number of matching projects.
    pub async fn list_projects(&self, query: &ListQuery) -> Result<(Vec<Project>, u64), AppError> {
        let total = self.count(&PROJECTS, query).await?;
        let rows = PROJECTS
            .page_query(query)
            .build()
            .fetch_all(&self.pool)
            .await?;
        let projects = rows.iter().map(project_from_row).collect::<Result<_, _>>()?;
        Ok((projects, total))
    }

    /// Newest featured projects.
    pub async fn featured_projects(&self, limit: u32) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE featured = 1 ORDER BY created_at DESC, rowid ASC LIMIT ?",
            PROJECT_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(project_from_row).collect()
    }

    async fn count(&self, listing: &Listing, query: &ListQuery) -> Result<u64, AppError> {
        let total: i64 = listing
            .count_query(query)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}

// Helper functions for row conversion

fn post_from_row(row: &SqliteRow) -> Result<Post, AppError> {
    let tags: String = row.try_get("tags")?;
    let status: String = row.try_get("status")?;
    let read_time: i64 = row.try_get("read_time")?;
    let published_at: Option<String> = row.try_get("published_at")?;

    Ok(Post {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        intro: row.try_get("intro")?,
        content: row.try_get("content")?,
        cover_image: row.try_get("cover_image")?,
        tags: parse_json_array("tags", &tags)?,
        category: row.try_get("category")?,
        read_time: u32::try_from(read_time).unwrap_or_default(),
        featured: row.try_get("featured")?,
        status: PostStatus::parse(&status)
            .ok_or_else(|| AppError::Database(format!("Unknown post status {:?}", status)))?,
        author: row.try_get("author")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: decode_timestamp(&row.try_get::<String, _>("updated_at")?)?,
        published_at: published_at.as_deref().map(decode_timestamp).transpose()?,
    })
}

fn project_from_row(row: &SqliteRow) -> Result<Project, AppError> {
    let technologies: String = row.try_get("technologies")?;

    Ok(Project {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        intro: row.try_get("intro")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        technologies: parse_json_array("technologies", &technologies)?,
        category: row.try_get("category")?,
        demo_url: row.try_get("demo_url")?,
        github_url: row.try_get("github_url")?,
        featured: row.try_get("featured")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: decode_timestamp(&row.try_get::<String, _>("updated_at")?)?,
    })
}

fn parse_json_array(column: &str, raw: &str) -> Result<Vec<String>, AppError> {
    serde_json::from_str(raw).map_err(|e| {
        AppError::Database(format!("Invalid stored {} {:?}: {}", column, raw, e))
    })
}

/// Title, content and each tag; JSON syntax never reaches the search column.
fn post_search_text(post: &Post) -> String {
    let fields = [post.title.as_str(), post.content.as_str()];
    search_text(fields.into_iter().chain(post.tags.iter().map(String::as_str)))
}

fn project_search_text(project: &Project) -> String {
    let fields = [project.title.as_str(), project.description.as_str()];
    search_text(
        fields
            .into_iter()
            .chain(project.technologies.iter().map(String::as_str)),
    )
}
