//! Integration tests for the portfolio backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, LogFormat};
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

const ADMIN_TOKEN: &str = "test-admin-token";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_token(Some(ADMIN_TOKEN.to_string())).await
    }

    async fn with_token(token: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        let config = Config {
            admin_token: token.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
            cors_origins: vec!["*".to_string()],
        };

        let app = create_router(AppState::new(repo, config));

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(token) = token {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token).parse().unwrap(),
            );
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_post(&self, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/admin/blog/posts"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    async fn create_project(&self, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/admin/projects"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

fn post_body(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "content": "<p>Some words here</p>",
        "tags": ["rust", "web"],
        "category": "Engineering",
        "status": status,
        "author": "Jo"
    })
}

fn project_body(title: &str, featured: bool) -> Value {
    json!({
        "title": title,
        "description": "<p>A project</p>",
        "technologies": ["Rust", "Axum"],
        "category": "Web",
        "featured": featured
    })
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_admin_requires_token() {
    let fixture = TestFixture::new().await;

    // Request without the bearer token
    let resp = Client::new()
        .get(fixture.url("/api/admin/blog/posts"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // Request with the wrong bearer token
    let resp = Client::new()
        .get(fixture.url("/api/admin/blog/posts"))
        .bearer_auth("wrong-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/blog/posts"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_guard_disabled_without_token() {
    let fixture = TestFixture::with_token(None).await;

    let (status, _) = fixture.get_json("/api/admin/blog/posts").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_post_lifecycle() {
    let fixture = TestFixture::new().await;

    let created = fixture.create_post(post_body("Hello, World!", "draft")).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["slug"], "hello-world");
    assert_eq!(created["status"], "draft");
    assert!(created.get("publishedAt").is_none());

    // Drafts are not public
    let (status, body) = fixture.get_json("/api/blog/posts/hello-world").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // Publish
    let resp = fixture
        .client
        .patch(fixture.url(&format!("/api/admin/blog/posts/{}/publish", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let published: Value = resp.json().await.unwrap();
    assert_eq!(published["data"]["status"], "published");
    let published_at = published["data"]["publishedAt"].clone();
    assert!(published_at.is_string());

    // Rename: slug follows, publication time stays
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/admin/blog/posts/{}", id)))
        .json(&json!({ "title": "Hello World 2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["data"]["slug"], "hello-world-2");
    assert_eq!(updated["data"]["publishedAt"], published_at);

    let (status, body) = fixture.get_json("/api/blog/posts/hello-world-2").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["id"], id.as_str());

    // Unpublish hides it again
    let resp = fixture
        .client
        .patch(fixture.url(&format!("/api/admin/blog/posts/{}/unpublish", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let (status, _) = fixture.get_json("/api/blog/posts/hello-world-2").await;
    assert_eq!(status, 404);

    // Delete
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/admin/blog/posts/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let (status, _) = fixture
        .get_json(&format!("/api/admin/blog/posts/{}", id))
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_create_sanitizes_content() {
    let fixture = TestFixture::new().await;

    let mut body = post_body("Sanitized", "published");
    body["content"] = json!(r#"<p onclick="x()">Safe</p><script>alert(1)</script>"#);
    let created = fixture.create_post(body).await;

    assert_eq!(created["content"], "<p>Safe</p>");
    assert!(created["publishedAt"].is_string());
}

#[tokio::test]
async fn test_published_listing_pagination() {
    let fixture = TestFixture::new().await;

    for n in 1..=12 {
        fixture
            .create_post(post_body(&format!("Post {}", n), "published"))
            .await;
    }
    fixture.create_post(post_body("Hidden draft", "draft")).await;

    let (status, body) = fixture
        .get_json("/api/blog/posts?page=2&pageSize=5")
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["meta"]["currentPage"], 2);
    assert_eq!(body["meta"]["totalPages"], 3);
    assert_eq!(body["meta"]["totalCount"], 12);
    assert_eq!(body["meta"]["pageSize"], 5);

    // Past the end: empty page, same totals
    let (status, body) = fixture.get_json("/api/blog/posts?page=9&pageSize=5").await;
    assert_eq!(status, 200);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["totalPages"], 3);

    // Garbage parameters fall back to defaults
    let (status, body) = fixture
        .get_json("/api/blog/posts?page=abc&pageSize=-3&sortBy=bogus")
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["currentPage"], 1);
    assert_eq!(body["meta"]["pageSize"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_listing_search_and_category() {
    let fixture = TestFixture::new().await;

    fixture
        .create_post(post_body("Async Rust in practice", "published"))
        .await;
    let mut other = post_body("Gardening notes", "published");
    other["category"] = json!("Life");
    fixture.create_post(other).await;

    let (_, body) = fixture.get_json("/api/blog/posts?search=ASYNC").await;
    assert_eq!(body["meta"]["totalCount"], 1);
    assert_eq!(body["data"][0]["slug"], "async-rust-in-practice");

    let (_, body) = fixture.get_json("/api/blog/posts?category=Life").await;
    assert_eq!(body["meta"]["totalCount"], 1);

    let (_, body) = fixture
        .get_json("/api/blog/posts?category=All%20Categories")
        .await;
    assert_eq!(body["meta"]["totalCount"], 2);

    let (_, body) = fixture
        .get_json("/api/blog/posts?sortBy=title&sortOrder=asc")
        .await;
    assert_eq!(body["data"][0]["title"], "Async Rust in practice");
}

#[tokio::test]
async fn test_admin_listing_filters_by_status() {
    let fixture = TestFixture::new().await;

    fixture.create_post(post_body("One", "published")).await;
    fixture.create_post(post_body("Two", "draft")).await;
    fixture.create_post(post_body("Three", "draft")).await;

    let (_, body) = fixture.get_json("/api/admin/blog/posts").await;
    assert_eq!(body["meta"]["totalCount"], 3);

    let (_, body) = fixture.get_json("/api/admin/blog/posts?status=draft").await;
    assert_eq!(body["meta"]["totalCount"], 2);

    // The public listing ignores the status parameter
    let (_, body) = fixture.get_json("/api/blog/posts?status=draft").await;
    assert_eq!(body["meta"]["totalCount"], 1);
}

#[tokio::test]
async fn test_featured_posts() {
    let fixture = TestFixture::new().await;

    for n in 1..=4 {
        let mut body = post_body(&format!("Featured {}", n), "published");
        body["featured"] = json!(true);
        fixture.create_post(body).await;
    }
    let mut draft = post_body("Featured draft", "draft");
    draft["featured"] = json!(true);
    fixture.create_post(draft).await;

    let (status, body) = fixture.get_json("/api/blog/featured").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["meta"]["totalCount"], 3);
    assert_eq!(body["meta"]["totalPages"], 1);
    assert_eq!(body["meta"]["pageSize"], 3);

    // Fewer items than the limit: pageSize still reports the limit
    let (_, body) = fixture.get_json("/api/blog/featured?limit=10").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
    assert_eq!(body["meta"]["totalCount"], 4);
    assert_eq!(body["meta"]["pageSize"], 10);
}

#[tokio::test]
async fn test_repeated_query_keys_are_normalized() {
    let fixture = TestFixture::new().await;

    for n in 1..=3 {
        fixture
            .create_post(post_body(&format!("Post {}", n), "published"))
            .await;
    }

    let (status, body) = fixture
        .get_json("/api/blog/posts?page=1&page=2&pageSize=2&utm_source=feed")
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["currentPage"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = fixture
        .get_json("/api/projects/featured?limit=1&limit=4")
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["pageSize"], 4);
}

#[tokio::test]
async fn test_search_matches_non_ascii_titles() {
    let fixture = TestFixture::new().await;

    fixture.create_post(post_body("Über Rust", "published")).await;
    fixture.create_post(post_body("Plain title", "published")).await;

    for term in ["%C3%9Cber", "%C3%BCber"] {
        let (status, body) = fixture
            .get_json(&format!("/api/blog/posts?search={}", term))
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["meta"]["totalCount"], 1, "{}", term);
        assert_eq!(body["data"][0]["title"], "Über Rust");
    }
}

#[tokio::test]
async fn test_duplicate_slug_conflict() {
    let fixture = TestFixture::new().await;

    fixture.create_post(post_body("Same title", "draft")).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/blog/posts"))
        .json(&post_body("Same Title", "draft"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_validation_errors() {
    let fixture = TestFixture::new().await;

    // Missing required field
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/blog/posts"))
        .json(&json!({ "title": "No body" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Unknown status value
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/blog/posts"))
        .json(&post_body("Bad status", "archived"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Blank title
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/blog/posts"))
        .json(&post_body("   ", "draft"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .delete(fixture.url("/api/admin/blog/posts/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .patch(fixture.url("/api/admin/blog/posts/nope/publish"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let (status, _) = fixture.get_json("/api/projects/nope").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_project_crud() {
    let fixture = TestFixture::new().await;

    let created = fixture.create_project(project_body("Ray Tracer", true)).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["technologies"], json!(["Rust", "Axum"]));

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/admin/projects/{}", id)))
        .json(&json!({ "githubUrl": "https://github.com/me/rt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["data"]["title"], "Ray Tracer");
    assert_eq!(updated["data"]["githubUrl"], "https://github.com/me/rt");

    let (status, body) = fixture.get_json(&format!("/api/projects/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["githubUrl"], "https://github.com/me/rt");

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/admin/projects/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let (status, _) = fixture.get_json(&format!("/api/projects/{}", id)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_project_listing_and_featured() {
    let fixture = TestFixture::new().await;

    fixture.create_project(project_body("Alpha", true)).await;
    fixture.create_project(project_body("Beta", false)).await;
    let mut gamma = project_body("Gamma", true);
    gamma["technologies"] = json!(["Python"]);
    fixture.create_project(gamma).await;

    let (_, body) = fixture.get_json("/api/projects?search=python").await;
    assert_eq!(body["meta"]["totalCount"], 1);
    assert_eq!(body["data"][0]["title"], "Gamma");

    let (_, body) = fixture
        .get_json("/api/projects?sortBy=title&sortOrder=desc")
        .await;
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Gamma", "Beta", "Alpha"]);

    let (status, body) = fixture.get_json("/api/projects/featured").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = fixture.get_json("/api/admin/projects").await;
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["totalCount"], 3);
}
