#![allow(dead_code)]

use articles_api::{
    AppConfig, AppState,
    auth::{Identity, token},
    create_router,
    models::{Article, CreateArticleRequest, NewUser, UpdateArticleRequest, User},
    repository::Repository,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use sqlx::error::{DatabaseError, ErrorKind};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

// --- In-memory Repository ---

/// Stands in for Postgres. `calls` counts every repository access so tests can prove a
/// gate short-circuited before the handler ran.
#[derive(Default)]
pub struct InMemoryRepo {
    pub users: Mutex<Vec<User>>,
    pub articles: Mutex<Vec<Article>>,
    pub calls: AtomicUsize,
    /// When set, articles may only reference seeded users, like the `articles.user_id` FK.
    pub enforce_authors: AtomicBool,
}

impl InMemoryRepo {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Seeds an article without going through the API.
    pub fn seed_article(&self, article_type: &str, title: &str) -> Article {
        let article = Article {
            id: Uuid::new_v4(),
            article_type: article_type.to_string(),
            title: title.to_string(),
            body: format!("body of {title}"),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        self.articles.lock().unwrap().push(article.clone());
        article
    }

    /// Seeds a user with an arbitrary role and a pre-computed hash.
    pub fn seed_user(&self, email: &str, password_hash: &str, role: Option<&str>) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: role.map(str::to_string),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }
}

/// Mimics the driver error Postgres raises for a missing `users` row.
#[derive(Debug, thiserror::Error)]
#[error("insert or update on table \"articles\" violates foreign key constraint")]
struct MissingAuthor;

impl DatabaseError for MissingAuthor {
    fn message(&self) -> &str {
        "violates foreign key constraint"
    }
    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }
    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }
    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }
    fn kind(&self) -> ErrorKind {
        ErrorKind::ForeignKeyViolation
    }
}

fn sorted_by_title_desc(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| b.title.cmp(&a.title));
    articles
}

#[async_trait]
impl Repository for InMemoryRepo {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.touch();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        self.touch();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        self.users.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_user_role(&self, id: Uuid, role: &str) -> Result<Option<User>, sqlx::Error> {
        self.touch();
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.role = Some(role.to_string());
            u.clone()
        }))
    }

    async fn list_articles(&self) -> Result<Vec<Article>, sqlx::Error> {
        self.touch();
        Ok(sorted_by_title_desc(self.articles.lock().unwrap().clone()))
    }

    async fn list_articles_by_type(
        &self,
        article_type: &str,
    ) -> Result<Vec<Article>, sqlx::Error> {
        self.touch();
        let matching = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.article_type == article_type)
            .cloned()
            .collect();
        Ok(sorted_by_title_desc(matching))
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>, sqlx::Error> {
        self.touch();
        Ok(self
            .articles
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create_article(
        &self,
        req: CreateArticleRequest,
        user_id: Uuid,
    ) -> Result<Article, sqlx::Error> {
        self.touch();
        let author_known = self.users.lock().unwrap().iter().any(|u| u.id == user_id);
        if self.enforce_authors.load(Ordering::SeqCst) && !author_known {
            return Err(sqlx::Error::Database(Box::new(MissingAuthor)));
        }
        let article = Article {
            id: Uuid::new_v4(),
            article_type: req.article_type,
            title: req.title,
            body: req.body,
            user_id,
            created_at: Utc::now(),
        };
        self.articles.lock().unwrap().push(article.clone());
        Ok(article)
    }

    async fn update_article(
        &self,
        id: Uuid,
        req: UpdateArticleRequest,
    ) -> Result<Option<Article>, sqlx::Error> {
        self.touch();
        let mut articles = self.articles.lock().unwrap();
        Ok(articles.iter_mut().find(|a| a.id == id).map(|a| {
            a.title = req.title;
            a.body = req.body;
            a.clone()
        }))
    }

    async fn delete_article(&self, id: Uuid) -> Result<Option<Article>, sqlx::Error> {
        self.touch();
        let mut articles = self.articles.lock().unwrap();
        let position = articles.iter().position(|a| a.id == id);
        Ok(position.map(|index| articles.remove(index)))
    }
}

// --- State and Request Helpers ---

pub fn test_config() -> AppConfig {
    AppConfig {
        token_secret: TEST_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn test_state(repo: Arc<InMemoryRepo>) -> AppState {
    AppState {
        repo,
        config: test_config(),
    }
}

pub fn identity(user_id: &str, role: Option<&str>) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        email: format!("{user_id}@example.com"),
        role: role.map(str::to_string),
    }
}

/// A valid two-hour token for a random user with the given role.
pub fn token_with_role(role: Option<&str>) -> String {
    let id = Uuid::new_v4().to_string();
    token::issue(&identity(&id, role), TEST_SECRET.as_bytes(), 7200)
}

pub fn request(
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Drives a request through the fully assembled router (all gates and layers included).
pub async fn send(state: AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
