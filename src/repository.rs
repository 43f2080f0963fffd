use crate::models::{Article, CreateArticleRequest, NewUser, UpdateArticleRequest, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract the handlers depend on. Postgres in production, an in-memory
/// store in tests.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    // Fails with a unique violation if the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error>;
    async fn update_user_role(&self, id: Uuid, role: &str) -> Result<Option<User>, sqlx::Error>;

    // --- Articles ---
    // Ordered by title, descending.
    async fn list_articles(&self) -> Result<Vec<Article>, sqlx::Error>;
    async fn list_articles_by_type(&self, article_type: &str)
    -> Result<Vec<Article>, sqlx::Error>;
    async fn get_article(&self, id: Uuid) -> Result<Option<Article>, sqlx::Error>;
    async fn create_article(
        &self,
        req: CreateArticleRequest,
        user_id: Uuid,
    ) -> Result<Article, sqlx::Error>;
    async fn update_article(
        &self,
        id: Uuid,
        req: UpdateArticleRequest,
    ) -> Result<Option<Article>, sqlx::Error>;
    // Returns the removed row, or None if nothing matched.
    async fn delete_article(&self, id: Uuid) -> Result<Option<Article>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const ARTICLE_COLUMNS: &str = "id, type, title, body, user_id, created_at";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// create_user
    ///
    /// The `users.email` unique index is the source of truth for duplicates; the handler's
    /// pre-check only produces a friendlier error in the common case.
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, role
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_role(&self, id: Uuid, role: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING id, email, password_hash, role",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_articles(&self) -> Result<Vec<Article>, sqlx::Error> {
        let query = format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY title DESC");
        sqlx::query_as::<_, Article>(&query)
            .fetch_all(&self.pool)
            .await
    }

    async fn list_articles_by_type(
        &self,
        article_type: &str,
    ) -> Result<Vec<Article>, sqlx::Error> {
        let query =
            format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE type = $1 ORDER BY title DESC");
        sqlx::query_as::<_, Article>(&query)
            .bind(article_type)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_article(
        &self,
        req: CreateArticleRequest,
        user_id: Uuid,
    ) -> Result<Article, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles (id, type, title, body, user_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING {ARTICLE_COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(Uuid::new_v4())
            .bind(req.article_type)
            .bind(req.title)
            .bind(req.body)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_article(
        &self,
        id: Uuid,
        req: UpdateArticleRequest,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET title = $2, body = $3 WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(req.title)
            .bind(req.body)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_article(&self, id: Uuid) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("DELETE FROM articles WHERE id = $1 RETURNING {ARTICLE_COLUMNS}");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
