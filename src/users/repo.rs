use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{DuplicateEmail, NewUser, User, UserFilter};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_one(&self, filter: UserFilter) -> anyhow::Result<Option<User>>;
    async fn find(&self, filter: UserFilter) -> anyhow::Result<Vec<User>>;
    /// Insert a user. Fails with [`DuplicateEmail`] if the email is taken.
    async fn create(&self, user: NewUser) -> anyhow::Result<User>;
    /// Persist the whole record, `places` included, in one write.
    async fn save(&self, user: &User) -> anyhow::Result<()>;
}

const USER_COLUMNS: &str = "id, name, email, image, password_hash, places, created_at";

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select user by id")?;
        Ok(user)
    }

    async fn find_one(&self, filter: UserFilter) -> anyhow::Result<Option<User>> {
        let user = match filter {
            UserFilter::All => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC LIMIT 1"
                ))
                .fetch_optional(&self.db)
                .await
            }
            UserFilter::Email(email) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
                ))
                .bind(email)
                .fetch_optional(&self.db)
                .await
            }
        }
        .context("select one user")?;
        Ok(user)
    }

    async fn find(&self, filter: UserFilter) -> anyhow::Result<Vec<User>> {
        let users = match filter {
            UserFilter::All => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
                ))
                .fetch_all(&self.db)
                .await
            }
            UserFilter::Email(email) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
                ))
                .bind(email)
                .fetch_all(&self.db)
                .await
            }
        }
        .context("select users")?;
        Ok(users)
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, image, password_hash, places)
            VALUES ($1, $2, $3, $4, $5, '{{}}')
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.image)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(DuplicateEmail(user.email).into())
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert user")),
        }
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET name = $2, email = $3, image = $4, password_hash = $5, places = $6
             WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.image)
        .bind(&user.password_hash)
        .bind(&user.places)
        .execute(&self.db)
        .await
        .context("update user")?;
        anyhow::ensure!(res.rows_affected() == 1, "user {} vanished during update", user.id);
        Ok(())
    }
}
