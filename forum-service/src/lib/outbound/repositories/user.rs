use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Principal;
use crate::domain::user::models::PrincipalId;
use crate::domain::user::models::PrincipalRecord;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::Conflict;
use crate::user::errors::UserError;

const USERNAME_UNIQUE_INDEX: &str = "users_username_lower_key";
const EMAIL_UNIQUE_INDEX: &str = "users_email_lower_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = UserError;

    fn try_from(row: PrincipalRow) -> Result<Self, Self::Error> {
        Ok(Principal {
            id: PrincipalId(row.id),
            username: Username::new(row.username)?,
            email: EmailAddress::new(row.email)?,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn map_write_error(e: sqlx::Error) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERNAME_UNIQUE_INDEX) => {
                    return UserError::Conflict(vec![Conflict::UsernameTaken])
                }
                Some(EMAIL_UNIQUE_INDEX) => return UserError::Conflict(vec![Conflict::EmailTaken]),
                _ => {}
            }
        }
    }
    UserError::DatabaseError(e.to_string())
}

fn map_read_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_login_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>, UserError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(Principal::try_from).transpose()
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, UserError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(Principal::try_from).transpose()
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(map_read_error)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_read_error)
    }

    async fn exists_by_username_excluding(
        &self,
        username: &str,
        id: PrincipalId,
    ) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1) AND id <> $2)",
        )
        .bind(username)
        .bind(id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(map_read_error)
    }

    async fn exists_by_email_excluding(
        &self,
        email: &str,
        id: PrincipalId,
    ) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id <> $2)",
        )
        .bind(email)
        .bind(id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(map_read_error)
    }

    async fn save(&self, record: PrincipalRecord) -> Result<Principal, UserError> {
        let row = match record.id {
            None => sqlx::query_as::<_, PrincipalRow>(
                r#"
                INSERT INTO users (username, email, password_hash, created_at)
                VALUES ($1, $2, $3, NOW())
                RETURNING id, username, email, password_hash, created_at, updated_at
                "#,
            )
            .bind(record.username.as_str())
            .bind(record.email.as_str())
            .bind(&record.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?,

            Some(id) => sqlx::query_as::<_, PrincipalRow>(
                r#"
                UPDATE users
                SET username = $2, email = $3, password_hash = $4, updated_at = NOW()
                WHERE id = $1
                RETURNING id, username, email, password_hash, created_at, updated_at
                "#,
            )
            .bind(id.0)
            .bind(record.username.as_str())
            .bind(record.email.as_str())
            .bind(&record.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(UserError::NotFound(id))?,
        };

        Principal::try_from(row)
    }
}
