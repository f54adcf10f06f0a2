//! PostgreSQL member repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::domain::member::{
    username_key, AvatarData, Member, MemberId, MemberRepository, SaveOutcome,
};
use crate::domain::DomainError;

const PRIMARY_KEY_CONSTRAINT: &str = "members_pkey";
const USERNAME_CONSTRAINT: &str = "members_username_key_unique";

const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS members (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL,
    username_key TEXT NOT NULL,
    email TEXT NOT NULL,
    name TEXT NOT NULL,
    nickname TEXT NOT NULL,
    avatar TEXT NOT NULL,
    password_hash TEXT,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT members_username_key_unique UNIQUE (username_key)
)
"#,
    "ALTER TABLE members ADD COLUMN IF NOT EXISTS version BIGINT NOT NULL DEFAULT 0",
];

const SELECT_COLUMNS: &str = "id, username, email, name, nickname, avatar, password_hash, \
                              active, version, created_at, updated_at";

/// PostgreSQL implementation of MemberRepository.
///
/// Uniqueness of IDs and usernames is enforced by table constraints, which
/// makes inserts and renames conditional at the database boundary.
#[derive(Debug, Clone)]
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the members table if it does not exist
    pub async fn migrate(&self) -> Result<(), DomainError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to migrate members table: {}", e)))?;
        }

        info!("Members schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn exists(&self, id: &MemberId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check member: {}", e)))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE username_key = $1)")
            .bind(username_key(username))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check username: {}", e)))
    }

    async fn get(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get member: {}", e)))?;

        row.as_ref().map(row_to_member).transpose()
    }

    async fn list(&self) -> Result<Vec<Member>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM members ORDER BY created_at, id",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list members: {}", e)))?;

        rows.iter().map(row_to_member).collect()
    }

    async fn insert(&self, member: &Member) -> Result<SaveOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO members (id, username, username_key, email, name, nickname, avatar,
                                 password_hash, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(member.id().as_uuid())
        .bind(member.username())
        .bind(member.username_key())
        .bind(member.email())
        .bind(member.name())
        .bind(member.nickname())
        .bind(member.avatar().as_str())
        .bind(member.password_hash())
        .bind(member.is_active())
        .bind(member.created_at())
        .bind(member.updated_at())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(SaveOutcome::Saved),
            Err(e) => conflict_outcome(&e)
                .ok_or_else(|| DomainError::storage(format!("Failed to insert member: {}", e))),
        }
    }

    async fn update(&self, member: &Member) -> Result<SaveOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET username = $2, username_key = $3, email = $4, name = $5, nickname = $6,
                avatar = $7, password_hash = $8, active = $9, updated_at = $10,
                version = version + 1
            WHERE id = $1 AND version = $11
            "#,
        )
        .bind(member.id().as_uuid())
        .bind(member.username())
        .bind(member.username_key())
        .bind(member.email())
        .bind(member.name())
        .bind(member.nickname())
        .bind(member.avatar().as_str())
        .bind(member.password_hash())
        .bind(member.is_active())
        .bind(member.updated_at())
        .bind(stored_version(member.version())?)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(if self.exists(member.id()).await? {
                SaveOutcome::Stale
            } else {
                SaveOutcome::Missing
            }),
            Ok(_) => Ok(SaveOutcome::Saved),
            Err(e) => conflict_outcome(&e)
                .ok_or_else(|| DomainError::storage(format!("Failed to update member: {}", e))),
        }
    }
}

/// Map a unique-constraint violation to the conflict it represents
fn conflict_outcome(error: &sqlx::Error) -> Option<SaveOutcome> {
    let sqlx::Error::Database(db) = error else {
        return None;
    };

    if !db.is_unique_violation() {
        return None;
    }

    constraint_outcome(db.constraint()?)
}

fn constraint_outcome(constraint: &str) -> Option<SaveOutcome> {
    match constraint {
        PRIMARY_KEY_CONSTRAINT => Some(SaveOutcome::DuplicateId),
        USERNAME_CONSTRAINT => Some(SaveOutcome::UsernameTaken),
        _ => None,
    }
}

fn stored_version(version: u64) -> Result<i64, DomainError> {
    i64::try_from(version)
        .map_err(|_| DomainError::internal(format!("Member version {} overflows BIGINT", version)))
}

fn row_to_member(row: &sqlx::postgres::PgRow) -> Result<Member, DomainError> {
    let column_error = |e: sqlx::Error| DomainError::storage(format!("Invalid member row: {}", e));

    let id: Uuid = row.try_get("id").map_err(column_error)?;
    let username: String = row.try_get("username").map_err(column_error)?;
    let email: String = row.try_get("email").map_err(column_error)?;
    let name: String = row.try_get("name").map_err(column_error)?;
    let nickname: String = row.try_get("nickname").map_err(column_error)?;
    let avatar: String = row.try_get("avatar").map_err(column_error)?;
    let password_hash: Option<String> = row.try_get("password_hash").map_err(column_error)?;
    let active: bool = row.try_get("active").map_err(column_error)?;
    let version: i64 = row.try_get("version").map_err(column_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(column_error)?;

    let version = u64::try_from(version)
        .map_err(|_| DomainError::storage(format!("Negative member version {}", version)))?;

    let member_id = MemberId::from_uuid(id)
        .map_err(|e| DomainError::invalid_id(format!("Invalid member ID in database: {}", e)))?;

    Ok(Member::new(
        member_id,
        username,
        email,
        name,
        nickname,
        AvatarData::from_stored(avatar),
    )
    .with_password_hash(password_hash)
    .with_active(active)
    .with_version(version)
    .with_timestamps(created_at, updated_at))
}
