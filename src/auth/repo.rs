use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Full credential record. Never serialized; responses go through
/// [`CurrentUser`] or the auth DTOs, which carry no hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
}

/// The identity attached to a request by the auth extractors.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: Uuid,
    #[serde(rename = "nama")]
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

const USER_COLS: &str = "id, name, email, password_hash, role, is_active, created_at, last_login";
const CURRENT_COLS: &str = "id, name, email, role, created_at, last_login";

/// Emails are stored lower-cased, so the caller lower-cases before lookup.
pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

/// Resolve a verified token subject to its live account, hash excluded.
/// Deactivated accounts resolve to nothing.
pub async fn find_current(db: &PgPool, id: Uuid) -> anyhow::Result<Option<CurrentUser>> {
    let user = sqlx::query_as::<_, CurrentUser>(&format!(
        "SELECT {CURRENT_COLS} FROM users WHERE id = $1 AND is_active"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn create(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING {USER_COLS}"
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(db)
    .await?;
    Ok(user)
}

/// Rename the account and keep the denormalized author name on the
/// user's posts in step, in one transaction.
pub async fn update_name(
    db: &PgPool,
    id: Uuid,
    name: &str,
) -> anyhow::Result<Option<CurrentUser>> {
    let mut tx = db.begin().await?;
    let user = sqlx::query_as::<_, CurrentUser>(&format!(
        "UPDATE users SET name = $2 WHERE id = $1 RETURNING {CURRENT_COLS}"
    ))
    .bind(id)
    .bind(name)
    .fetch_optional(&mut *tx)
    .await?;
    if user.is_some() {
        sqlx::query("UPDATE posts SET author_name = $2 WHERE author_id = $1")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(user)
}

pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn touch_last_login(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Remove the account and everything hanging off it in one transaction:
/// the user's likes on other posts (repairing those cached counts), the
/// user's own posts (their likes go with them via FK cascade), then the
/// user row itself.
pub async fn delete_account(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    let mut tx = db.begin().await?;
    sqlx::query(
        "WITH removed AS (
             DELETE FROM post_likes WHERE user_id = $1 RETURNING post_id
         )
         UPDATE posts SET like_count = like_count - 1
         WHERE id IN (SELECT post_id FROM removed)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM posts WHERE author_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_user_serializes_without_hash() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            name: "Sari".into(),
            email: "sari@example.com".into(),
            role: Role::User,
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_login: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains(r#""nama":"Sari""#));
        assert!(json.contains(r#""role":"user""#));
        assert!(json.contains(r#""lastLogin":null"#));
        assert!(!json.contains("password"));
    }
}
