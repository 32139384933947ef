use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User row. The password digest is only filled in by queries that need it
/// (login) and is never serialized back to a client.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub nick: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[sqlx(default)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert a new user. The caller has already validated the fields and hashed
/// the password.
pub async fn create(
    db: &PgPool,
    name: &str,
    nick: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, nick, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, nick, email, created_at
        "#,
    )
    .bind(name)
    .bind(nick)
    .bind(email)
    .bind(password_hash)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, nick, email, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Lookup for login; the only read that projects the password digest.
pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, nick, email, password_hash, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
}

/// Case-insensitive substring match over name or nick. Row order is whatever
/// the engine returns.
pub async fn search(db: &PgPool, name_or_nick: &str) -> Result<Vec<User>, sqlx::Error> {
    let pattern = format!("%{}%", name_or_nick);
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, nick, email, created_at
        FROM users
        WHERE name ILIKE $1 OR nick ILIKE $1
        "#,
    )
    .bind(pattern)
    .fetch_all(db)
    .await
}

/// Overwrite name, nick, and email. The password is not updatable through
/// this path.
pub async fn update(
    db: &PgPool,
    id: i64,
    name: &str,
    nick: &str,
    email: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET name = $1, nick = $2, email = $3 WHERE id = $4")
        .bind(name)
        .bind(nick)
        .bind(email)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Deleting a missing id affects zero rows and is still success.
pub async fn delete(db: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
