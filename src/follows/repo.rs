use sqlx::PgPool;

use crate::users::repo::User;

/// Record that `follower_id` follows `target_id`. Re-following is a no-op:
/// the edge's primary key plus ON CONFLICT keeps the pair unique.
pub async fn follow(db: &PgPool, follower_id: i64, target_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO followers (user_id, follower_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(target_id)
    .bind(follower_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Remove the edge; removing a non-existent edge is success.
pub async fn unfollow(db: &PgPool, follower_id: i64, target_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM followers WHERE user_id = $1 AND follower_id = $2")
        .bind(target_id)
        .bind(follower_id)
        .execute(db)
        .await?;
    Ok(())
}

/// All users following `target_id`.
pub async fn followers(db: &PgPool, target_id: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.name, u.nick, u.email, u.created_at
        FROM users u
        INNER JOIN followers f ON f.follower_id = u.id
        WHERE f.user_id = $1
        "#,
    )
    .bind(target_id)
    .fetch_all(db)
    .await
}

/// All users that `follower_id` follows.
pub async fn following(db: &PgPool, follower_id: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.name, u.nick, u.email, u.created_at
        FROM users u
        INNER JOIN followers f ON f.user_id = u.id
        WHERE f.follower_id = $1
        "#,
    )
    .bind(follower_id)
    .fetch_all(db)
    .await
}
