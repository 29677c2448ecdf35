use crate::auth::repo_types::{NewUser, User};
use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, is_active, is_staff, date_joined";

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    /// Whether an active user with this id exists.
    pub async fn is_active(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let active = sqlx::query_scalar::<_, bool>("SELECT is_active FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("check user active")?;
        Ok(active.unwrap_or(false))
    }

    pub async fn username_taken(db: &PgPool, username: &str) -> anyhow::Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(db)
        .await
        .context("check username")?;
        Ok(taken)
    }

    /// Whether another user (not `except`) already uses `email`.
    pub async fn email_taken(
        db: &PgPool,
        email: &str,
        except: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(db)
        .await
        .context("check email")?;
        Ok(taken)
    }

    /// Create a new user with hashed password.
    pub async fn create(db: &PgPool, new: NewUser<'_>) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.username)
        .bind(new.email)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.password_hash)
        .fetch_one(db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        email: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET email      = COALESCE($2, email),
                   first_name = COALESCE($3, first_name),
                   last_name  = COALESCE($4, last_name)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(db)
        .await
        .context("update profile")?;
        Ok(user)
    }

    pub async fn set_password(db: &PgPool, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await
            .context("set password")?;
        Ok(())
    }

    /// Delete the account; owned rows go with it through `ON DELETE CASCADE`.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete user")?;
        Ok(())
    }
}

/// Return the user's opaque API token, creating it on first use.
pub async fn get_or_create_token(db: &PgPool, user_id: Uuid, fresh_key: &str) -> anyhow::Result<String> {
    let key = sqlx::query_scalar::<_, String>(
        r#"
        INSERT INTO auth_tokens (key, user_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING key
        "#,
    )
    .bind(fresh_key)
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("get or create token")?;
    Ok(key)
}

/// Resolve an opaque token to its active owner.
pub async fn user_id_for_token(db: &PgPool, key: &str) -> anyhow::Result<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT u.id
          FROM auth_tokens t
          JOIN users u ON u.id = t.user_id
         WHERE t.key = $1 AND u.is_active
        "#,
    )
    .bind(key)
    .fetch_optional(db)
    .await
    .context("lookup token")?;
    Ok(id)
}
