//! Single-active-row-per-owner switching for goals and diets.

use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

/// Tables whose rows carry `user_id` and an `is_active` flag kept unique per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusive {
    Goals,
    Diets,
}

impl Exclusive {
    fn table(self) -> &'static str {
        match self {
            Exclusive::Goals => "goals",
            Exclusive::Diets => "diets",
        }
    }
}

/// Make `id` the owner's only active row.
///
/// Locks every row of the owner first so concurrent activations serialize;
/// the flag is then rewritten for all of them in one statement. Returns
/// `false` when `id` is not one of the owner's rows.
pub async fn activate(db: &PgPool, kind: Exclusive, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let table = kind.table();
    let mut tx = db.begin().await.context("begin activate")?;

    let owned: Vec<Uuid> = sqlx::query_scalar(&format!(
        "SELECT id FROM {table} WHERE user_id = $1 ORDER BY id FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await
    .context("lock owner rows")?;

    if !owned.contains(&id) {
        tx.rollback().await.context("rollback activate")?;
        return Ok(false);
    }

    sqlx::query(&format!(
        r#"
        UPDATE {table}
           SET is_active = (id = $2),
               updated_at = CASE WHEN is_active IS DISTINCT FROM (id = $2)
                                 THEN now() ELSE updated_at END
         WHERE user_id = $1
        "#
    ))
    .bind(user_id)
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("switch active row")?;

    tx.commit().await.context("commit activate")?;
    Ok(true)
}

/// Clear the flag on one row. Returns `false` when the row is not the owner's.
pub async fn deactivate(db: &PgPool, kind: Exclusive, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(&format!(
        "UPDATE {} SET is_active = FALSE, updated_at = now() WHERE id = $1 AND user_id = $2",
        kind.table()
    ))
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await
    .context("deactivate row")?;
    Ok(res.rows_affected() > 0)
}
