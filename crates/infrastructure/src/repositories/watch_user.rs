use acquisitiond_core::{Result, WatchUser, WatchUserRepository};
use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::database::DatabasePool;

pub struct PostgresWatchUserRepository {
    pool: DatabasePool,
}

impl PostgresWatchUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<WatchUser> {
    Ok(WatchUser {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        display_name: row.try_get("display_name")?,
        access_token: row.try_get("access_token")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl WatchUserRepository for PostgresWatchUserRepository {
    async fn list_active(&self) -> Result<Vec<WatchUser>> {
        let rows = sqlx::query(
            "SELECT id, user_id, display_name, access_token, active, created_at, updated_at
             FROM watch_users WHERE active = true",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_user).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<WatchUser>> {
        let row = sqlx::query(
            "SELECT id, user_id, display_name, access_token, active, created_at, updated_at
             FROM watch_users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: &WatchUser) -> Result<WatchUser> {
        sqlx::query(
            "INSERT INTO watch_users (id, user_id, display_name, access_token, active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(user.user_id)
        .bind(&user.display_name)
        .bind(&user.access_token)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(user.clone())
    }

    async fn update(&self, user: &WatchUser) -> Result<WatchUser> {
        sqlx::query(
            "UPDATE watch_users SET display_name = $2, access_token = $3, active = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.display_name)
        .bind(&user.access_token)
        .bind(user.active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM watch_users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
