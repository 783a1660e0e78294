use {async_trait::async_trait, sqlx::SqlitePool};

use crate::{
    MembershipStore,
    types::{Team, User},
};

/// SQLite-backed membership store.
pub struct SqliteMembershipStore {
    pool: SqlitePool,
}

impl SqliteMembershipStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the membership schema.
    pub async fn init(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS bot_users (
                phone_number TEXT    PRIMARY KEY,
                group_name   TEXT,
                is_admin     INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS teams (
                name                TEXT PRIMARY KEY,
                join_code           TEXT UNIQUE,
                subscription_status TEXT,
                plan_name           TEXT
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schedule_updates (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                group_name TEXT    NOT NULL,
                content    TEXT    NOT NULL,
                created_by TEXT    NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_schedule_updates_group_created
             ON schedule_updates (group_name, created_at DESC)",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS usage (
                phone_number  TEXT    PRIMARY KEY,
                message_count INTEGER NOT NULL DEFAULT 0,
                updated_at    INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn now_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[async_trait]
impl MembershipStore for SqliteMembershipStore {
    async fn get_user(&self, phone: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, (String, Option<String>, bool)>(
            "SELECT phone_number, group_name, is_admin FROM bot_users WHERE phone_number = ?",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| User {
            phone_number: r.0,
            group_name: r.1,
            is_admin: r.2,
        }))
    }

    async fn get_team(&self, name: &str) -> anyhow::Result<Option<Team>> {
        let row = sqlx::query_as::<_, (String, Option<String>, Option<String>, Option<String>)>(
            "SELECT name, join_code, subscription_status, plan_name FROM teams WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(team_from_row))
    }

    async fn find_team_by_join_code(&self, code: &str) -> anyhow::Result<Option<Team>> {
        let row = sqlx::query_as::<_, (String, Option<String>, Option<String>, Option<String>)>(
            "SELECT name, join_code, subscription_status, plan_name FROM teams WHERE join_code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(team_from_row))
    }

    async fn list_group_members(
        &self,
        group: &str,
        exclude_phone: &str,
    ) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, (String, Option<String>, bool)>(
            "SELECT phone_number, group_name, is_admin FROM bot_users
             WHERE group_name = ? AND phone_number != ?",
        )
        .bind(group)
        .bind(exclude_phone)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| User {
                phone_number: r.0,
                group_name: r.1,
                is_admin: r.2,
            })
            .collect())
    }

    async fn upsert_user(&self, phone: &str, group: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO bot_users (phone_number, group_name) VALUES (?, ?)
             ON CONFLICT(phone_number) DO UPDATE SET group_name = excluded.group_name",
        )
        .bind(phone)
        .bind(group)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_schedule_update(
        &self,
        group: &str,
        content: &str,
        created_by: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO schedule_updates (group_name, content, created_by, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(group)
        .bind(content)
        .bind(created_by)
        .bind(now_epoch())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_usage(&self, phone: &str) -> anyhow::Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT message_count FROM usage WHERE phone_number = ?",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.0).unwrap_or(0))
    }

    async fn increment_usage(&self, phone: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO usage (phone_number, message_count, updated_at) VALUES (?, 1, ?)
             ON CONFLICT(phone_number) DO UPDATE SET
                 message_count = message_count + 1,
                 updated_at = excluded.updated_at",
        )
        .bind(phone)
        .bind(now_epoch())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn team_from_row(r: (String, Option<String>, Option<String>, Option<String>)) -> Team {
    Team {
        name: r.0,
        join_code: r.1,
        subscription_status: r.2,
        plan_name: r.3,
    }
}
