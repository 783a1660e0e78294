//! Membership records: users, teams, schedule updates, usage counters.
//!
//! The bridge only ever talks to the [`MembershipStore`] trait; the sqlite
//! implementation is the deployed backend, the in-memory one backs tests.

pub mod memory;
pub mod sqlite;
pub mod types;

use async_trait::async_trait;

pub use {
    memory::MemoryMembershipStore,
    sqlite::SqliteMembershipStore,
    types::{ScheduleUpdate, Team, User},
};

/// Keyed record store for users, teams, and schedule updates.
///
/// Every operation is a single-row read or an atomic upsert; no cross-row
/// transactions are assumed by callers.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn get_user(&self, phone: &str) -> anyhow::Result<Option<User>>;
    async fn get_team(&self, name: &str) -> anyhow::Result<Option<Team>>;
    async fn find_team_by_join_code(&self, code: &str) -> anyhow::Result<Option<Team>>;
    /// All members of `group` except `exclude_phone`.
    async fn list_group_members(
        &self,
        group: &str,
        exclude_phone: &str,
    ) -> anyhow::Result<Vec<User>>;
    /// Create the user on first join, or reassign their group. Never touches
    /// the admin flag; that is owned by an external process.
    async fn upsert_user(&self, phone: &str, group: &str) -> anyhow::Result<()>;
    async fn insert_schedule_update(
        &self,
        group: &str,
        content: &str,
        created_by: &str,
    ) -> anyhow::Result<()>;
    async fn get_usage(&self, phone: &str) -> anyhow::Result<i64>;
    async fn increment_usage(&self, phone: &str) -> anyhow::Result<()>;
    /// Cheap reachability probe for the status endpoint.
    async fn ping(&self) -> anyhow::Result<()>;
}
