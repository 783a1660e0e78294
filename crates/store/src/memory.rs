use std::{
    collections::HashMap,
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;

use crate::{
    MembershipStore,
    types::{ScheduleUpdate, Team, User},
};

/// In-memory membership store. Backs tests and throwaway deployments; shares
/// exact semantics with the sqlite implementation.
#[derive(Default)]
pub struct MemoryMembershipStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    teams: HashMap<String, Team>,
    schedule_updates: Vec<ScheduleUpdate>,
    usage: HashMap<String, i64>,
}

impl MemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.users.insert(user.phone_number.clone(), user);
    }

    pub fn insert_team(&self, team: Team) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.teams.insert(team.name.clone(), team);
    }

    /// Snapshot of the stored schedule updates, oldest first.
    pub fn schedule_updates(&self) -> Vec<ScheduleUpdate> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.schedule_updates.clone()
    }
}

#[async_trait]
impl MembershipStore for MemoryMembershipStore {
    async fn get_user(&self, phone: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.users.get(phone).cloned())
    }

    async fn get_team(&self, name: &str) -> anyhow::Result<Option<Team>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.teams.get(name).cloned())
    }

    async fn find_team_by_join_code(&self, code: &str) -> anyhow::Result<Option<Team>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .teams
            .values()
            .find(|t| t.join_code.as_deref() == Some(code))
            .cloned())
    }

    async fn list_group_members(
        &self,
        group: &str,
        exclude_phone: &str,
    ) -> anyhow::Result<Vec<User>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .users
            .values()
            .filter(|u| u.group_name.as_deref() == Some(group) && u.phone_number != exclude_phone)
            .cloned()
            .collect())
    }

    async fn upsert_user(&self, phone: &str, group: &str) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .users
            .entry(phone.to_string())
            .and_modify(|u| u.group_name = Some(group.to_string()))
            .or_insert_with(|| User {
                phone_number: phone.to_string(),
                group_name: Some(group.to_string()),
                is_admin: false,
            });
        Ok(())
    }

    async fn insert_schedule_update(
        &self,
        group: &str,
        content: &str,
        created_by: &str,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.schedule_updates.len() as i64 + 1;
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        inner.schedule_updates.push(ScheduleUpdate {
            id,
            group_name: group.to_string(),
            content: content.to_string(),
            created_by: created_by.to_string(),
            created_at,
        });
        Ok(())
    }

    async fn get_usage(&self, phone: &str) -> anyhow::Result<i64> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.usage.get(phone).copied().unwrap_or(0))
    }

    async fn increment_usage(&self, phone: &str) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *inner.usage.entry(phone.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
