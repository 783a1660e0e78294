//! Shared test doubles for the bridge core.

use std::sync::Mutex;

use async_trait::async_trait;

use {
    teamline_dialogue::{self as dialogue, DialogueAction, DialogueClient, ReplySegment, SessionVariables},
    teamline_store::{MembershipStore, Team, User},
    teamline_telemetry::{TelemetryEvent, TelemetrySink},
    teamline_twilio::MessageSender,
};

/// Store where every operation fails, for fail-open/fail-closed tests.
pub struct FailingStore;

#[async_trait]
impl MembershipStore for FailingStore {
    async fn get_user(&self, _phone: &str) -> anyhow::Result<Option<User>> {
        anyhow::bail!("store offline")
    }

    async fn get_team(&self, _name: &str) -> anyhow::Result<Option<Team>> {
        anyhow::bail!("store offline")
    }

    async fn find_team_by_join_code(&self, _code: &str) -> anyhow::Result<Option<Team>> {
        anyhow::bail!("store offline")
    }

    async fn list_group_members(
        &self,
        _group: &str,
        _exclude_phone: &str,
    ) -> anyhow::Result<Vec<User>> {
        anyhow::bail!("store offline")
    }

    async fn upsert_user(&self, _phone: &str, _group: &str) -> anyhow::Result<()> {
        anyhow::bail!("store offline")
    }

    async fn insert_schedule_update(
        &self,
        _group: &str,
        _content: &str,
        _created_by: &str,
    ) -> anyhow::Result<()> {
        anyhow::bail!("store offline")
    }

    async fn get_usage(&self, _phone: &str) -> anyhow::Result<i64> {
        anyhow::bail!("store offline")
    }

    async fn increment_usage(&self, _phone: &str) -> anyhow::Result<()> {
        anyhow::bail!("store offline")
    }

    async fn ping(&self) -> anyhow::Result<()> {
        anyhow::bail!("store offline")
    }
}

/// Message sender that records every attempt and fails on demand.
#[derive(Default)]
pub struct FakeSender {
    sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<Vec<String>>,
}

impl FakeSender {
    pub fn fail_for(&self, phone: &str) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(phone.to_string());
    }

    /// Every attempted delivery, including failed ones.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl MessageSender for FakeSender {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((to.to_string(), body.to_string()));
        let failing = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if failing.iter().any(|p| p == to) {
            anyhow::bail!("provider rejected send to {to}")
        }
        Ok(())
    }
}

/// Dialogue client that replies with canned segments or fails.
pub struct FakeDialogue {
    segments: Vec<ReplySegment>,
    fail: bool,
    interactions: Mutex<Vec<(String, String)>>,
    variable_pushes: Mutex<Vec<SessionVariables>>,
}

impl FakeDialogue {
    pub fn replying(segments: Vec<ReplySegment>) -> Self {
        Self {
            segments,
            fail: false,
            interactions: Mutex::new(Vec::new()),
            variable_pushes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            segments: Vec::new(),
            fail: true,
            interactions: Mutex::new(Vec::new()),
            variable_pushes: Mutex::new(Vec::new()),
        }
    }

    /// `(user_id, message text)` per interact call, in order.
    pub fn interactions(&self) -> Vec<(String, String)> {
        self.interactions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn variable_pushes(&self) -> Vec<SessionVariables> {
        self.variable_pushes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl DialogueClient for FakeDialogue {
    async fn interact(
        &self,
        user_id: &str,
        action: DialogueAction,
    ) -> dialogue::Result<Vec<ReplySegment>> {
        let text = action.payload.as_str().unwrap_or_default().to_string();
        self.interactions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((user_id.to_string(), text));
        if self.fail {
            return Err(dialogue::Error::unavailable("engine down"));
        }
        Ok(self.segments.clone())
    }

    async fn update_variables(
        &self,
        _user_id: &str,
        vars: &SessionVariables,
    ) -> dialogue::Result<()> {
        self.variable_pushes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(vars.clone());
        Ok(())
    }
}

/// Telemetry sink that keeps events in memory.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl MemorySink {
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl TelemetrySink for MemorySink {
    async fn append(&self, event: TelemetryEvent) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
        Ok(())
    }
}
