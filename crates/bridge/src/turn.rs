//! One inbound turn, end to end.

use std::sync::Arc;

use tracing::{debug, info, warn};

use {
    teamline_config::BridgeConfig,
    teamline_dialogue::{DialogueAction, DialogueClient},
    teamline_store::MembershipStore,
    teamline_telemetry::{self as telemetry, TelemetryEvent, TelemetrySink},
    teamline_twilio::{MessageSender, twiml},
};

use crate::{
    access,
    broadcast::{self, BroadcastOutcome},
    context,
    gate::{self, Gate},
    router::{self, Intent},
    usage,
};

const JOIN_USAGE: &str = "Usage: join <code>. Ask your team admin for the code.";
const JOIN_INVALID_CODE: &str = "Invalid join code. Please check and try again.";
const JOIN_FAILED: &str = "Failed to join group. Please try again.";
const BROADCAST_USAGE: &str = "Usage: #update <message>";
const SCHEDULE_USAGE: &str = "Usage: #schedule <update>";
const BROADCAST_FAILED: &str = "⚠️ Couldn't send the update. Please try again later.";
const SCHEDULE_FAILED: &str = "⚠️ Couldn't save the schedule update. Please try again later.";
const NOT_IN_GROUP: &str = "You're not assigned to a team yet, so there's nobody to notify.";
const LIMIT_NOTICE: &str = "⏳ You've reached your message limit for now. Please try again later.";
const APOLOGY: &str = "Sorry, something went wrong. Please try again later.";

/// How an admin command resolved.
///
/// `Unauthorized` is the non-disclosure branch: the sender was not an admin,
/// and the turn continues to the engine as if no command existed. Only
/// authorized admins ever see a `Denied` reason or an `Executed` reply.
enum CommandOutcome {
    Unauthorized,
    Denied(String),
    Executed(String),
}

/// The inbound message router and access-control core, wired to its
/// external collaborators.
pub struct Bridge {
    store: Arc<dyn MembershipStore>,
    telemetry: Arc<dyn TelemetrySink>,
    dialogue: Arc<dyn DialogueClient>,
    sender: Arc<dyn MessageSender>,
    config: BridgeConfig,
}

impl Bridge {
    pub fn new(
        store: Arc<dyn MembershipStore>,
        telemetry: Arc<dyn TelemetrySink>,
        dialogue: Arc<dyn DialogueClient>,
        sender: Arc<dyn MessageSender>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            store,
            telemetry,
            dialogue,
            sender,
            config,
        }
    }

    /// Handle one verified inbound message and produce the TwiML reply.
    ///
    /// Every path terminates with a reply; nothing in here is fatal for the
    /// process.
    pub async fn handle_turn(&self, from: &str, body: &str) -> String {
        info!(from, "inbound message");
        telemetry::record(
            self.telemetry.as_ref(),
            TelemetryEvent::user_message(from, body),
        )
        .await;

        if let Gate::Block { status } = gate::authorize(self.store.as_ref(), from, body).await {
            return twiml::message(&gate::suspension_notice(&status));
        }

        match router::parse(body) {
            Intent::Join { code } => twiml::message(&self.handle_join(from, &code).await),
            Intent::Broadcast { content } => {
                match self.handle_broadcast(from, &content).await {
                    CommandOutcome::Unauthorized => self.engine_turn(from, body).await,
                    CommandOutcome::Denied(text) | CommandOutcome::Executed(text) => {
                        twiml::message(&text)
                    },
                }
            },
            Intent::Schedule { content } => {
                match self.handle_schedule(from, &content).await {
                    CommandOutcome::Unauthorized => self.engine_turn(from, body).await,
                    CommandOutcome::Denied(text) | CommandOutcome::Executed(text) => {
                        twiml::message(&text)
                    },
                }
            },
            Intent::Fallback => self.engine_turn(from, body).await,
        }
    }

    async fn handle_join(&self, from: &str, code: &str) -> String {
        if code.is_empty() {
            return JOIN_USAGE.into();
        }

        let team = match self.store.find_team_by_join_code(code).await {
            Ok(Some(team)) => team,
            Ok(None) => return JOIN_INVALID_CODE.into(),
            Err(e) => {
                warn!(from, error = %e, "join code lookup failed");
                return JOIN_FAILED.into();
            },
        };

        if let Err(e) = self.store.upsert_user(from, &team.name).await {
            warn!(from, team = %team.name, error = %e, "join upsert failed");
            return JOIN_FAILED.into();
        }

        info!(from, team = %team.name, "user joined team");
        format!(
            "✅ Welcome to {}! You'll get schedule updates here and can ask me \
             anything about your team.",
            team.name
        )
    }

    /// `#update`: broadcast free text to the admin's own team.
    async fn handle_broadcast(&self, from: &str, content: &str) -> CommandOutcome {
        let group = match self.authorize_command(from).await {
            Ok(group) => group,
            Err(outcome) => return outcome,
        };
        if content.is_empty() {
            return CommandOutcome::Executed(BROADCAST_USAGE.into());
        }

        let message = format!("📢 *Admin Update:*\n{content}");
        match self.fan_out(&group, &message, from).await {
            Ok(outcome) => CommandOutcome::Executed(broadcast_summary("📢 Update", outcome)),
            Err(e) => {
                warn!(from, %group, error = %e, "broadcast failed");
                CommandOutcome::Executed(BROADCAST_FAILED.into())
            },
        }
    }

    /// `#schedule`: persist a schedule update, then broadcast it.
    async fn handle_schedule(&self, from: &str, content: &str) -> CommandOutcome {
        let group = match self.authorize_command(from).await {
            Ok(group) => group,
            Err(outcome) => return outcome,
        };
        if content.is_empty() {
            return CommandOutcome::Executed(SCHEDULE_USAGE.into());
        }

        if let Err(e) = self.store.insert_schedule_update(&group, content, from).await {
            warn!(from, %group, error = %e, "schedule insert failed");
            return CommandOutcome::Executed(SCHEDULE_FAILED.into());
        }

        let message = format!("📋 *SCHEDULE UPDATE*\n\n{content}");
        match self.fan_out(&group, &message, from).await {
            Ok(outcome) => {
                CommandOutcome::Executed(broadcast_summary("📋 Schedule update saved", outcome))
            },
            Err(e) => {
                warn!(from, %group, error = %e, "schedule broadcast failed");
                CommandOutcome::Executed(SCHEDULE_FAILED.into())
            },
        }
    }

    async fn fan_out(&self, group: &str, message: &str, from: &str) -> anyhow::Result<BroadcastOutcome> {
        broadcast::broadcast(
            self.store.as_ref(),
            self.sender.as_ref(),
            group,
            message,
            from,
            self.config.broadcast_concurrency,
        )
        .await
    }

    /// Resolve the admin's own group for a command write.
    ///
    /// `Err(outcome)` carries the non-admin fallthrough or an explicit
    /// denial. `Ok(group)` is the only way a write target comes into
    /// existence; it is never taken from the message.
    async fn authorize_command(&self, from: &str) -> Result<String, CommandOutcome> {
        let check = access::check_admin(self.store.as_ref(), from).await;
        if !check.is_admin {
            debug!(from, "non-admin command attempt, continuing to engine");
            return Err(CommandOutcome::Unauthorized);
        }
        let Some(group) = check.group_name.clone() else {
            return Err(CommandOutcome::Denied(NOT_IN_GROUP.into()));
        };
        if let Err(denied) = access::authorize_group_write(&check, &group) {
            return Err(CommandOutcome::Denied(denied.to_string()));
        }
        Ok(group)
    }

    /// The fallback path: enrich, push variables, interact, format.
    async fn engine_turn(&self, from: &str, body: &str) -> String {
        if !usage::check_allowance(self.store.as_ref(), from, self.config.usage_limit).await {
            return twiml::message(LIMIT_NOTICE);
        }

        let vars =
            context::build_context(self.store.as_ref(), from, self.config.reference_timezone).await;
        if let Err(e) = self.dialogue.update_variables(from, &vars).await {
            debug!(from, error = %e, "variable push failed, interacting anyway");
        }

        match self.dialogue.interact(from, DialogueAction::text(body)).await {
            Ok(segments) => {
                let payload =
                    serde_json::to_value(&segments).unwrap_or(serde_json::Value::Null);
                telemetry::record(
                    self.telemetry.as_ref(),
                    TelemetryEvent::bot_response(from, payload),
                )
                .await;
                usage::note_usage(self.store.as_ref(), from).await;
                twiml::render(&segments)
            },
            Err(e) => {
                warn!(from, error = %e, "engine interaction failed");
                telemetry::record(
                    self.telemetry.as_ref(),
                    TelemetryEvent::error(from, &e.to_string()),
                )
                .await;
                twiml::message(APOLOGY)
            },
        }
    }
}

fn broadcast_summary(prefix: &str, outcome: BroadcastOutcome) -> String {
    if outcome.attempted == 0 {
        format!("{prefix}: nobody else is on your team yet, so no messages were sent.")
    } else {
        format!(
            "{prefix}: sent to {} of {} teammates.",
            outcome.delivered, outcome.attempted
        )
    }
}
