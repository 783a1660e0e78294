//! Subscription gate.
//!
//! The gate only ever hard-blocks on an explicitly known non-paying status.
//! Every lookup failure (unknown sender, ungrouped sender, missing team
//! row, store error) fails open: inability to verify must never lock out a
//! legitimate user.

use tracing::warn;

use teamline_store::MembershipStore;

use crate::router::{self, Intent};

/// Subscription states that allow access. NULL also allows (new-team
/// default).
const ALLOWED_STATUSES: &[&str] = &["active", "trialing"];

/// Gate decision for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Allow,
    /// The team is on a known suspended/canceled status.
    Block { status: String },
}

pub async fn authorize(store: &dyn MembershipStore, sender: &str, body: &str) -> Gate {
    // Join commands always pass: new users must be able to join before
    // they belong to any team.
    if matches!(router::parse(body), Intent::Join { .. }) {
        return Gate::Allow;
    }

    let user = match store.get_user(sender).await {
        Ok(user) => user,
        Err(e) => {
            warn!(sender, error = %e, "subscription lookup failed, allowing");
            return Gate::Allow;
        },
    };
    let Some(group) = user.and_then(|u| u.group_name) else {
        // Unregistered or ungrouped; the engine handles onboarding.
        return Gate::Allow;
    };

    let team = match store.get_team(&group).await {
        Ok(team) => team,
        Err(e) => {
            warn!(sender, %group, error = %e, "team lookup failed, allowing");
            return Gate::Allow;
        },
    };
    let Some(team) = team else {
        // Data-consistency lag, not a security boundary.
        warn!(sender, %group, "team not found for grouped user, allowing");
        return Gate::Allow;
    };

    match team.subscription_status {
        Some(status) if !ALLOWED_STATUSES.contains(&status.as_str()) => {
            warn!(sender, %group, %status, "blocked by subscription status");
            Gate::Block { status }
        },
        _ => Gate::Allow,
    }
}

/// User-visible notice for a blocked turn.
pub fn suspension_notice(status: &str) -> String {
    format!(
        "⛔ Service Suspended\n\nYour team's subscription is currently {status}. \
         Access is paused until payment is updated."
    )
}
