//! Session-variable enrichment for engine turns.

use {
    chrono::{DateTime, Utc},
    chrono_tz::Tz,
    tracing::warn,
};

use {teamline_dialogue::SessionVariables, teamline_store::MembershipStore};

const DEFAULT_PLAN_STATUS: &str = "free";
const DEFAULT_PLAN_NAME: &str = "starter";

/// Assemble the variable bundle handed to the engine before a fallback turn.
///
/// Always completes: missing users, missing teams, and store errors all
/// degrade to defaults. Nothing here gates anything; these are
/// presentation values for the engine's prompts.
pub async fn build_context(store: &dyn MembershipStore, phone: &str, reference_tz: Tz) -> SessionVariables {
    build_context_at(store, phone, reference_tz, Utc::now()).await
}

pub(crate) async fn build_context_at(
    store: &dyn MembershipStore,
    phone: &str,
    reference_tz: Tz,
    now: DateTime<Utc>,
) -> SessionVariables {
    let user = match store.get_user(phone).await {
        Ok(user) => user,
        Err(e) => {
            warn!(phone, error = %e, "user lookup failed, using default context");
            None
        },
    };

    let group = user.as_ref().and_then(|u| u.group_name.clone());
    let team = match &group {
        Some(name) => match store.get_team(name).await {
            Ok(team) => team,
            Err(e) => {
                warn!(phone, group = %name, error = %e, "team lookup failed, using default plan");
                None
            },
        },
        None => None,
    };

    SessionVariables {
        team_name: group.unwrap_or_default(),
        is_admin: user.as_ref().is_some_and(|u| u.is_admin),
        plan_status: team
            .as_ref()
            .and_then(|t| t.subscription_status.clone())
            .unwrap_or_else(|| DEFAULT_PLAN_STATUS.into()),
        plan_name: team
            .as_ref()
            .and_then(|t| t.plan_name.clone())
            .unwrap_or_else(|| DEFAULT_PLAN_NAME.into()),
        user_id: phone.to_string(),
        current_time: format_reference_time(now, reference_tz),
    }
}

/// Human-readable "now" in the fixed reference zone, e.g.
/// `Monday, January 5, 2026 at 3:04 PM`.
fn format_reference_time(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz)
        .format("%A, %B %-d, %Y at %-I:%M %p")
        .to_string()
}
