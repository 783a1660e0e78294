use std::sync::Arc;

use secrecy::Secret;

use {teamline_bridge::Bridge, teamline_store::MembershipStore};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<Bridge>,
    /// Store handle kept for the status probe; turn handling goes through
    /// the bridge.
    pub store: Arc<dyn MembershipStore>,
    /// Webhook signing secret (the provider auth token).
    pub auth_token: Secret<String>,
    /// Externally visible base URL signatures are computed against.
    pub public_base_url: String,
    pub dialogue_configured: bool,
}
