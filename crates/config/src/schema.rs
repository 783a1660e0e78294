use {
    chrono_tz::Tz,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Top-level configuration, loaded once at startup and passed by reference
/// into each component constructor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamlineConfig {
    pub server: ServerConfig,
    pub twilio: TwilioConfig,
    pub dialogue: DialogueConfig,
    pub storage: StorageConfig,
    pub bridge: BridgeConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// Twilio account credentials and addressing.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwilioConfig {
    pub account_sid: String,

    /// Auth token; doubles as the webhook signing secret.
    #[serde(serialize_with = "serialize_secret")]
    pub auth_token: Secret<String>,

    /// Business number outbound messages are sent from, `whatsapp:+…` format.
    pub from_number: String,

    /// Externally visible base URL of this service. Webhook signatures are
    /// computed over this URL, not the internally observed host, since the
    /// service sits behind a reverse proxy.
    pub public_base_url: String,

    /// Timeout for outbound message sends (seconds).
    pub send_timeout_secs: u64,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: Secret::new(String::new()),
            from_number: String::new(),
            public_base_url: String::new(),
            send_timeout_secs: 15,
        }
    }
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}

/// Conversational engine (Voiceflow) settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,

    /// Project version to run against (e.g. "production").
    pub version_id: String,

    pub runtime_url: String,

    /// Timeout for engine round-trips (seconds).
    pub timeout_secs: u64,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::new(String::new()),
            version_id: "production".into(),
            runtime_url: "https://general-runtime.voiceflow.com".into(),
            timeout_secs: 15,
        }
    }
}

impl std::fmt::Debug for DialogueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueConfig")
            .field("api_key", &"[REDACTED]")
            .field("version_id", &self.version_id)
            .field("runtime_url", &self.runtime_url)
            .finish_non_exhaustive()
    }
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://teamline.db?mode=rwc".into(),
        }
    }
}

/// Bridge behavior tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Fixed reference zone for the human-readable timestamp handed to the
    /// engine. The sender's own zone is unknown to us.
    pub reference_timezone: Tz,

    /// Upper bound on concurrent broadcast sends.
    pub broadcast_concurrency: usize,

    /// Per-phone message cap on the engine path.
    pub usage_limit: i64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            reference_timezone: Tz::America__New_York,
            broadcast_concurrency: 8,
            usage_limit: 400,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
