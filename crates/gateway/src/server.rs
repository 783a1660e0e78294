//! Router assembly and server startup.

use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::State,
        response::IntoResponse,
        routing::{get, post},
    },
    secrecy::ExposeSecret,
    sqlx::SqlitePool,
    tracing::{info, warn},
};

use {
    teamline_bridge::Bridge,
    teamline_config::TeamlineConfig,
    teamline_dialogue::{DialogueClient, VoiceflowClient},
    teamline_store::{MembershipStore, SqliteMembershipStore},
    teamline_telemetry::{SqliteTelemetrySink, TelemetrySink},
    teamline_twilio::{MessageSender, TwilioSender},
};

use crate::{state::AppState, webhook};

/// Build the axum application.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/whatsapp", post(webhook::whatsapp_webhook))
        .with_state(state)
}

/// Wire up collaborators from config and serve until shutdown.
pub async fn start_gateway(config: TeamlineConfig) -> anyhow::Result<()> {
    let pool = SqlitePool::connect(&config.storage.database_url).await?;
    SqliteMembershipStore::init(&pool).await?;
    SqliteTelemetrySink::init(&pool).await?;

    let store: Arc<dyn MembershipStore> = Arc::new(SqliteMembershipStore::new(pool.clone()));
    let telemetry: Arc<dyn TelemetrySink> = Arc::new(SqliteTelemetrySink::new(pool));
    let dialogue: Arc<dyn DialogueClient> = Arc::new(VoiceflowClient::new(&config.dialogue)?);
    let sender: Arc<dyn MessageSender> = Arc::new(TwilioSender::new(&config.twilio)?);

    let bridge = Arc::new(Bridge::new(
        store.clone(),
        telemetry,
        dialogue,
        sender,
        config.bridge.clone(),
    ));
    let state = AppState {
        bridge,
        store,
        auth_token: config.twilio.auth_token.clone(),
        public_base_url: config.twilio.public_base_url.clone(),
        dialogue_configured: !config.dialogue.api_key.expose_secret().is_empty(),
    };

    let app = build_app(state);
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root_handler() -> &'static str {
    "OK"
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Dependency probe. Presentation only; nothing gates on this.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = match state.store.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!(error = %e, "status probe: store unreachable");
            "error"
        },
    };
    let dialogue = if state.dialogue_configured {
        "configured"
    } else {
        "skipped"
    };
    Json(serde_json::json!({
        "app": "ok",
        "store": store,
        "dialogue": dialogue,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use {
        async_trait::async_trait,
        axum::{
            body::Body,
            http::{Request, StatusCode, header},
        },
        base64::Engine,
        hmac::{Hmac, Mac},
        secrecy::Secret,
        sha1::Sha1,
        tower::ServiceExt,
    };

    use {
        teamline_bridge::Bridge,
        teamline_config::BridgeConfig,
        teamline_dialogue::{
            self as dialogue, DialogueAction, DialogueClient, ReplySegment, SessionVariables,
        },
        teamline_store::{MembershipStore, Team, User},
        teamline_telemetry::{TelemetryEvent, TelemetrySink},
        teamline_twilio::MessageSender,
    };

    use super::*;

    const AUTH_TOKEN: &str = "test-auth-token";
    const PUBLIC_BASE: &str = "https://bot.example.com";
    const FORM: &str = "From=whatsapp%3A%2B15551230000&Body=hello";

    /// Store stub that counts every call and returns empty data.
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
        fn bump(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl MembershipStore for CountingStore {
        async fn get_user(&self, _phone: &str) -> anyhow::Result<Option<User>> {
            self.bump();
            Ok(None)
        }
        async fn get_team(&self, _name: &str) -> anyhow::Result<Option<Team>> {
            self.bump();
            Ok(None)
        }
        async fn find_team_by_join_code(&self, _code: &str) -> anyhow::Result<Option<Team>> {
            self.bump();
            Ok(None)
        }
        async fn list_group_members(
            &self,
            _group: &str,
            _exclude_phone: &str,
        ) -> anyhow::Result<Vec<User>> {
            self.bump();
            Ok(Vec::new())
        }
        async fn upsert_user(&self, _phone: &str, _group: &str) -> anyhow::Result<()> {
            self.bump();
            Ok(())
        }
        async fn insert_schedule_update(
            &self,
            _group: &str,
            _content: &str,
            _created_by: &str,
        ) -> anyhow::Result<()> {
            self.bump();
            Ok(())
        }
        async fn get_usage(&self, _phone: &str) -> anyhow::Result<i64> {
            self.bump();
            Ok(0)
        }
        async fn increment_usage(&self, _phone: &str) -> anyhow::Result<()> {
            self.bump();
            Ok(())
        }
        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDialogue {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DialogueClient for CountingDialogue {
        async fn interact(
            &self,
            _user_id: &str,
            _action: DialogueAction,
        ) -> dialogue::Result<Vec<ReplySegment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ReplySegment::Text { message: "engine reply".into() }])
        }
        async fn update_variables(
            &self,
            _user_id: &str,
            _vars: &SessionVariables,
        ) -> dialogue::Result<()> {
            Ok(())
        }
    }

    struct NullSink;

    #[async_trait]
    impl TelemetrySink for NullSink {
        async fn append(&self, _event: TelemetryEvent) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct NullSender;

    #[async_trait]
    impl MessageSender for NullSender {
        async fn send(&self, _to: &str, _body: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct TestApp {
        app: Router,
        store: Arc<CountingStore>,
        dialogue: Arc<CountingDialogue>,
    }

    fn test_app() -> TestApp {
        let store = Arc::new(CountingStore::default());
        let dialogue = Arc::new(CountingDialogue::default());
        let bridge = Arc::new(Bridge::new(
            store.clone(),
            Arc::new(NullSink),
            dialogue.clone(),
            Arc::new(NullSender),
            BridgeConfig::default(),
        ));
        let state = AppState {
            bridge,
            store: store.clone(),
            auth_token: Secret::new(AUTH_TOKEN.into()),
            public_base_url: PUBLIC_BASE.into(),
            dialogue_configured: true,
        };
        TestApp {
            app: build_app(state),
            store,
            dialogue,
        }
    }

    /// Sign the way the provider does: URL then sorted `name ++ value`.
    fn sign(url: &str, ordered: &[(&str, &str)]) -> String {
        let mut mac = Hmac::<Sha1>::new_from_slice(AUTH_TOKEN.as_bytes()).unwrap();
        mac.update(url.as_bytes());
        for (name, value) in ordered {
            mac.update(name.as_bytes());
            mac.update(value.as_bytes());
        }
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    fn webhook_request(signature: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/whatsapp")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-twilio-signature", signature)
            .body(Body::from(FORM))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn bad_signature_is_forbidden_and_touches_nothing() {
        let t = test_app();
        let response = t.app.oneshot(webhook_request("bogus")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_string(response).await, "Forbidden");
        assert_eq!(t.store.count(), 0);
        assert_eq!(t.dialogue.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_signature_is_forbidden() {
        let t = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/whatsapp")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(FORM))
            .unwrap();
        let response = t.app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn valid_signature_reaches_the_engine() {
        let t = test_app();
        let sig = sign(
            &format!("{PUBLIC_BASE}/whatsapp"),
            &[("Body", "hello"), ("From", "whatsapp:+15551230000")],
        );
        let response = t.app.oneshot(webhook_request(&sig)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/xml"
        );
        let body = body_string(response).await;
        assert!(body.contains("<Response>"));
        assert!(body.contains("engine reply"));
        assert_eq!(t.dialogue.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn health_endpoints_respond() {
        let t = test_app();
        let response = t
            .app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("ok"));

        let response = t
            .app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "OK");
    }

    #[tokio::test]
    async fn status_reports_dependencies() {
        let t = test_app();
        let response = t
            .app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("\"store\":\"ok\""));
        assert!(body.contains("\"dialogue\":\"configured\""));
    }
}
