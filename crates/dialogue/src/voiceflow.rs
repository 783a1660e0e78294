use {
    async_trait::async_trait,
    reqwest::Client,
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
    url::Url,
};

use teamline_config::DialogueConfig;

use crate::{
    DialogueClient,
    error::{Error, Result},
    types::{DialogueAction, RawSegment, ReplySegment, SessionVariables},
};

/// HTTP client for the Voiceflow general runtime.
pub struct VoiceflowClient {
    http: Client,
    api_key: Secret<String>,
    version_id: String,
    runtime_url: Url,
}

impl VoiceflowClient {
    pub fn new(config: &DialogueConfig) -> Result<Self> {
        let runtime_url = Url::parse(&config.runtime_url)
            .map_err(|e| Error::unavailable(format!("invalid runtime url: {e}")))?;
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(Error::unavailable)?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            version_id: config.version_id.clone(),
            runtime_url,
        })
    }

    /// `{runtime}/state/user/{user_id}/{leaf}` with the user id
    /// percent-encoded as a path segment.
    fn state_url(&self, user_id: &str, leaf: &str) -> Result<Url> {
        let mut url = self.runtime_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::unavailable("runtime url cannot be a base"))?
            .pop_if_empty()
            .extend(["state", "user", user_id, leaf]);
        Ok(url)
    }
}

#[async_trait]
impl DialogueClient for VoiceflowClient {
    async fn interact(&self, user_id: &str, action: DialogueAction) -> Result<Vec<ReplySegment>> {
        let url = self.state_url(user_id, "interact")?;
        debug!(user_id, "dialogue interact");

        let body = serde_json::json!({
            "request": action,
            "config": { "tts": false, "stripSSML": true },
        });

        let resp = self
            .http
            .post(url)
            .header("Authorization", self.api_key.expose_secret())
            .header("versionID", &self.version_id)
            .json(&body)
            .send()
            .await
            .map_err(Error::unavailable)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::unavailable(format!("engine returned {status}")));
        }

        let raw: Vec<RawSegment> = resp.json().await.map_err(Error::unavailable)?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn update_variables(&self, user_id: &str, vars: &SessionVariables) -> Result<()> {
        let url = self.state_url(user_id, "variables")?;
        debug!(user_id, "dialogue update variables");

        let resp = self
            .http
            .patch(url)
            .header("Authorization", self.api_key.expose_secret())
            .header("versionID", &self.version_id)
            .json(vars)
            .send()
            .await
            .map_err(Error::unavailable)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::unavailable(format!("engine returned {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::ServerGuard) -> VoiceflowClient {
        VoiceflowClient::new(&DialogueConfig {
            api_key: Secret::new("VF.test-key".into()),
            version_id: "production".into(),
            runtime_url: server.url(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn vars() -> SessionVariables {
        SessionVariables {
            team_name: "Lions".into(),
            is_admin: false,
            plan_status: "active".into(),
            plan_name: "club".into(),
            user_id: "whatsapp:+15551230000".into(),
            current_time: "Monday, January 5, 2026 at 3:04 PM".into(),
        }
    }

    #[tokio::test]
    async fn interact_parses_segments() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/state/user/whatsapp:+15551230000/interact")
            .match_header("authorization", "VF.test-key")
            .match_header("versionid", "production")
            .with_status(200)
            .with_body(
                r#"[
                    {"type":"text","payload":{"message":"Hi"}},
                    {"type":"image","payload":{"url":"http://x/img.png"}},
                    {"type":"carousel","payload":{"cards":[]}}
                ]"#,
            )
            .create_async()
            .await;

        let segments = client(&server)
            .interact("whatsapp:+15551230000", DialogueAction::text("hello"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], ReplySegment::Text { message: "Hi".into() });
        assert_eq!(segments[1], ReplySegment::Media { url: "http://x/img.png".into() });
        assert_eq!(segments[2], ReplySegment::Unknown { kind: "carousel".into() });
    }

    #[tokio::test]
    async fn interact_maps_http_error_to_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/state/user/u1/interact")
            .with_status(500)
            .create_async()
            .await;

        let err = client(&server)
            .interact("u1", DialogueAction::text("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EngineUnavailable { .. }));
    }

    #[tokio::test]
    async fn update_variables_patches_state() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/state/user/u1/variables")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"team_name":"Lions","plan_status":"active"}"#.into(),
            ))
            .with_status(200)
            .create_async()
            .await;

        client(&server).update_variables("u1", &vars()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_variables_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/state/user/u1/variables")
            .with_status(503)
            .create_async()
            .await;

        let err = client(&server).update_variables("u1", &vars()).await.unwrap_err();
        assert!(matches!(err, Error::EngineUnavailable { .. }));
    }
}
