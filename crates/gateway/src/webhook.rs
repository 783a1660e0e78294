//! Inbound webhook intake.

use {
    axum::{
        extract::State,
        http::{HeaderMap, StatusCode, Uri, header},
        response::{IntoResponse, Response},
    },
    secrecy::ExposeSecret,
    tracing::warn,
};

use teamline_twilio::{parse_form, twiml, verify_signature};

use crate::state::AppState;

/// `POST /whatsapp`. The provider delivers one inbound message per request.
///
/// Signature verification happens here, on the raw body, before any store or
/// engine work; a failed check is the one path that answers non-200.
pub async fn whatsapp_webhook(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let signature = headers
        .get("x-twilio-signature")
        .and_then(|v| v.to_str().ok());
    let params = parse_form(&body);
    let url = public_url(&state.public_base_url, &uri);

    if !verify_signature(state.auth_token.expose_secret(), signature, &url, &params) {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    let (Some(from), Some(text)) = (field(&params, "From"), field(&params, "Body")) else {
        warn!("webhook accepted but missing From/Body, replying empty");
        return twiml_response(twiml::empty());
    };

    let reply = state.bridge.handle_turn(from, text).await;
    twiml_response(reply)
}

fn field<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// The URL the provider signed: configured public base + request path. The
/// locally observed host is meaningless behind the reverse proxy.
fn public_url(base: &str, uri: &Uri) -> String {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn twiml_response(twiml: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], twiml).into_response()
}
