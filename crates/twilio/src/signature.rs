//! Webhook signature verification.

use {
    base64::Engine,
    hmac::{Hmac, Mac},
    sha1::Sha1,
    tracing::warn,
};

type HmacSha1 = Hmac<Sha1>;

/// Verify the `X-Twilio-Signature` header for a form-encoded webhook.
///
/// The provider signs HMAC-SHA1 over the externally visible request URL
/// followed by every form parameter, sorted by name, appended as
/// `name ++ value`, and base64-encodes the digest. The URL must be the one
/// the provider saw (configured public base + request path), not the host
/// observed behind the reverse proxy.
///
/// Fails closed: missing header, missing secret, or any mismatch rejects.
pub fn verify_signature(
    auth_token: &str,
    signature_header: Option<&str>,
    url: &str,
    params: &[(String, String)],
) -> bool {
    let header = match signature_header {
        Some(h) if !h.is_empty() => h,
        _ => {
            warn!("webhook rejected: missing signature header");
            return false;
        },
    };
    if auth_token.is_empty() {
        warn!("webhook rejected: no signing secret configured");
        return false;
    }

    let mut mac = match HmacSha1::new_from_slice(auth_token.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("failed to create HMAC");
            return false;
        },
    };

    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    mac.update(url.as_bytes());
    for (name, value) in sorted {
        mac.update(name.as_bytes());
        mac.update(value.as_bytes());
    }
    let computed = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

    // Constant-time comparison to prevent timing attacks.
    constant_time_eq(&computed, header)
}

/// Decode a raw form-encoded body into parameter pairs, original order kept.
pub fn parse_form(raw_body: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw_body.as_bytes())
        .into_owned()
        .collect()
}

/// Constant-time string comparison.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
