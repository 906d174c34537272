//! Middleware — actor permission extraction and security headers.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use guildgate_common::{error::GateError, permissions::Permissions};

/// Header carrying the acting user's guild permission bitfield, as Discord's decimal string.
pub const ACTOR_PERMISSIONS_HEADER: &str = "x-actor-permissions";

/// The caller's permissions for the guild being configured.
#[derive(Debug, Clone, Copy)]
pub struct ActorContext {
    pub permissions: Permissions,
}

/// Parse `X-Actor-Permissions` into an [`ActorContext`] request extension.
///
/// A missing or malformed header is a contract violation (400), never an
/// empty permission set.
pub async fn actor_middleware(mut request: Request, next: Next) -> Result<Response, GateError> {
    let raw = request
        .headers()
        .get(ACTOR_PERMISSIONS_HEADER)
        .ok_or_else(|| GateError::invalid_argument("X-Actor-Permissions header is required"))?
        .to_str()
        .map_err(|_| GateError::invalid_argument("X-Actor-Permissions must be ASCII"))?;

    let permissions = Permissions::parse(raw.trim())?;
    request
        .extensions_mut()
        .insert(ActorContext { permissions });

    Ok(next.run(request).await)
}

// ── Security headers ──────────────────────────────────────────────────────────

/// Add defensive security headers to every HTTP response.
///
/// The API only ever returns JSON, so the policy is deny-everything.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let h = response.headers_mut();

    for (name, value) in [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("referrer-policy", "no-referrer"),
        ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
    ] {
        h.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    response
}
