use std::sync::RwLock;

use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::error::ApiError;
use crate::settings::Settings;

/// Bearer token for the session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Explicit per-call context handed to every directory request. There is no
/// ambient token storage; a call without a context cannot happen.
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: SessionToken,
}

impl RequestContext {
    pub fn new(token: SessionToken) -> Self {
        Self { token }
    }

    pub fn bearer(&self) -> &str {
        self.token.as_str()
    }
}

/// Process-wide directory session: initialized on load, updated on login,
/// cleared on logout. Handlers mint a [`RequestContext`] from it per call.
#[derive(Debug, Default)]
pub struct SessionHolder {
    token: RwLock<Option<SessionToken>>,
}

impl SessionHolder {
    pub fn init(token: SessionToken) -> Self {
        Self { token: RwLock::new(Some(token)) }
    }

    pub fn update(&self, token: SessionToken) {
        *self.token.write().expect("session lock poisoned") = Some(token);
    }

    pub fn clear(&self) {
        *self.token.write().expect("session lock poisoned") = None;
    }

    pub fn context(&self) -> Result<RequestContext, ApiError> {
        self.token
            .read()
            .expect("session lock poisoned")
            .clone()
            .map(RequestContext::new)
            .ok_or_else(|| ApiError::Unauthorized("No directory session".into()))
    }
}

/// Serving-side check of the caller's token, from the bearer header or the
/// `token` query parameter.
pub fn verify_token(
    settings: &Settings,
    auth: Option<Authorization<Bearer>>,
    query_token: Option<&str>,
) -> Result<(), ApiError> {
    let provided_token = auth
        .map(|a| a.token().to_string())
        .or_else(|| query_token.map(|s| s.to_string()));
    match provided_token {
        Some(token) if token == settings.auth_token => Ok(()),
        _ => Err(ApiError::Unauthorized(
            "Invalid authentication token".into(),
        )),
    }
}
