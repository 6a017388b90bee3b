use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::auth::RequestContext;
use crate::models::{MemberPackage, PersonRef, ScheduledSession, SessionCreate, SessionUpdate};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed directory payload: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("record not found in session directory")]
    MissingRecord,
}

/// Typed client for the session directory, the external service owning
/// scheduled-session persistence and validation. Responses are decoded into
/// the `models` schemas at this boundary; malformed payloads never reach
/// view state.
#[derive(Clone)]
pub struct DirectoryClient {
    client: reqwest::Client,
    base_url: Arc<Url>,
}

impl DirectoryClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Arc::new(base_url),
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DirectoryError> {
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DirectoryError::MissingRecord);
        }
        let response = response.error_for_status()?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(DirectoryError::Decode)
    }

    /// `GET /sessions?date=YYYY-MM-DD`
    pub async fn list_sessions(
        &self,
        ctx: &RequestContext,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledSession>, DirectoryError> {
        let url = Url::parse_with_params(
            &format!("{}sessions", self.base_url),
            &[("date", date.to_string())],
        )
        .unwrap();
        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `POST /sessions`
    pub async fn create_session(
        &self,
        ctx: &RequestContext,
        payload: &SessionCreate,
    ) -> Result<ScheduledSession, DirectoryError> {
        let response = self
            .client
            .post(format!("{}sessions", self.base_url))
            .bearer_auth(ctx.bearer())
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `PUT /sessions/{id}`; status-only changes use the same endpoint.
    pub async fn update_session(
        &self,
        ctx: &RequestContext,
        id: &str,
        payload: &SessionUpdate,
    ) -> Result<ScheduledSession, DirectoryError> {
        let response = self
            .client
            .put(format!("{}sessions/{id}", self.base_url))
            .bearer_auth(ctx.bearer())
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `DELETE /sessions/{id}`
    pub async fn delete_session(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<(), DirectoryError> {
        let response = self
            .client
            .delete(format!("{}sessions/{id}", self.base_url))
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DirectoryError::MissingRecord);
        }
        response.error_for_status()?;
        Ok(())
    }

    /// `GET /trainers`
    pub async fn list_trainers(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<PersonRef>, DirectoryError> {
        let response = self
            .client
            .get(format!("{}trainers", self.base_url))
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `GET /payments`, listing member packages with remaining credit for
    /// the booking form.
    pub async fn list_member_packages(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<MemberPackage>, DirectoryError> {
        let response = self
            .client
            .get(format!("{}payments", self.base_url))
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        Self::decode(response).await
    }
}
