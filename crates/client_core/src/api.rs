//! HTTP access to the site backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::{ApiErrorBody, ApiException},
    protocol::{
        ChatRequest, ChatResponse, ContactRecord, ContactRequest, ContactSubmitResponse,
        ContactsResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{config::Settings, error::ClientError};

pub const CONTACT_US_PATH: &str = "api/contact-us";
pub const CONTACTS_PATH: &str = "api/contacts";
pub const CHAT_PATH: &str = "api/chat";

/// Backend capabilities used by the controllers. Implemented over HTTP by
/// [`HttpSiteApi`]; tests provide in-memory fakes.
#[async_trait]
pub trait SiteApi: Send + Sync {
    async fn submit_contact_form(
        &self,
        form: &ContactRequest,
    ) -> Result<ContactSubmitResponse, ClientError>;
    async fn get_all_contacts(&self) -> Result<Vec<ContactRecord>, ClientError>;
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;
}

pub struct HttpSiteApi {
    http: Client,
    base_url: Url,
}

impl HttpSiteApi {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, mut base_url: Url) -> Self {
        // Url::join drops the last path segment unless it ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let base_url = Url::parse(settings.api_base_url.trim())?;
        Ok(Self::with_client(builder.build()?, base_url))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl SiteApi for HttpSiteApi {
    async fn submit_contact_form(
        &self,
        form: &ContactRequest,
    ) -> Result<ContactSubmitResponse, ClientError> {
        let url = self.endpoint(CONTACT_US_PATH)?;
        debug!(%url, "submitting contact form");
        let result = match self.http.post(url).json(form).send().await {
            Ok(response) => read_json(response).await,
            Err(err) => Err(err.into()),
        };
        log_failure(result, "error submitting contact form")
    }

    async fn get_all_contacts(&self) -> Result<Vec<ContactRecord>, ClientError> {
        let url = self.endpoint(CONTACTS_PATH)?;
        debug!(%url, "fetching contacts");
        let result = match self.http.get(url).send().await {
            Ok(response) => read_json::<ContactsResponse>(response).await,
            Err(err) => Err(err.into()),
        };
        log_failure(result, "error fetching contacts").map(|body| body.data)
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let url = self.endpoint(CHAT_PATH)?;
        debug!(
            %url,
            history_len = request.conversation_history.len(),
            "sending chat message"
        );
        let result = match self.http.post(url).json(request).send().await {
            Ok(response) => read_json(response).await,
            Err(err) => Err(err.into()),
        };
        log_failure(result, "error sending chat message")
    }
}

fn log_failure<T>(result: Result<T, ClientError>, what: &'static str) -> Result<T, ClientError> {
    if let Err(err) = &result {
        warn!(error = %err, status = ?err.status(), "{what}");
    }
    result
}

/// Maps a completed response onto the payload type or a [`ClientError`].
/// Non-2xx bodies are read as [`ApiErrorBody`] so the server message survives.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        let body = serde_json::from_slice::<ApiErrorBody>(&bytes).unwrap_or_default();
        return Err(ApiException::new(status.as_u16(), body).into());
    }
    serde_json::from_slice(&bytes).map_err(|err| ClientError::MalformedResponse(err.to_string()))
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
