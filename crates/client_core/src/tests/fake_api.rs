//! In-memory [`SiteApi`] used by the controller tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use shared::{
    error::{ApiErrorBody, ApiException},
    protocol::{
        ChatRequest, ChatResponse, ContactRecord, ContactRequest, ContactSubmitResponse,
    },
};
use tokio::sync::{Mutex, Notify};

use crate::{api::SiteApi, error::ClientError};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Reply {
    Ok,
    Status(u16, Option<&'static str>),
    Malformed,
}

impl Reply {
    fn into_error(self) -> Option<ClientError> {
        match self {
            Reply::Ok => None,
            Reply::Status(status, message) => {
                let body = ApiErrorBody {
                    message: message.map(str::to_string),
                };
                Some(ApiException::new(status, body).into())
            }
            Reply::Malformed => Some(ClientError::MalformedResponse(
                "expected value at line 1 column 1".into(),
            )),
        }
    }
}

pub(crate) struct FakeApi {
    contact_reply: Reply,
    chat_reply: Reply,
    gate: Option<Arc<Notify>>,
    pub contact_posts: Mutex<Vec<ContactRequest>>,
    pub chat_posts: Mutex<Vec<ChatRequest>>,
}

impl FakeApi {
    pub fn ok() -> Self {
        Self::replying(Reply::Ok, Reply::Ok)
    }

    pub fn replying(contact_reply: Reply, chat_reply: Reply) -> Self {
        Self {
            contact_reply,
            chat_reply,
            gate: None,
            contact_posts: Mutex::new(Vec::new()),
            chat_posts: Mutex::new(Vec::new()),
        }
    }

    /// Calls record their request, then wait until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl SiteApi for FakeApi {
    async fn submit_contact_form(
        &self,
        form: &ContactRequest,
    ) -> Result<ContactSubmitResponse, ClientError> {
        self.contact_posts.lock().await.push(form.clone());
        self.wait_for_gate().await;
        match self.contact_reply.into_error() {
            Some(err) => Err(err),
            None => Ok(ContactSubmitResponse {
                message: Some("Contact form submitted successfully".into()),
                data: json!({"id": "c1"}),
            }),
        }
    }

    async fn get_all_contacts(&self) -> Result<Vec<ContactRecord>, ClientError> {
        let posts = self.contact_posts.lock().await;
        Ok(posts
            .iter()
            .enumerate()
            .map(|(idx, form)| ContactRecord {
                id: Some(idx.to_string()),
                name: form.name.clone(),
                email: form.email.clone(),
                phone: Some(form.phone.clone()).filter(|phone| !phone.is_empty()),
                message: form.message.clone(),
                created_at: None,
            })
            .collect())
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        self.chat_posts.lock().await.push(request.clone());
        self.wait_for_gate().await;
        match self.chat_reply.into_error() {
            Some(err) => Err(err),
            None => Ok(ChatResponse {
                response: format!("echo: {}", request.message),
            }),
        }
    }
}
