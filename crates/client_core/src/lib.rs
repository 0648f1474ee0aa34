use std::sync::Arc;

use anyhow::{Context, Result};
use shared::protocol::ContactRecord;
use tracing::info;

pub mod api;
pub mod config;
pub mod contact;
pub mod conversation;
pub mod error;
pub mod store;
pub mod validation;

#[cfg(test)]
#[path = "tests/fake_api.rs"]
pub(crate) mod fake_api;

pub use api::{HttpSiteApi, SiteApi};
pub use config::{load_settings, Settings};
pub use contact::{ContactController, ContactFormState, SubmitOutcome, SubmitStatus};
pub use conversation::{
    ChatTurn, ConversationController, ConversationState, KeyInput, KeyOutcome, TurnOutcome,
};
pub use error::ClientError;
pub use store::StateStore;
pub use validation::{validate, FormRules, ValidationReport};

/// Both site workflows wired to one backend client.
pub struct SiteClient {
    api: Arc<dyn SiteApi>,
    pub contact: ContactController,
    pub conversation: ConversationController,
}

impl SiteClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.validate()?;
        let api = HttpSiteApi::from_settings(settings).context("failed to build http client")?;
        info!(%base_url, "site client ready");
        Ok(Self::with_api(Arc::new(api), settings))
    }

    pub fn with_api(api: Arc<dyn SiteApi>, settings: &Settings) -> Self {
        let rules = FormRules {
            phone_required: settings.phone_required,
        };
        Self {
            contact: ContactController::with_rules(Arc::clone(&api), rules),
            conversation: ConversationController::with_history_window(
                Arc::clone(&api),
                settings.chat_history_window,
            ),
            api,
        }
    }

    /// Admin listing of every stored contact submission.
    pub async fn list_contacts(&self) -> Result<Vec<ContactRecord>> {
        self.api
            .get_all_contacts()
            .await
            .context("failed to fetch contacts")
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
