//! Gateway contract and wire types for the remote CRM.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::workflows::lead_capture::Lead;

mod client;

pub use client::CrmClient;

/// Response envelope returned by the save-lead endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveLeadResponse {
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// One candidate returned by the address-autocomplete endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    pub display_name: String,
    #[serde(default)]
    pub address: SuggestionAddress,
}

/// Nested address fields of a suggestion. Every field is optional; the form
/// substitutes a placeholder for whatever the geocoder left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Error raised by the CRM gateway. Transport and server failures are passed
/// through unmodified; there are no retries.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl CrmError {
    /// Text shown to the user: the server-provided error payload when there
    /// is one, otherwise the transport error message.
    pub fn user_detail(&self) -> String {
        match self {
            CrmError::Transport(err) => err.to_string(),
            CrmError::Rejected { body, .. } => body.clone(),
        }
    }
}

/// Outbound CRM surface, abstracted so the capture workflow can be exercised
/// with in-memory fakes.
#[async_trait]
pub trait CrmGateway: Send + Sync {
    async fn save_lead(&self, lead: &Lead) -> Result<SaveLeadResponse, CrmError>;
    async fn address_autocomplete(&self, query: &str) -> Result<Vec<AddressSuggestion>, CrmError>;
}
