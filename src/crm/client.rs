use async_trait::async_trait;
use tracing::debug;

use super::{AddressSuggestion, CrmError, CrmGateway, SaveLeadResponse};
use crate::config::CrmConfig;
use crate::workflows::lead_capture::Lead;

const SAVE_LEAD_PATH: &str = "/crm/flk/save-lead/";
const AUTOCOMPLETE_PATH: &str = "/crm/address-autocomplete/";

/// Reqwest-backed CRM client bound to a configured base URL.
#[derive(Debug, Clone)]
pub struct CrmClient {
    http: reqwest::Client,
    base_url: String,
}

impl CrmClient {
    pub fn new(config: &CrmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url().to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn reject_on_error_status(response: reqwest::Response) -> Result<reqwest::Response, CrmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(CrmError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CrmGateway for CrmClient {
    async fn save_lead(&self, lead: &Lead) -> Result<SaveLeadResponse, CrmError> {
        let url = self.endpoint(SAVE_LEAD_PATH);
        debug!(%url, "submitting lead");

        let response = self.http.post(&url).json(lead).send().await?;
        let response = Self::reject_on_error_status(response).await?;
        Ok(response.json::<SaveLeadResponse>().await?)
    }

    async fn address_autocomplete(&self, query: &str) -> Result<Vec<AddressSuggestion>, CrmError> {
        let url = self.endpoint(AUTOCOMPLETE_PATH);
        debug!(%url, query, "looking up address suggestions");

        let response = self
            .http
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await?;
        let response = Self::reject_on_error_status(response).await?;
        Ok(response.json::<Vec<AddressSuggestion>>().await?)
    }
}
