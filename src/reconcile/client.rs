/*!
 * HTTP client for the dashboard's sheet endpoints.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::Serialize;

use super::{ReconciliationResult, SheetService};
use crate::database::repository::Messages;
use crate::errors::AppError;

/// Request body for the reconciliation endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryRequest<'a> {
    text: &'a [String],
    current_language: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status_message: Option<String>,
}

/// Client for `{dashboardUrl}/api/sheets/{id}/…`
#[derive(Debug, Clone)]
pub struct DashboardClient {
    /// HTTP client for API requests
    client: Client,
    /// Dashboard base URL without trailing slash
    base_url: String,
    /// Bearer token
    token: String,
}

impl DashboardClient {
    /// Create a client for the dashboard at `base_url`
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn sheet_url(&self, scope_id: &str, endpoint: &str) -> String {
        format!("{}/api/sheets/{}/{}", self.base_url, scope_id, endpoint)
    }

    /// Turn a non-success response into `Remote`, preferring the server's message
    async fn check(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.status_message))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        error!("Dashboard responded {}: {}", status.as_u16(), message);
        Err(AppError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SheetService for DashboardClient {
    async fn reconcile(
        &self,
        scope_id: &str,
        texts: &[String],
        source_locale: &str,
    ) -> Result<ReconciliationResult, AppError> {
        let url = self.sheet_url(scope_id, "entry");
        debug!("PUT {} ({} texts)", url, texts.len());

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&EntryRequest {
                text: texts,
                current_language: source_locale,
            })
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<ReconciliationResult>()
            .await
            .map_err(|e| AppError::Network(format!("Invalid reconciliation response: {}", e)))
    }

    async fn messages(&self, scope_id: &str) -> Result<Messages, AppError> {
        let url = self.sheet_url(scope_id, "messages");
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<Messages>()
            .await
            .map_err(|e| AppError::Network(format!("Invalid messages response: {}", e)))
    }
}
