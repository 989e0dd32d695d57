use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::model::{
    AgentRunResponse, AgentsResponse, AnalyzeResponse, DepositId, RebalanceResponse, Strategy,
};

use super::{Backend, BackendError};

#[derive(Serialize)]
struct AnalyzeRequest {
    strategy: Strategy,
}

/// Error bodies seen in the wild: `{"message": ..}` or `{"error": ..}`.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// [`Backend`] over HTTP with a per-request timeout.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(HttpBackend {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        self.client
            .request(method, url)
            .header("Content-Type", "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            // The body may be empty or not JSON at all.
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.message.or(b.error));
            tracing::warn!(status = status.as_u16(), ?message, "backend error response");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Transport(err.to_string())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_agents(&self) -> Result<AgentsResponse, BackendError> {
        self.send(self.request(Method::GET, "/agents/all")).await
    }

    async fn analyze(&self, strategy: Strategy) -> Result<AnalyzeResponse, BackendError> {
        let request = self
            .request(Method::POST, "/analyze")
            .json(&AnalyzeRequest { strategy });
        self.send(request).await
    }

    async fn rebalance(&self, deposit_id: DepositId) -> Result<RebalanceResponse, BackendError> {
        self.send(self.request(Method::POST, &format!("/rebalance/{deposit_id}")))
            .await
    }

    async fn run_agent(&self) -> Result<AgentRunResponse, BackendError> {
        self.send(self.request(Method::POST, "/agent/run")).await
    }
}
