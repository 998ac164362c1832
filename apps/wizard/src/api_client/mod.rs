/// API Client: the single point of entry for all calls to the remote analysis gateway.
///
/// Every request resolves to an `ApiResponse`. Transport failures, non-2xx statuses and
/// undecodable bodies are folded into `success = false`; nothing here returns `Err`
/// once the client is built.
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

const CONNECTION_ERROR: &str = "Could not connect to the server";
const REQUEST_FAILED: &str = "The request failed";

/// Uniform result of a gateway call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error body shape the gateway uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    detail: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Issues a GET and decodes a JSON body.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResponse<T> {
        let response = self
            .client
            .get(self.url(endpoint))
            .header("content-type", "application/json")
            .send()
            .await;
        decode_json(endpoint, response).await
    }

    /// Issues a POST with a JSON body and decodes a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResponse<T> {
        let response = self
            .client
            .post(self.url(endpoint))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await;
        decode_json(endpoint, response).await
    }

    /// Issues a GET and returns the raw body (used for PDF downloads).
    pub async fn get_bytes(&self, endpoint: &str) -> ApiResponse<Bytes> {
        let response = match self.client.get(self.url(endpoint)).send().await {
            Ok(r) => r,
            Err(e) => {
                error!("Request to {endpoint} failed: {e}");
                return ApiResponse::failed(CONNECTION_ERROR);
            }
        };

        if !response.status().is_success() {
            return ApiResponse::failed(error_message(endpoint, response).await);
        }

        match response.bytes().await {
            Ok(body) => ApiResponse::ok(body),
            Err(e) => {
                error!("Reading body from {endpoint} failed: {e}");
                ApiResponse::failed(CONNECTION_ERROR)
            }
        }
    }
}

async fn decode_json<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Result<Response>,
) -> ApiResponse<T> {
    let response = match response {
        Ok(r) => r,
        Err(e) => {
            error!("Request to {endpoint} failed: {e}");
            return ApiResponse::failed(CONNECTION_ERROR);
        }
    };

    if !response.status().is_success() {
        return ApiResponse::failed(error_message(endpoint, response).await);
    }

    match response.json::<T>().await {
        Ok(data) => {
            debug!("Request to {endpoint} succeeded");
            ApiResponse::ok(data)
        }
        Err(e) => {
            error!("Undecodable response from {endpoint}: {e}");
            ApiResponse::failed(CONNECTION_ERROR)
        }
    }
}

/// Pulls `detail` out of a gateway error body, falling back to a generic message.
async fn error_message(endpoint: &str, response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!("Gateway returned {status} for {endpoint}: {body}");
    serde_json::from_str::<GatewayErrorBody>(&body)
        .ok()
        .and_then(|e| e.detail)
        .unwrap_or_else(|| REQUEST_FAILED.to_string())
}
