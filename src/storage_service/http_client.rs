use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::TransportError;

/// Timeout applied to every request. There is no mid-request cancellation;
/// a hung server surfaces as a `Network` error after this long.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP transport for the storage server API.
///
/// Holds the resolved base address and attaches the bearer header the caller
/// passes in. No retries, no caching; every call maps to exactly one request.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a transport for the given server address. A trailing slash on
    /// the address is stripped so API paths can always start with `/`.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for an API path.
    pub fn full_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET with optional authorization header.
    pub async fn get<T>(&self, path: &str, auth: Option<&str>) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        let url = self.full_url(path);
        debug!("GET {}", url);
        let mut request = self.client.get(&url);
        if let Some(header) = auth {
            request = request.header("Authorization", header);
        }
        Self::decode(request.send().await?).await
    }

    /// POST a JSON body with optional authorization header.
    pub async fn post<T, B>(&self, path: &str, body: &B, auth: Option<&str>) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = self.full_url(path);
        debug!("POST {}", url);
        let mut request = self.client.post(&url).json(body);
        if let Some(header) = auth {
            request = request.header("Authorization", header);
        }
        Self::decode(request.send().await?).await
    }

    /// DELETE with a JSON body and optional authorization header.
    pub async fn delete<T, B>(&self, path: &str, body: &B, auth: Option<&str>) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = self.full_url(path);
        debug!("DELETE {}", url);
        let mut request = self.client.delete(&url).json(body);
        if let Some(header) = auth {
            request = request.header("Authorization", header);
        }
        Self::decode(request.send().await?).await
    }

    /// Map a response to the expected payload: exactly 200 parses the body
    /// as JSON, any other status, 2xx included, is surfaced with its status
    /// code and raw body text, never as the expected type.
    async fn decode<T>(response: reqwest::Response) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status == reqwest::StatusCode::OK {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}
