mod client;
mod headers;

pub use client::{BasicClient, HttpClient};
pub use headers::{BrowserHeaders, portal_headers};

use anyhow::Result;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An upstream response whose body has been read in full.
///
/// Nothing is written to disk until a response reaches this state, so a
/// transport failure halfway through a body never leaves a partial artifact.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ApiResponse {
    /// Only HTTP 200 counts as success; other 2xx codes are treated as failures.
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Sends a POST to `url` with an optional raw body and reads the full response.
pub async fn post_bytes<C: HttpClient>(
    client: &C,
    url: &str,
    body: Option<Vec<u8>>,
) -> Result<ApiResponse> {
    let mut req = reqwest::Request::new(Method::POST, url.parse()?);
    if let Some(body) = body {
        *req.body_mut() = Some(body.into());
    }

    let resp = client.execute(req).await?;
    let status = resp.status();
    let body = resp.bytes().await?;
    Ok(ApiResponse { status, body })
}

/// Serializes `payload` as JSON and POSTs it to `url`.
pub async fn post_json<C, B>(client: &C, url: &str, payload: &B) -> Result<ApiResponse>
where
    C: HttpClient,
    B: Serialize + ?Sized,
{
    let body = serde_json::to_vec(payload)?;
    post_bytes(client, url, Some(body)).await
}
