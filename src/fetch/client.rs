use async_trait::async_trait;
use reqwest::{Request, Response};

/// The seam every upstream request goes through.
///
/// Wrappers such as [`BrowserHeaders`](super::BrowserHeaders) decorate an inner
/// client and forward to it.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// The reqwest-backed client.
///
/// No timeouts are configured: a hung request blocks the run until the
/// process is killed.
#[derive(Debug, Clone, Default)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.0.execute(req).await
    }
}
