use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER,
};

/// An [`HttpClient`] wrapper that stamps the header set the BMTC web portal
/// sends on every request.
///
/// The upstream API rejects requests that do not look like they come from the
/// portal, so every call made by the collectors goes through this wrapper.
/// Headers already present on a request are overwritten.
pub struct BrowserHeaders<C> {
    pub inner: C,
    pub headers: HeaderMap,
}

impl<C> BrowserHeaders<C> {
    /// Wraps `inner` with the portal's default header set.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            headers: portal_headers(),
        }
    }
}

/// Headers emulating the BMTC web portal.
pub fn portal_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(HeaderName::from_static("lan"), HeaderValue::from_static("en"));
    headers.insert(
        HeaderName::from_static("devicetype"),
        HeaderValue::from_static("WEB"),
    );
    headers.insert(
        ORIGIN,
        HeaderValue::from_static("https://bmtcwebportal.amnex.com"),
    );
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://bmtcwebportal.amnex.com/"),
    );
    headers
}

#[async_trait]
impl<C: HttpClient> HttpClient for BrowserHeaders<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        for (name, value) in &self.headers {
            req.headers_mut().insert(name.clone(), value.clone());
        }
        self.inner.execute(req).await
    }
}
