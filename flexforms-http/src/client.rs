//! ReqwestTransport

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flexforms::{AjaxRequest, AjaxResponse, RequestBody, Transport, TransportError};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, multipart};
use url::Url;

use crate::error::{BuildError, transport_error};

/// Sends remote form submissions over HTTP.
///
/// Cheap to clone; clones share the connection pool. Relative request URLs
/// such as a form's `action="/orders"` are resolved against the configured
/// base URL. Non-2xx responses are returned as responses, not errors.
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: Arc<ReqwestTransportInner>,
}

struct ReqwestTransportInner {
    http_client: Client,
    base_url: Option<Url>,
    timeout: Option<Duration>,
    default_headers: HeaderMap,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("base_url", &self.inner.base_url.as_ref().map(Url::as_str))
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl ReqwestTransport {
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::new()
    }

    /// Transport with default settings and no base URL.
    pub fn new() -> Result<Self, BuildError> {
        Self::builder().build()
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.inner.base_url.as_ref()
    }

    fn resolve(&self, raw: &str) -> Result<Url, TransportError> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.inner.base_url {
                Some(base) => base
                    .join(raw)
                    .map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}"))),
                None => Err(TransportError::InvalidUrl(format!(
                    "{raw}: relative URL and no base URL configured"
                ))),
            },
            Err(e) => Err(TransportError::InvalidUrl(format!("{raw}: {e}"))),
        }
    }

    fn request_headers(&self, request: &AjaxRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = self.inner.default_headers.clone();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Encode(format!("header {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Encode(format!("header {name}: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: AjaxRequest) -> Result<AjaxResponse, TransportError> {
        let url = self.resolve(&request.url)?;
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| TransportError::Encode(format!("method {:?}", request.method)))?;
        let mut headers = self.request_headers(&request)?;

        log::debug!("[http] {} {}", method, url);
        let mut builder = self.inner.http_client.request(method, url.clone());

        builder = match request.body {
            // An explicit content type wins over the one `json` sets.
            RequestBody::Json(value) => builder.headers(headers).json(&value),
            RequestBody::FormData(entries) => {
                // The multipart boundary is chosen by the client.
                headers.remove(CONTENT_TYPE);
                let form = entries
                    .into_iter()
                    .fold(multipart::Form::new(), |form, (name, value)| form.text(name, value));
                builder.headers(headers).multipart(form)
            }
        };

        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, self.inner.timeout))?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.inner.timeout))?;

        log::debug!("[http] {} answered {}", url, status);
        Ok(AjaxResponse {
            status,
            headers,
            body,
        })
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ReqwestTransport`].
///
/// # Example
///
/// ```ignore
/// let transport = ReqwestTransport::builder()
///     .base_url("https://shop.example.com")
///     .default_header("X-Requested-With", "XMLHttpRequest")
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ReqwestTransportBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    default_headers: Vec<(String, String)>,
    http_client: Option<Client>,
}

impl ReqwestTransportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL that relative request URLs are resolved against.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// Only applied when the builder creates the HTTP client itself.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Header sent with every request unless the request sets it.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, BuildError> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        let base_url = self.base_url.as_deref().map(Url::parse).transpose()?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in self.default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| BuildError::Header(name.clone()))?;
            let header_value =
                HeaderValue::from_str(&value).map_err(|_| BuildError::Header(name.clone()))?;
            default_headers.insert(header_name, header_value);
        }

        Ok(ReqwestTransport {
            inner: Arc::new(ReqwestTransportInner {
                http_client,
                base_url,
                timeout: self.timeout,
                default_headers,
            }),
        })
    }
}
