use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{
    Client, Response,
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect,
};
use tokio::time::Instant;
use tracing::debug;

use crate::domain::{HttpResponse, RequestTemplate};
use crate::error::{HttpError, TransportError, TransportErrorKind};

use super::RequestExecutor;

pub const DEFAULT_USER_AGENT: &str = concat!("restbench/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub redirect_limit: u32,
    pub user_agent: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            redirect_limit: 10,
            user_agent: Some(DEFAULT_USER_AGENT.to_owned()),
        }
    }
}

/// Production executor backed by one pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    /// Builds the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend or client cannot be initialised.
    pub fn new(settings: &ClientSettings) -> Result<Self, HttpError> {
        let mut builder = Client::builder().connect_timeout(settings.connect_timeout);

        if let Some(user_agent) = settings.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }

        builder = if settings.redirect_limit == 0 {
            builder.redirect(redirect::Policy::none())
        } else {
            builder.redirect(redirect::Policy::limited(
                usize::try_from(settings.redirect_limit).unwrap_or(10),
            ))
        };

        let client = builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self { client })
    }

    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestExecutor for ReqwestExecutor {
    async fn execute(
        &self,
        request: &RequestTemplate,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let url = url::Url::parse(request.url.trim()).map_err(|err| {
            TransportError::invalid_request(format!("invalid URL '{}': {}", request.url, err))
        })?;
        let headers = build_header_map(&request.headers)?;

        let mut builder = self
            .client
            .request(request.method.into(), url)
            .headers(headers)
            .timeout(timeout);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(classify_error)?;
        let status = response.status();
        let headers = flatten_headers(response.headers());
        let body = read_body(response).await?;
        let duration = start.elapsed();
        debug!(
            "{} {} -> {} in {}ms",
            request.method.as_str(),
            request.url,
            status.as_u16(),
            duration.as_millis()
        );

        Ok(HttpResponse {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_owned(),
            headers,
            body,
            duration,
        })
    }
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.trim().as_bytes()).map_err(|err| {
            TransportError::invalid_request(format!("invalid header name '{}': {}", key, err))
        })?;
        let value = HeaderValue::from_str(value.trim()).map_err(|err| {
            TransportError::invalid_request(format!("invalid header value for '{}': {}", key, err))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

/// First value per header name; non-UTF-8 values are replaced lossily.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (name, value) in headers {
        flat.entry(name.as_str().to_owned())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    flat
}

async fn read_body(response: Response) -> Result<String, TransportError> {
    let mut stream = response.bytes_stream();
    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|err| {
            if err.is_timeout() {
                TransportError::timeout(err.to_string())
            } else {
                TransportError::new(TransportErrorKind::Body, err.to_string())
            }
        })?;
        body.extend_from_slice(&bytes);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn classify_error(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_builder() {
        TransportErrorKind::InvalidRequest
    } else {
        TransportErrorKind::Request
    };
    TransportError::new(kind, err.to_string())
}
