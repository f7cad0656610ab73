use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use tokio::sync::Semaphore;
use url::Url;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type BoxError = Box<dyn StdError + Send + Sync>;

pub const DEFAULT_MAX_CONNECTIONS: usize = 10;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(30);

/// Initial body buffer when the response carries no `Content-Length`.
const INITIAL_BODY_CAPACITY: usize = 1024;
/// Upper bound on the capacity reserved up front from `Content-Length`.
const MAX_RESERVED_BODY_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub trait HttpTransport: Send + Sync {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Connection pool settings, fixed when the transport is built.
pub struct PoolSettings {
    pub max_connections: usize,
    pub connect_timeout: Duration,
    pub socket_timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            socket_timeout: DEFAULT_SOCKET_TIMEOUT,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone)]
/// reqwest-backed transport; a semaphore caps in-flight requests so callers
/// queue instead of opening more connections.
pub struct ReqwestTransport {
    client: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl ReqwestTransport {
    pub fn new(settings: &PoolSettings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.socket_timeout)
            .pool_max_idle_per_host(settings.max_connections)
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .max_tls_version(reqwest::tls::Version::TLS_1_2);
        if let Some(user_agent) = &settings.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        Ok(Self::with_client(builder.build()?, settings.max_connections))
    }

    /// Wrap a caller-configured client.
    pub fn with_client(client: reqwest::Client, max_connections: usize) -> Self {
        Self {
            client,
            permits: Arc::new(Semaphore::new(max_connections.max(1))),
        }
    }

    #[cfg(test)]
    fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let _permit = self.permits.acquire().await?;

            let mut builder = self
                .client
                .request(request.method, request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = read_body(response).await?;
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

async fn read_body(mut response: reqwest::Response) -> Result<Vec<u8>, reqwest::Error> {
    let capacity = response
        .content_length()
        .map_or(INITIAL_BODY_CAPACITY, |len| {
            usize::try_from(len).map_or(MAX_RESERVED_BODY_CAPACITY, |len| {
                len.min(MAX_RESERVED_BODY_CAPACITY)
            })
        });
    let mut body = Vec::with_capacity(capacity);
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
