//! Client layer: connection lifecycle, request dispatch and the typed operations.

mod decode;
mod error;
mod future;
mod paging;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::runtime::{Handle, Runtime};
use tracing::debug;
use url::Url;

use crate::domain::{
    Address, ApiToken, BatchDeliveryReport, BatchDeliveryReportParams, BatchFilter, BatchId,
    DEFAULT_PAGE_SIZE, DeliveryReportFilter, GroupCreate, GroupFilter, GroupId, GroupResult,
    GroupUpdate, InboundFilter, InboundId, MoSms, MtBatchCreate, MtBatchDryRunResult,
    MtBatchResult, MtBatchUpdate, Page, PushEvent, RecipientDeliveryReport, ServicePlanId, Tags,
    TagsUpdate, ValidationError,
};
use crate::transport::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_CONNECTIONS, DEFAULT_SOCKET_TIMEOUT, HttpRequest,
    HttpResponse, HttpTransport, PoolSettings, ReqwestTransport,
    encode_batch_delivery_report_params,
};

use self::decode::{decode_empty, decode_json_required, decode_page_response};

pub use error::{UnexpectedResponse, XmsError, XmsResult};
pub use future::{Callback, CallbackRef, CallbackWrapper, CancelHandle, XmsFuture};
pub use paging::{PageFilter, PagedFetcher};

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.clxcommunications.com/xms";

pub const ENV_SERVICE_PLAN_ID: &str = "XMS_SERVICE_PLAN_ID";
pub const ENV_TOKEN: &str = "XMS_TOKEN";
pub const ENV_ENDPOINT: &str = "XMS_ENDPOINT";

const API_VERSION: &str = "v1";
const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

const FIELD_ENDPOINT: &str = "endpoint";
const FIELD_MAX_CONNECTIONS: &str = "max_connections";
const FIELD_WORKER_THREADS: &str = "worker_threads";
const FIELD_CONNECT_TIMEOUT: &str = "connect_timeout";
const FIELD_SOCKET_TIMEOUT: &str = "socket_timeout";
const FIELD_USER_AGENT: &str = "user_agent";

const BATCHES: &str = "batches";
const GROUPS: &str = "groups";
const INBOUNDS: &str = "inbounds";

#[derive(Debug, Clone)]
struct ExternalTransport {
    client: reqwest::Client,
    runtime: Handle,
}

#[derive(Debug, Clone)]
/// Builder for [`Connection`].
///
/// Use this to customize the endpoint, the connection pool, timeouts, the
/// completion handler policy, or to supply your own HTTP client.
pub struct ConnectionBuilder {
    service_plan_id: ServicePlanId,
    token: ApiToken,
    endpoint: String,
    max_connections: usize,
    connect_timeout: Option<Duration>,
    socket_timeout: Option<Duration>,
    user_agent: Option<String>,
    worker_threads: Option<usize>,
    callback_wrapper: CallbackWrapper,
    external: Option<ExternalTransport>,
}

impl ConnectionBuilder {
    /// Create a builder with the default endpoint, a pool of 10 connections
    /// and 30 second connect/socket timeouts.
    pub fn new(service_plan_id: ServicePlanId, token: ApiToken) -> Self {
        Self {
            service_plan_id,
            token,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: None,
            socket_timeout: None,
            user_agent: None,
            worker_threads: None,
            callback_wrapper: CallbackWrapper::default(),
            external: None,
        }
    }

    /// Read `XMS_SERVICE_PLAN_ID`, `XMS_TOKEN` and, if set, `XMS_ENDPOINT`.
    pub fn from_env() -> Result<Self, ValidationError> {
        let service_plan_id =
            ServicePlanId::new(std::env::var(ENV_SERVICE_PLAN_ID).unwrap_or_default())?;
        let token = ApiToken::new(std::env::var(ENV_TOKEN).unwrap_or_default())?;
        let mut builder = Self::new(service_plan_id, token);
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
            builder = builder.endpoint(endpoint);
        }
        Ok(builder)
    }

    /// Override the endpoint. It must be an absolute `http(s)` URL without
    /// query or fragment; the API path is appended to it.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Maximum number of concurrent requests, and of pooled connections.
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Timeout for each read from an open connection.
    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Number of I/O worker threads of the internal runtime.
    pub fn worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = Some(worker_threads);
        self
    }

    pub fn callback_wrapper(mut self, wrapper: CallbackWrapper) -> Self {
        self.callback_wrapper = wrapper;
        self
    }

    /// Use a caller-owned HTTP client and runtime.
    ///
    /// The connection is started on build and never shuts either down.
    /// Timeouts, user agent and worker threads belong to the supplied client
    /// and runtime, so they cannot be combined with this option.
    pub fn transport(mut self, client: reqwest::Client, runtime: Handle) -> Self {
        self.external = Some(ExternalTransport { client, runtime });
        self
    }

    /// Build a [`Connection`].
    pub fn build(self) -> XmsResult<Connection> {
        let endpoint = parse_endpoint(&self.endpoint)?;
        let headers = default_headers(&self.token)?;

        if self.max_connections == 0 {
            return Err(ValidationError::OutOfRange {
                field: FIELD_MAX_CONNECTIONS,
                min: 1,
                max: u64::MAX,
                actual: 0,
            }
            .into());
        }
        if self.worker_threads == Some(0) {
            return Err(ValidationError::OutOfRange {
                field: FIELD_WORKER_THREADS,
                min: 1,
                max: u64::MAX,
                actual: 0,
            }
            .into());
        }

        let lifecycle = match self.external {
            Some(external) => {
                let conflicting = [
                    (FIELD_CONNECT_TIMEOUT, self.connect_timeout.is_some()),
                    (FIELD_SOCKET_TIMEOUT, self.socket_timeout.is_some()),
                    (FIELD_USER_AGENT, self.user_agent.is_some()),
                    (FIELD_WORKER_THREADS, self.worker_threads.is_some()),
                ];
                if let Some(&(field, _)) = conflicting.iter().find(|(_, set)| *set) {
                    return Err(ValidationError::NotApplicable { field }.into());
                }
                Lifecycle::Started(Started {
                    http: Arc::new(ReqwestTransport::with_client(
                        external.client,
                        self.max_connections,
                    )),
                    runtime: external.runtime,
                    owned: None,
                })
            }
            None => Lifecycle::Unstarted,
        };

        Ok(Connection {
            inner: Arc::new(Inner {
                service_plan_id: self.service_plan_id,
                endpoint,
                headers,
                pool: PoolSettings {
                    max_connections: self.max_connections,
                    connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
                    socket_timeout: self.socket_timeout.unwrap_or(DEFAULT_SOCKET_TIMEOUT),
                    user_agent: self.user_agent,
                },
                worker_threads: self.worker_threads,
                callback_wrapper: self.callback_wrapper,
                lifecycle: Mutex::new(lifecycle),
            }),
        })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ValidationError> {
    let malformed = |reason: String| ValidationError::Malformed {
        field: FIELD_ENDPOINT,
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|err| malformed(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(malformed(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(malformed("not a base URL".to_owned()));
    }
    if url.query().is_some() {
        return Err(malformed("query strings are not allowed".to_owned()));
    }
    if url.fragment().is_some() {
        return Err(malformed("fragments are not allowed".to_owned()));
    }
    Ok(url)
}

fn default_headers(token: &ApiToken) -> Result<HeaderMap, ValidationError> {
    let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|err| ValidationError::Malformed {
            field: ApiToken::FIELD,
            reason: err.to_string(),
        })?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
    Ok(headers)
}

/// Runtime created by [`Connection::start`]; shut down without blocking so the
/// last clone of a connection can be dropped from async code.
struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

struct Started {
    http: Arc<dyn HttpTransport>,
    runtime: Handle,
    owned: Option<OwnedRuntime>,
}

enum Lifecycle {
    Unstarted,
    Started(Started),
    Closed,
}

struct Inner {
    service_plan_id: ServicePlanId,
    endpoint: Url,
    headers: HeaderMap,
    pool: PoolSettings,
    worker_threads: Option<usize>,
    callback_wrapper: CallbackWrapper,
    lifecycle: Mutex<Lifecycle>,
}

#[derive(Clone)]
/// Authenticated, pooled gateway to the XMS API for one service plan.
///
/// Cheap to clone; clones share the pool and lifecycle. Every operation
/// returns immediately with an [`XmsFuture`] and runs on the connection's
/// I/O workers; an optional [`Callback`] is notified on completion, through
/// the configured [`CallbackWrapper`].
///
/// Lifecycle: `Unstarted → Started → Closed`. Operations fail with
/// [`XmsError::NotStarted`] before [`start`](Self::start) and with
/// [`XmsError::Closed`] after [`close`](Self::close).
pub struct Connection {
    inner: Arc<Inner>,
}

impl Connection {
    pub fn builder(service_plan_id: ServicePlanId, token: ApiToken) -> ConnectionBuilder {
        ConnectionBuilder::new(service_plan_id, token)
    }

    pub fn service_plan_id(&self) -> &ServicePlanId {
        &self.inner.service_plan_id
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Start the I/O workers and open the connection pool.
    ///
    /// Starting a started connection is a no-op; a closed connection cannot be
    /// restarted.
    pub fn start(&self) -> XmsResult<()> {
        let mut lifecycle = self.lock();
        match &*lifecycle {
            Lifecycle::Started(_) => return Ok(()),
            Lifecycle::Closed => return Err(XmsError::Closed),
            Lifecycle::Unstarted => {}
        }

        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.enable_all().thread_name("xms-io");
        if let Some(worker_threads) = self.inner.worker_threads {
            builder.worker_threads(worker_threads);
        }
        let runtime = builder
            .build()
            .map_err(|err| XmsError::Transport(Box::new(err)))?;
        let transport = ReqwestTransport::new(&self.inner.pool)
            .map_err(|err| XmsError::Transport(Box::new(err)))?;

        *lifecycle = Lifecycle::Started(Started {
            http: Arc::new(transport),
            runtime: runtime.handle().clone(),
            owned: Some(OwnedRuntime(Some(runtime))),
        });
        debug!(
            endpoint = %self.inner.endpoint,
            max_connections = self.inner.pool.max_connections,
            "connection started"
        );
        Ok(())
    }

    /// Close the connection. Idempotent.
    ///
    /// Pending operations on an internal pool resolve to [`XmsError::Closed`]
    /// and their handlers receive a `failed` signal.
    /// A caller-supplied client and runtime are left untouched.
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.lock(), Lifecycle::Closed);
        if let Lifecycle::Started(started) = previous {
            debug!(owned_runtime = started.owned.is_some(), "connection closed");
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(*self.lock(), Lifecycle::Started(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.lock(), Lifecycle::Closed)
    }

    /// Submit a batch.
    pub fn create_batch(
        &self,
        batch: &MtBatchCreate,
        callback: Option<CallbackRef<MtBatchResult>>,
    ) -> XmsResult<XmsFuture<MtBatchResult>> {
        self.send_json(Method::POST, &[BATCHES], &[], batch, callback)
    }

    /// Simulate a batch without sending it, reporting per-recipient details
    /// for up to `number_of_recipients` recipients.
    pub fn create_batch_dry_run(
        &self,
        batch: &MtBatchCreate,
        number_of_recipients: Option<u32>,
        callback: Option<CallbackRef<MtBatchDryRunResult>>,
    ) -> XmsResult<XmsFuture<MtBatchDryRunResult>> {
        let mut query = vec![("per_recipient".to_owned(), "true".to_owned())];
        if let Some(count) = number_of_recipients {
            query.push(("number_of_recipients".to_owned(), count.to_string()));
        }
        self.send_json(Method::POST, &[BATCHES, "dry_run"], &query, batch, callback)
    }

    pub fn fetch_batch(
        &self,
        id: &BatchId,
        callback: Option<CallbackRef<MtBatchResult>>,
    ) -> XmsResult<XmsFuture<MtBatchResult>> {
        self.get(&[BATCHES, id.as_str()], &[], callback)
    }

    /// Replace a scheduled batch entirely.
    pub fn replace_batch(
        &self,
        id: &BatchId,
        batch: &MtBatchCreate,
        callback: Option<CallbackRef<MtBatchResult>>,
    ) -> XmsResult<XmsFuture<MtBatchResult>> {
        self.send_json(Method::PUT, &[BATCHES, id.as_str()], &[], batch, callback)
    }

    pub fn update_batch(
        &self,
        id: &BatchId,
        update: &MtBatchUpdate,
        callback: Option<CallbackRef<MtBatchResult>>,
    ) -> XmsResult<XmsFuture<MtBatchResult>> {
        self.send_json(Method::POST, &[BATCHES, id.as_str()], &[], update, callback)
    }

    pub fn cancel_batch(
        &self,
        id: &BatchId,
        callback: Option<CallbackRef<MtBatchResult>>,
    ) -> XmsResult<XmsFuture<MtBatchResult>> {
        let url = self.url(&[BATCHES, id.as_str()], &[])?;
        self.dispatch(
            Method::DELETE,
            url,
            None,
            callback,
            decode_json_required::<MtBatchResult>,
        )
    }

    /// Page through batches matching `filter`.
    pub fn fetch_batches(&self, filter: BatchFilter) -> PagedFetcher<BatchFilter> {
        PagedFetcher::new(self.clone(), filter)
    }

    pub fn fetch_batch_tags(
        &self,
        id: &BatchId,
        callback: Option<CallbackRef<Tags>>,
    ) -> XmsResult<XmsFuture<Tags>> {
        self.get(&[BATCHES, id.as_str(), "tags"], &[], callback)
    }

    pub fn replace_batch_tags(
        &self,
        id: &BatchId,
        tags: &Tags,
        callback: Option<CallbackRef<Tags>>,
    ) -> XmsResult<XmsFuture<Tags>> {
        self.send_json(Method::PUT, &[BATCHES, id.as_str(), "tags"], &[], tags, callback)
    }

    pub fn update_batch_tags(
        &self,
        id: &BatchId,
        update: &TagsUpdate,
        callback: Option<CallbackRef<Tags>>,
    ) -> XmsResult<XmsFuture<Tags>> {
        self.send_json(Method::POST, &[BATCHES, id.as_str(), "tags"], &[], update, callback)
    }

    pub fn fetch_delivery_report(
        &self,
        id: &BatchId,
        params: &BatchDeliveryReportParams,
        callback: Option<CallbackRef<BatchDeliveryReport>>,
    ) -> XmsResult<XmsFuture<BatchDeliveryReport>> {
        let query = encode_batch_delivery_report_params(params);
        self.get(&[BATCHES, id.as_str(), "delivery_report"], &query, callback)
    }

    pub fn fetch_recipient_delivery_report(
        &self,
        id: &BatchId,
        recipient: &Address,
        callback: Option<CallbackRef<RecipientDeliveryReport>>,
    ) -> XmsResult<XmsFuture<RecipientDeliveryReport>> {
        self.get(
            &[BATCHES, id.as_str(), "delivery_report", recipient.as_str()],
            &[],
            callback,
        )
    }

    /// Page through recipient delivery reports matching `filter`.
    pub fn fetch_delivery_reports(
        &self,
        filter: DeliveryReportFilter,
    ) -> PagedFetcher<DeliveryReportFilter> {
        PagedFetcher::new(self.clone(), filter)
    }

    pub fn create_group(
        &self,
        group: &GroupCreate,
        callback: Option<CallbackRef<GroupResult>>,
    ) -> XmsResult<XmsFuture<GroupResult>> {
        self.send_json(Method::POST, &[GROUPS], &[], group, callback)
    }

    pub fn fetch_group(
        &self,
        id: &GroupId,
        callback: Option<CallbackRef<GroupResult>>,
    ) -> XmsResult<XmsFuture<GroupResult>> {
        self.get(&[GROUPS, id.as_str()], &[], callback)
    }

    pub fn replace_group(
        &self,
        id: &GroupId,
        group: &GroupCreate,
        callback: Option<CallbackRef<GroupResult>>,
    ) -> XmsResult<XmsFuture<GroupResult>> {
        self.send_json(Method::PUT, &[GROUPS, id.as_str()], &[], group, callback)
    }

    pub fn update_group(
        &self,
        id: &GroupId,
        update: &GroupUpdate,
        callback: Option<CallbackRef<GroupResult>>,
    ) -> XmsResult<XmsFuture<GroupResult>> {
        self.send_json(Method::POST, &[GROUPS, id.as_str()], &[], update, callback)
    }

    /// Delete a group. The service answers with an empty body.
    pub fn delete_group(
        &self,
        id: &GroupId,
        callback: Option<CallbackRef<()>>,
    ) -> XmsResult<XmsFuture<()>> {
        let url = self.url(&[GROUPS, id.as_str()], &[])?;
        self.dispatch(Method::DELETE, url, None, callback, decode_empty)
    }

    pub fn fetch_group_members(
        &self,
        id: &GroupId,
        callback: Option<CallbackRef<Vec<Address>>>,
    ) -> XmsResult<XmsFuture<Vec<Address>>> {
        self.get(&[GROUPS, id.as_str(), "members"], &[], callback)
    }

    /// Page through groups matching `filter`.
    pub fn fetch_groups(&self, filter: GroupFilter) -> PagedFetcher<GroupFilter> {
        PagedFetcher::new(self.clone(), filter)
    }

    pub fn fetch_group_tags(
        &self,
        id: &GroupId,
        callback: Option<CallbackRef<Tags>>,
    ) -> XmsResult<XmsFuture<Tags>> {
        self.get(&[GROUPS, id.as_str(), "tags"], &[], callback)
    }

    pub fn replace_group_tags(
        &self,
        id: &GroupId,
        tags: &Tags,
        callback: Option<CallbackRef<Tags>>,
    ) -> XmsResult<XmsFuture<Tags>> {
        self.send_json(Method::PUT, &[GROUPS, id.as_str(), "tags"], &[], tags, callback)
    }

    pub fn update_group_tags(
        &self,
        id: &GroupId,
        update: &TagsUpdate,
        callback: Option<CallbackRef<Tags>>,
    ) -> XmsResult<XmsFuture<Tags>> {
        self.send_json(Method::POST, &[GROUPS, id.as_str(), "tags"], &[], update, callback)
    }

    pub fn fetch_inbound(
        &self,
        id: &InboundId,
        callback: Option<CallbackRef<MoSms>>,
    ) -> XmsResult<XmsFuture<MoSms>> {
        self.get(&[INBOUNDS, id.as_str()], &[], callback)
    }

    /// Page through inbound messages matching `filter`.
    pub fn fetch_inbounds(&self, filter: InboundFilter) -> PagedFetcher<InboundFilter> {
        PagedFetcher::new(self.clone(), filter)
    }

    pub(crate) fn fetch_page<F: PageFilter>(
        &self,
        filter: &F,
        page: u32,
        callback: Option<CallbackRef<Page<F::Item>>>,
    ) -> XmsResult<XmsFuture<Page<F::Item>>> {
        let requested_page_size = filter.page_size().unwrap_or(DEFAULT_PAGE_SIZE);
        let url = self.url(&[filter.resource()], &filter.query_params(page))?;
        self.dispatch(Method::GET, url, None, callback, move |path, response| {
            decode_page_response(path, response, requested_page_size)
        })
    }

    fn get<T>(
        &self,
        segments: &[&str],
        query: &[(String, String)],
        callback: Option<CallbackRef<T>>,
    ) -> XmsResult<XmsFuture<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.url(segments, query)?;
        self.dispatch(Method::GET, url, None, callback, decode_json_required::<T>)
    }

    fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(String, String)],
        body: &B,
        callback: Option<CallbackRef<T>>,
    ) -> XmsResult<XmsFuture<T>>
    where
        B: Serialize,
        T: DeserializeOwned + Send + 'static,
    {
        let body = serde_json::to_vec(body).map_err(XmsError::Encode)?;
        let url = self.url(segments, query)?;
        self.dispatch(method, url, Some(body), callback, decode_json_required::<T>)
    }

    /// `<endpoint>/v1/<service plan>/<segments...>?<query>`, each segment escaped.
    fn url(&self, segments: &[&str], query: &[(String, String)]) -> XmsResult<Url> {
        let mut url = self.inner.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| ValidationError::Malformed {
                field: FIELD_ENDPOINT,
                reason: "not a base URL".to_owned(),
            })?
            .pop_if_empty()
            .push(API_VERSION)
            .push(self.inner.service_plan_id.as_str())
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn dispatch<T, D>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        callback: Option<CallbackRef<T>>,
        decode: D,
    ) -> XmsResult<XmsFuture<T>>
    where
        T: Send + 'static,
        D: FnOnce(&str, HttpResponse) -> XmsResult<T> + Send + 'static,
    {
        let (http, runtime) = self.active()?;
        let callback = self.inner.callback_wrapper.wrap(callback);
        let request = HttpRequest {
            method,
            url,
            headers: self.inner.headers.clone(),
            body,
        };

        Ok(future::spawn(&runtime, callback, async move {
            let method = request.method.clone();
            let path = request.url.path().to_owned();
            debug!(%method, path = path.as_str(), "sending request");

            let response = http.send(request).await.map_err(XmsError::Transport)?;
            debug!(
                %method,
                path = path.as_str(),
                status = response.status.as_u16(),
                body_size = response.body.len(),
                "received response"
            );
            decode(&path, response)
        }))
    }

    fn active(&self) -> XmsResult<(Arc<dyn HttpTransport>, Handle)> {
        match &*self.lock() {
            Lifecycle::Started(started) => {
                Ok((Arc::clone(&started.http), started.runtime.clone()))
            }
            Lifecycle::Unstarted => Err(XmsError::NotStarted),
            Lifecycle::Closed => Err(XmsError::Closed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.inner
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match *self.lock() {
            Lifecycle::Unstarted => "unstarted",
            Lifecycle::Started(_) => "started",
            Lifecycle::Closed => "closed",
        };
        f.debug_struct("Connection")
            .field("service_plan_id", &self.inner.service_plan_id)
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("state", &state)
            .finish()
    }
}

/// Decode a payload POSTed by the service to a callback URL.
pub fn parse_push_event(body: &[u8]) -> XmsResult<PushEvent> {
    serde_json::from_slice(body).map_err(XmsError::Parse)
}
