//! The request provider: targets go in, results come out.
//!
//! The provider maps a target to an [`Endpoint`], the endpoint to a
//! transport request, decides whether the dispatch is stubbed, runs the
//! plugin pipeline around the dispatch, and delivers exactly one terminal
//! result per request (unless the request is cancelled first).

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::endpoint::{Endpoint, SampleResponse, SampleResponseFn};
use crate::error::{Error, Result};
use crate::plugin::Plugin;
use crate::response::{RequestInfo, Response};
use crate::target::Target;
use crate::transport::{ReqwestTransport, Transfer, Transport, TransportRequest, convert_to_result};
use crate::types::ProgressFn;
use crate::utils::cancel::CancelToken;

mod inflight;
mod stub;

use inflight::{EndpointKey, InflightTable};
pub use stub::StubBehavior;
use stub::sample_to_result;

/// Maps a target to the endpoint describing its request.
pub type EndpointFn<T> = Arc<dyn Fn(&T) -> Endpoint + Send + Sync>;

/// Resolves an endpoint into a transport request; may be asynchronous and
/// must produce exactly one result.
pub type RequestFn = Arc<dyn Fn(Endpoint) -> BoxFuture<'static, Result<reqwest::Request>> + Send + Sync>;

/// Decides if and how a target's request is stubbed.
pub type StubFn<T> = Arc<dyn Fn(&T) -> StubBehavior + Send + Sync>;

/// The standard target-to-endpoint mapping: the URL is `base_url` resolved
/// against `path`, and the sample producer echoes the target's sample data
/// with status 200.
pub fn default_endpoint_mapping<T: Target>(target: &T) -> Endpoint {
    let base = target.base_url();
    let path = target.path();
    let url = match reqwest::Url::parse(&base).and_then(|base| base.join(&path)) {
        Ok(url) => url.to_string(),
        // An unresolvable pair is kept verbatim so the failure surfaces as a
        // RequestMapping error at materialization time.
        Err(_) => format!("{base}{path}"),
    };
    let sample_data = target.sample_data();
    Endpoint::new(
        url,
        Arc::new(move || SampleResponse::NetworkResponse {
            status_code: 200,
            data: sample_data.clone(),
        }),
        target.method(),
        target.task(),
        target.headers(),
    )
}

/// The standard endpoint-to-request mapping: materialize the endpoint,
/// keeping mapping and encoding failures as-is and wrapping anything else
/// as an underlying error.
pub fn default_request_mapping(endpoint: Endpoint) -> BoxFuture<'static, Result<reqwest::Request>> {
    Box::pin(async move {
        endpoint.request().map_err(|error| match error {
            mapped @ (Error::RequestMapping { .. } | Error::ParameterEncoding { .. }) => mapped,
            other => Error::underlying(other, None),
        })
    })
}

/// Do not stub.
pub fn never_stub<T: Target>(_: &T) -> StubBehavior {
    StubBehavior::Never
}

/// Return the sample response immediately.
pub fn immediately_stub<T: Target>(_: &T) -> StubBehavior {
    StubBehavior::Immediate
}

/// Return the sample response after a delay.
pub fn delayed_stub<T: Target>(delay: Duration) -> impl Fn(&T) -> StubBehavior + Send + Sync {
    move |_| StubBehavior::Delayed(delay)
}

/// The caller-held handle for one request.
///
/// Returned synchronously by [`Provider::request`]; the result is observed
/// with [`RequestHandle::join`], and the request can be aborted at any time
/// with [`RequestHandle::cancel`].
pub struct RequestHandle {
    cancel: CancelToken,
    receiver: oneshot::Receiver<Result<Response>>,
}

impl RequestHandle {
    /// Cancel the request. Idempotent; once cancelled, no result is ever
    /// delivered.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A clone of the cancellation token, for sharing across tasks.
    pub fn token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the terminal result. Resolves to `None` when the request was
    /// cancelled before completion.
    pub async fn join(self) -> Option<Result<Response>> {
        self.receiver.await.ok()
    }
}

/// Request provider. Requests are made through this type only.
pub struct Provider<T: Target> {
    inner: Arc<Inner<T>>,
}

impl<T: Target> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Target> Default for Provider<T> {
    fn default() -> Self {
        Self::builder().build()
    }
}

struct Inner<T: Target> {
    endpoint_fn: EndpointFn<T>,
    request_fn: RequestFn,
    stub_fn: StubFn<T>,
    transport: Arc<dyn Transport>,
    plugins: Vec<Arc<dyn Plugin<T>>>,
    track_inflights: bool,
    inflight: InflightTable,
}

impl<T: Target> Provider<T> {
    /// A provider with all defaults: standard mappings, no stubbing, the
    /// reqwest transport, no plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start configuring a provider.
    pub fn builder() -> ProviderBuilder<T> {
        ProviderBuilder::new()
    }

    /// The endpoint this provider computes for a target.
    pub fn endpoint(&self, target: &T) -> Endpoint {
        (self.inner.endpoint_fn)(target)
    }

    /// Designated request-making method. Returns a handle that can cancel
    /// the request and await its result.
    ///
    /// Must be called within a tokio runtime; the pipeline runs on a
    /// spawned task.
    pub fn request(&self, target: T) -> RequestHandle {
        self.request_with_progress(target, None)
    }

    /// Like [`Provider::request`], additionally reporting transfer progress
    /// for streaming uploads and downloads.
    pub fn request_with_progress(&self, target: T, progress: Option<ProgressFn>) -> RequestHandle {
        let token = CancelToken::new();
        let (sender, receiver) = oneshot::channel();

        let endpoint = (self.inner.endpoint_fn)(&target);
        let key = EndpointKey::new(&endpoint);

        let sender = if self.inner.track_inflights {
            match self
                .inner
                .inflight
                .try_join(key.clone(), token.clone(), sender)
            {
                // Coalesced onto an in-flight dispatch; no new work.
                Ok(()) => {
                    tracing::debug!(
                        target: "reqtarget::provider",
                        url = %endpoint.url,
                        "coalesced onto in-flight request"
                    );
                    return RequestHandle {
                        cancel: token,
                        receiver,
                    };
                }
                Err(sender) => sender,
            }
        } else {
            sender
        };

        let inner = self.inner.clone();
        let task_token = token.clone();
        tokio::spawn(async move {
            inner
                .perform(target, endpoint, key, sender, progress, task_token)
                .await;
        });

        RequestHandle {
            cancel: token,
            receiver,
        }
    }
}

impl<T: Target> Inner<T> {
    async fn perform(
        &self,
        target: T,
        endpoint: Endpoint,
        key: EndpointKey,
        sender: oneshot::Sender<Result<Response>>,
        progress: Option<ProgressFn>,
        token: CancelToken,
    ) {
        let mut endpoint = endpoint;
        for plugin in &self.plugins {
            endpoint = plugin.prepare(endpoint, &target);
        }

        let sample = endpoint.sample_response.clone();
        let transfer = Transfer::from_task(&endpoint.task);
        let behavior = (self.stub_fn)(&target);

        let request = match (self.request_fn)(endpoint).await {
            Ok(request) => request,
            Err(error) => {
                // Mapping failed before dispatch: `prepare` has already run,
                // the observation hooks are skipped.
                self.deliver(&key, sender, &token, Err(error));
                return;
            }
        };

        let request_info = RequestInfo::from_request(&request);
        for plugin in &self.plugins {
            plugin.will_send(&request, &target);
        }

        let outcome = match behavior {
            StubBehavior::Never => {
                let dispatch = self
                    .transport
                    .send(TransportRequest { request, transfer }, progress);
                tokio::select! {
                    _ = token.cancelled() => None,
                    raw = dispatch => Some(convert_to_result(raw, Some(request_info))),
                }
            }
            stubbed => self.stub(stubbed, sample, request_info, &token).await,
        };

        match outcome {
            Some(mut result) => {
                for plugin in &self.plugins {
                    result = plugin.process(result, &target);
                }
                for plugin in &self.plugins {
                    plugin.did_receive(&result, &target);
                }
                self.deliver(&key, sender, &token, result);
            }
            None => self.abandon(&key),
        }
    }

    /// Synthesize the stubbed outcome, honoring the configured timing.
    /// `None` means the request was cancelled before delivery.
    async fn stub(
        &self,
        behavior: StubBehavior,
        sample: SampleResponseFn,
        request_info: RequestInfo,
        token: &CancelToken,
    ) -> Option<Result<Response>> {
        match behavior {
            StubBehavior::Never => {
                // Reachable only by bypassing dispatch selection.
                panic!("stub execution requested while stubbing is disabled")
            }
            StubBehavior::Immediate => {}
            StubBehavior::Delayed(delay) => {
                tokio::select! {
                    _ = token.cancelled() => return None,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
        if token.is_cancelled() {
            return None;
        }
        Some(sample_to_result(sample(), Some(request_info)))
    }

    /// Deliver the terminal result to the caller and any coalesced waiters.
    /// Exactly-once: a cancelled request delivers nothing.
    fn deliver(
        &self,
        key: &EndpointKey,
        sender: oneshot::Sender<Result<Response>>,
        token: &CancelToken,
        result: Result<Response>,
    ) {
        if token.is_cancelled() {
            self.abandon(key);
            return;
        }
        if self.track_inflights {
            for waiter in self.inflight.complete(key) {
                if !waiter.token.is_cancelled() {
                    let _ = waiter.sender.send(result.clone());
                }
            }
        }
        let _ = sender.send(result);
    }

    /// Drop the in-flight entry without delivering; pending waiters resolve
    /// as cancelled.
    fn abandon(&self, key: &EndpointKey) {
        if self.track_inflights {
            drop(self.inflight.complete(key));
        }
    }
}

/// Builder for [`Provider`]; every collaborator is injectable and has a
/// default.
pub struct ProviderBuilder<T: Target> {
    endpoint_fn: Option<EndpointFn<T>>,
    request_fn: Option<RequestFn>,
    stub_fn: Option<StubFn<T>>,
    transport: Option<Arc<dyn Transport>>,
    plugins: Vec<Arc<dyn Plugin<T>>>,
    track_inflights: bool,
}

impl<T: Target> Default for ProviderBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Target> ProviderBuilder<T> {
    /// Create a builder with nothing configured.
    pub fn new() -> Self {
        Self {
            endpoint_fn: None,
            request_fn: None,
            stub_fn: None,
            transport: None,
            plugins: Vec::new(),
            track_inflights: false,
        }
    }

    /// Replace the target-to-endpoint mapping.
    pub fn endpoint_mapping(mut self, f: impl Fn(&T) -> Endpoint + Send + Sync + 'static) -> Self {
        self.endpoint_fn = Some(Arc::new(f));
        self
    }

    /// Replace the endpoint-to-request mapping.
    pub fn request_mapping(
        mut self,
        f: impl Fn(Endpoint) -> BoxFuture<'static, Result<reqwest::Request>> + Send + Sync + 'static,
    ) -> Self {
        self.request_fn = Some(Arc::new(f));
        self
    }

    /// Replace the stubbing policy.
    pub fn stub(mut self, f: impl Fn(&T) -> StubBehavior + Send + Sync + 'static) -> Self {
        self.stub_fn = Some(Arc::new(f));
        self
    }

    /// Replace the transport collaborator.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Register a plugin. Registration order is invocation order.
    pub fn plugin(mut self, plugin: impl Plugin<T> + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Coalesce concurrent requests that map to the same endpoint.
    pub fn track_inflights(mut self, track: bool) -> Self {
        self.track_inflights = track;
        self
    }

    /// Build the provider, filling unset collaborators with defaults.
    pub fn build(self) -> Provider<T> {
        Provider {
            inner: Arc::new(Inner {
                endpoint_fn: self
                    .endpoint_fn
                    .unwrap_or_else(|| Arc::new(default_endpoint_mapping)),
                request_fn: self
                    .request_fn
                    .unwrap_or_else(|| Arc::new(default_request_mapping)),
                stub_fn: self.stub_fn.unwrap_or_else(|| Arc::new(never_stub)),
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
                plugins: self.plugins,
                track_inflights: self.track_inflights,
                inflight: InflightTable::default(),
            }),
        }
    }
}
