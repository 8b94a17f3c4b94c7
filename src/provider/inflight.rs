//! Coalescing of concurrent requests to the same endpoint.

use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::response::Response;
use crate::types::{Method, TaskKind};
use crate::utils::cancel::CancelToken;

/// Stable identity for an endpoint, used as the coalescing key.
///
/// Identity is structural over method, URL, headers, and the task's variant
/// discriminant; task payloads (bodies, streams) are deliberately excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EndpointKey {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    task: TaskKind,
}

impl EndpointKey {
    pub(crate) fn new(endpoint: &Endpoint) -> Self {
        let mut headers: Vec<(String, String)> = endpoint
            .headers
            .as_ref()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        headers.sort();
        Self {
            method: endpoint.method,
            url: endpoint.url.clone(),
            headers,
            task: endpoint.task.kind(),
        }
    }
}

/// A coalesced caller waiting on someone else's dispatch.
pub(crate) struct Waiter {
    pub(crate) token: CancelToken,
    pub(crate) sender: oneshot::Sender<Result<Response>>,
}

/// The table of endpoints currently being dispatched.
#[derive(Default)]
pub(crate) struct InflightTable {
    entries: Mutex<HashMap<EndpointKey, Vec<Waiter>>>,
}

impl InflightTable {
    /// Join an in-flight dispatch for `key` if one exists.
    ///
    /// Returns `Ok(())` after enqueueing the waiter, or hands the sender back
    /// when there is no dispatch to join, in which case the key is now
    /// registered and the caller owns the dispatch.
    pub(crate) fn try_join(
        &self,
        key: EndpointKey,
        token: CancelToken,
        sender: oneshot::Sender<Result<Response>>,
    ) -> std::result::Result<(), oneshot::Sender<Result<Response>>> {
        let mut entries = self.entries.lock().expect("inflight table lock poisoned");
        match entries.get_mut(&key) {
            Some(waiters) => {
                waiters.push(Waiter { token, sender });
                Ok(())
            }
            None => {
                entries.insert(key, Vec::new());
                Err(sender)
            }
        }
    }

    /// Remove the entry for `key`, handing back its waiters.
    pub(crate) fn complete(&self, key: &EndpointKey) -> Vec<Waiter> {
        let mut entries = self.entries.lock().expect("inflight table lock poisoned");
        entries.remove(key).unwrap_or_default()
    }
}
