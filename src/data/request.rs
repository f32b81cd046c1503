use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::data::cache::DataCache;
use crate::data::client::ApiClient;
use crate::data::endpoints::Endpoint;
use crate::data::error::ApiError;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Result of one fetch attempt.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Delivered(T),
    NotFound,
    Failed(ApiError),
}

/// Identifies one fetch attempt and whether its requester still wants the answer.
#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    live: Arc<AtomicBool>,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// False once the requester unmounted or moved on to another key.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Held by the requester for the lifetime of one attempt; dropping it revokes the ticket.
#[derive(Debug)]
struct Subscription {
    live: Arc<AtomicBool>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.live.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Requesting,
    Delivered,
    NotFound,
    Failed,
}

/// Fetch lifecycle of one entity view, keyed by the entity's identifier.
///
/// `mount` hands out at most one ticket per distinct key; `resolve` accepts the
/// outcome for the current ticket once and drops everything else.
#[derive(Debug)]
pub struct DataRequest<K> {
    key: Option<K>,
    state: RequestState,
    current: Option<u64>,
    subscription: Option<Subscription>,
}

impl<K: Clone + PartialEq> DataRequest<K> {
    pub fn new() -> Self {
        Self {
            key: None,
            state: RequestState::Idle,
            current: None,
            subscription: None,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == RequestState::Requesting
    }

    /// Start fetching `key` unless it is already held. Returns the ticket to dispatch.
    pub fn mount(&mut self, key: K) -> Option<Ticket> {
        if self.key.as_ref() == Some(&key) && self.state != RequestState::Idle {
            return None;
        }

        // Revoke whatever was in flight for the previous key.
        self.subscription = None;

        let live = Arc::new(AtomicBool::new(true));
        let id = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        self.key = Some(key);
        self.state = RequestState::Requesting;
        self.current = Some(id);
        self.subscription = Some(Subscription {
            live: Arc::clone(&live),
        });

        Some(Ticket { id, live })
    }

    /// Accept the outcome for `ticket` if it is the attempt still being waited on.
    pub fn resolve<T>(&mut self, ticket: &Ticket, outcome: FetchOutcome<T>) -> Option<FetchOutcome<T>> {
        if self.state != RequestState::Requesting
            || self.current != Some(ticket.id)
            || !ticket.is_live()
        {
            debug!(ticket = ticket.id, "dropping stale response");
            return None;
        }

        self.state = match &outcome {
            FetchOutcome::Delivered(_) => RequestState::Delivered,
            FetchOutcome::NotFound => RequestState::NotFound,
            FetchOutcome::Failed(_) => RequestState::Failed,
        };
        self.subscription = None;
        Some(outcome)
    }

    /// Stop listening. An unfinished attempt is forgotten so the next mount refetches.
    pub fn unmount(&mut self) {
        self.subscription = None;
        if self.state == RequestState::Requesting {
            self.state = RequestState::Idle;
            self.key = None;
            self.current = None;
        }
    }
}

impl<K: Clone + PartialEq> Default for DataRequest<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one attempt against `endpoint`, serving immutable resources from `cache`.
pub async fn fetch<E: Endpoint>(
    client: &ApiClient,
    cache: &RwLock<DataCache>,
    endpoint: &E,
) -> FetchOutcome<E::Output> {
    let path = endpoint.path();
    let ttl = endpoint.cache_ttl();

    let cached = match ttl {
        Some(_) => cache.write().await.get(&path),
        None => None,
    };

    let (body, from_cache) = match cached {
        Some(body) => {
            debug!(%path, "served from cache");
            (body, true)
        }
        None => match client
            .request::<serde_json::Value>(&path, endpoint.progress())
            .await
        {
            Ok(body) => (body, false),
            Err(ApiError::NotFound) => return FetchOutcome::NotFound,
            Err(e) => {
                warn!(%path, status = ?e.status(), error = %e, "request failed");
                return FetchOutcome::Failed(e);
            }
        },
    };

    // Cache only once the body decodes.
    let keep = match ttl {
        Some(ttl) if !from_cache && !body.is_null() => Some((body.clone(), ttl)),
        _ => None,
    };

    match serde_json::from_value::<E::Response>(body) {
        Ok(response) => {
            if let Some((body, ttl)) = keep {
                cache.write().await.put(path.clone(), body, ttl);
            }
            match endpoint.decode(response) {
                Some(document) => FetchOutcome::Delivered(document),
                None => FetchOutcome::NotFound,
            }
        }
        Err(e) => {
            warn!(%path, error = %e, "unexpected response shape");
            FetchOutcome::Failed(ApiError::Decode(e.to_string()))
        }
    }
}
