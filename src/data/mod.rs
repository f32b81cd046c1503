pub mod cache;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod progress;
pub mod request;
pub mod types;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::data::cache::DataCache;
use crate::data::client::ApiClient;
use crate::data::endpoints::{Block, Endpoint, Parcel, PendingParcel, Transaction};
use crate::data::request::{fetch, FetchOutcome, Ticket};
use crate::events::{AppEvent, BlockId, SearchTarget, View};

pub struct DataService {
    client: Arc<ApiClient>,
    cache: Arc<RwLock<DataCache>>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl DataService {
    pub fn new(client: ApiClient, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            client: Arc::new(client),
            cache: Arc::new(RwLock::new(DataCache::new())),
            event_tx,
        }
    }

    /// Fetch `endpoint` in the background and send the outcome, wrapped by `deliver`,
    /// unless the ticket was revoked in the meantime.
    pub fn request<E, F>(&self, endpoint: E, ticket: Ticket, deliver: F)
    where
        E: Endpoint,
        F: FnOnce(Ticket, FetchOutcome<E::Output>) -> AppEvent + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let cache = Arc::clone(&self.cache);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            if !ticket.is_live() {
                debug!(ticket = ticket.id(), path = %endpoint.path(), "skipping revoked request");
                return;
            }

            let outcome = fetch(&client, &cache, &endpoint).await;

            if !ticket.is_live() {
                debug!(ticket = ticket.id(), path = %endpoint.path(), "requester gone, dropping response");
                return;
            }
            let _ = tx.send(deliver(ticket, outcome));
        });
    }

    /// Resolve a search query to a view and navigate there.
    pub fn search(&self, query: String) {
        let client = Arc::clone(&self.client);
        let cache = Arc::clone(&self.cache);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let target = match SearchTarget::parse(&query) {
                Some(t) => t,
                None => {
                    let _ = tx.send(AppEvent::SearchNotFound(format!(
                        "Could not parse search query: {query}"
                    )));
                    return;
                }
            };
            info!(?target, "search");

            let event = match target {
                SearchTarget::BlockNumber(number) => {
                    AppEvent::Navigate(View::BlockDetail(BlockId::Number(number)))
                }
                SearchTarget::PlatformAddress(address) => {
                    AppEvent::Navigate(View::PlatformAddress(address))
                }
                SearchTarget::AssetAddress(address) => {
                    AppEvent::Navigate(View::AssetAddress(address))
                }
                SearchTarget::Hash(hash) => resolve_hash(&client, &cache, hash).await,
            };
            let _ = tx.send(event);
        });
    }
}

/// A bare hash may name a block, a confirmed parcel, a pending parcel or a
/// transaction. Try them in that order and stop at the first hit or failure.
async fn resolve_hash(client: &ApiClient, cache: &RwLock<DataCache>, hash: String) -> AppEvent {
    let block = Block(BlockId::Hash(hash.clone()));
    match fetch(client, cache, &block).await {
        FetchOutcome::Delivered(b) => {
            return AppEvent::Navigate(View::BlockDetail(BlockId::Number(b.number)));
        }
        FetchOutcome::Failed(e) => return AppEvent::Error(format!("Search failed: {e}")),
        FetchOutcome::NotFound => {}
    }

    let parcel = Parcel { hash: hash.clone() };
    match fetch(client, cache, &parcel).await {
        FetchOutcome::Delivered(_) => return AppEvent::Navigate(View::ParcelDetail(hash)),
        FetchOutcome::Failed(e) => return AppEvent::Error(format!("Search failed: {e}")),
        FetchOutcome::NotFound => {}
    }

    let pending = PendingParcel { hash: hash.clone() };
    match fetch(client, cache, &pending).await {
        FetchOutcome::Delivered(_) => return AppEvent::Navigate(View::ParcelDetail(hash)),
        FetchOutcome::Failed(e) => return AppEvent::Error(format!("Search failed: {e}")),
        FetchOutcome::NotFound => {}
    }

    let transaction = Transaction { hash: hash.clone() };
    match fetch(client, cache, &transaction).await {
        FetchOutcome::Delivered(_) => AppEvent::Navigate(View::TransactionDetail(hash)),
        FetchOutcome::Failed(e) => AppEvent::Error(format!("Search failed: {e}")),
        FetchOutcome::NotFound => {
            AppEvent::SearchNotFound(format!("No block, parcel or transaction found for {hash}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::data::client::test_server::serve;
    use crate::data::endpoints::AssetAddressTransactions;
    use crate::data::progress::ProgressTracker;
    use crate::data::request::DataRequest;

    const HASH: &str = "9f8b3c1e2d4a5b6c7d8e9f0a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c";

    fn service(base: &str) -> (DataService, mpsc::UnboundedReceiver<AppEvent>) {
        let client = ApiClient::new(base, Duration::from_secs(5), ProgressTracker::new()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        (DataService::new(client, tx), rx)
    }

    #[tokio::test]
    async fn test_request_delivers_through_channel() {
        let txs = r#"[{"type":"assetTransfer","data":{"hash":"t1"}}]"#;
        let (base, mut seen) = serve(vec![("200 OK", txs.to_string())]).await;
        let (service, mut rx) = service(&base);

        let mut request = DataRequest::new();
        let ticket = request.mount("0xabc".to_string()).unwrap();
        let endpoint = AssetAddressTransactions {
            address: "0xabc".to_string(),
            page: 1,
            items_per_page: 3,
        };
        service.request(endpoint, ticket, AppEvent::AssetTransactions);

        match rx.recv().await.unwrap() {
            AppEvent::AssetTransactions(ticket, outcome) => {
                let outcome = request.resolve(&ticket, outcome);
                assert!(matches!(outcome, Some(FetchOutcome::Delivered(ref t)) if t.len() == 1));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(
            seen.recv().await.unwrap(),
            "/api/addr-asset-txs/0xabc?page=1&itemsPerPage=3"
        );
    }

    #[tokio::test]
    async fn test_unmounted_requester_gets_nothing() {
        let (base, _seen) = serve(vec![("200 OK", "[]".to_string())]).await;
        let (service, mut rx) = service(&base);

        let mut request = DataRequest::new();
        let ticket = request.mount(1usize).unwrap();
        let endpoint = AssetAddressTransactions {
            address: "tca".to_string(),
            page: 1,
            items_per_page: 3,
        };
        service.request(endpoint, ticket, AppEvent::AssetTransactions);
        request.unmount();

        let received = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(received.is_err());
    }

    #[tokio::test]
    async fn test_search_hash_falls_through_to_parcel() {
        let parcel = format!(
            r#"{{"hash":"{HASH}","action":{{"action":"payment","receiver":"tcc","amount":1}}}}"#
        );
        let (base, mut seen) = serve(vec![
            ("404 Not Found", String::new()),
            ("200 OK", parcel),
        ])
        .await;
        let (service, mut rx) = service(&base);

        service.search(format!("0x{HASH}"));

        match rx.recv().await.unwrap() {
            AppEvent::Navigate(View::ParcelDetail(hash)) => assert_eq!(hash, HASH),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(seen.recv().await.unwrap(), format!("/api/block/{HASH}"));
        assert_eq!(seen.recv().await.unwrap(), format!("/api/parcel/{HASH}"));
    }

    #[tokio::test]
    async fn test_search_hash_not_found_anywhere() {
        let (base, _seen) = serve(vec![
            ("404 Not Found", String::new()),
            ("200 OK", "null".to_string()),
            ("200 OK", "null".to_string()),
            ("404 Not Found", String::new()),
        ])
        .await;
        let (service, mut rx) = service(&base);

        service.search(HASH.to_string());

        assert!(matches!(
            rx.recv().await.unwrap(),
            AppEvent::SearchNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_search_addresses_and_numbers_navigate_directly() {
        let (service, mut rx) = service("http://127.0.0.1:9/api/");

        service.search("tcaqyqckq0zgdxgpck6tjdg4qmp52p2vx3qaexqnegylk".to_string());
        assert!(matches!(
            rx.recv().await.unwrap(),
            AppEvent::Navigate(View::AssetAddress(_))
        ));

        service.search("12".to_string());
        assert!(matches!(
            rx.recv().await.unwrap(),
            AppEvent::Navigate(View::BlockDetail(BlockId::Number(12)))
        ));

        service.search("what".to_string());
        assert!(matches!(
            rx.recv().await.unwrap(),
            AppEvent::SearchNotFound(_)
        ));
    }
}
