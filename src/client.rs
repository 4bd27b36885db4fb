//! Observable rates client: fire-and-forget requests, latest-value channels.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::core::rate::{HistoricalSeries, RateProvider, RateQuote, RateTable};

/// A single-latest-value topic. Subscribers see only the most recent
/// published value, never a queue.
struct Topic<T> {
    tx: watch::Sender<Option<T>>,
    seq: Arc<AtomicU64>,
}

impl<T: Clone + Send + Sync + 'static> Topic<T> {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Topic {
            tx,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registers a new in-flight request and returns its id. Any
    /// previously issued id on this topic is now stale.
    fn begin(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.tx.subscribe()
    }
}

/// Client for the remote exchange-rate API.
///
/// Each `request_*` call issues exactly one network call on a spawned
/// task and publishes the result to that operation's topic. Responses
/// for superseded requests are dropped, so an in-flight reply for an
/// old currency pair cannot overwrite newer state. Failed requests are
/// logged and leave the previously published value untouched.
pub struct RatesClient<P: RateProvider + 'static> {
    provider: Arc<P>,
    latest: Topic<RateTable>,
    quotes: Topic<RateQuote>,
    history: Topic<HistoricalSeries>,
}

impl<P: RateProvider + 'static> RatesClient<P> {
    pub fn new(provider: P) -> Self {
        RatesClient {
            provider: Arc::new(provider),
            latest: Topic::new(),
            quotes: Topic::new(),
            history: Topic::new(),
        }
    }

    pub fn subscribe_latest_rates(&self) -> watch::Receiver<Option<RateTable>> {
        self.latest.subscribe()
    }

    pub fn subscribe_quotes(&self) -> watch::Receiver<Option<RateQuote>> {
        self.quotes.subscribe()
    }

    pub fn subscribe_history(&self) -> watch::Receiver<Option<HistoricalSeries>> {
        self.history.subscribe()
    }

    pub fn request_latest_rates(&self, base: &str) {
        let id = self.latest.begin();
        let provider = Arc::clone(&self.provider);
        let tx = self.latest.tx.clone();
        let seq = Arc::clone(&self.latest.seq);
        let base = base.to_string();

        tokio::spawn(async move {
            match provider.latest_rates(&base).await {
                Ok(rates) => {
                    if seq.load(Ordering::SeqCst) == id {
                        tx.send_replace(Some(rates));
                    } else {
                        debug!("Discarding stale latest-rates response for {base}");
                    }
                }
                Err(e) => warn!("Latest rates request failed for {base}: {e}"),
            }
        });
    }

    pub fn request_exchange_rate(&self, base: &str, target: &str) {
        let id = self.quotes.begin();
        let provider = Arc::clone(&self.provider);
        let tx = self.quotes.tx.clone();
        let seq = Arc::clone(&self.quotes.seq);
        let base = base.to_string();
        let target = target.to_string();

        tokio::spawn(async move {
            match provider.exchange_rate(&base, &target).await {
                Ok(quote) => {
                    if seq.load(Ordering::SeqCst) == id {
                        tx.send_replace(Some(quote));
                    } else {
                        debug!("Discarding stale exchange-rate response for {base}/{target}");
                    }
                }
                Err(e) => warn!("Exchange rate request failed for {base}/{target}: {e}"),
            }
        });
    }

    pub fn request_historical_rates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: &str,
        target: &str,
    ) {
        let id = self.history.begin();
        let provider = Arc::clone(&self.provider);
        let tx = self.history.tx.clone();
        let seq = Arc::clone(&self.history.seq);
        let base = base.to_string();
        let target = target.to_string();

        tokio::spawn(async move {
            match provider.historical_rates(start, end, &base, &target).await {
                Ok(series) => {
                    if seq.load(Ordering::SeqCst) == id {
                        tx.send_replace(Some(series));
                    } else {
                        debug!("Discarding stale historical response for {base}/{target}");
                    }
                }
                Err(e) => warn!("Historical rates request failed for {base}/{target}: {e}"),
            }
        });
    }
}
