use pt_snapshot::SnapshotWriter;
use pt_types::{TradeEvent, TradeEventProcessor};
use std::sync::Arc;
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

mod store;

pub use store::PriceStore;

/// Consumes trade events in arrival order and runs each one to completion:
/// derive the prices, update the store, and on every accepted update persist
/// the full store.
pub struct PriceRecorder {
    store: PriceStore,
    writer: SnapshotWriter,
}

impl PriceRecorder {
    pub fn new(writer: SnapshotWriter) -> PriceRecorder {
        PriceRecorder {
            store: PriceStore::new(),
            writer,
        }
    }

    async fn run_async(
        mut self,
        mut events: Receiver<Arc<TradeEvent>>,
        cancellation_token: CancellationToken,
    ) {
        loop {
            select! {
                next = events.recv() => {
                    match next {
                        Ok(event) => self.handle_event(&event),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Dropped {skipped} trade events");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                _ = cancellation_token.cancelled() => break,
            }
        }
    }

    fn handle_event(&mut self, event: &TradeEvent) {
        let mint = event.mint();
        let prices = event.derive_prices();
        trace!(
            "{mint}: pool {}, market cap {}, trade {} ({event:?})",
            prices.pool,
            prices.market_cap,
            prices.trade,
        );

        // Only the pool-ratio price gates acceptance; the other two estimates
        // are informational.
        if !self.store.update(mint, prices.pool) {
            return;
        }

        debug!(
            "Updated price for {mint}: {}. Total tokens tracked: {}",
            prices.pool,
            self.store.len(),
        );

        if let Err(e) = self.writer.write(self.store.entries()) {
            error!("Failed to write price snapshot: {e}");
        }
    }
}

impl TradeEventProcessor for PriceRecorder {
    fn run(
        self,
        events: Receiver<Arc<TradeEvent>>,
        cancellation_token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run_async(events, cancellation_token))
    }
}
