use pt_feeds_pumpportal::PumpPortalSubscriber;
use pt_types::{TradeEvent, TradeFeedSubscriber};
use std::sync::Arc;
use tokio::sync::broadcast::{channel, Receiver, Sender};
use tokio_util::sync::CancellationToken;

/// Owns the feed session task. The session publishes trade events to a
/// broadcast channel; consumers obtain receivers from the returned manager.
pub struct Subscriber {
    feed: PumpPortalSubscriber,
}

pub struct SubscriptionManager {
    trade_events: Receiver<Arc<TradeEvent>>,
}

impl Subscriber {
    pub fn new(feed: PumpPortalSubscriber) -> Subscriber {
        Subscriber { feed }
    }

    pub fn run(self, cancellation_token: CancellationToken) -> SubscriptionManager {
        let (sender, receiver) = channel(1024);

        tokio::spawn(self.run_async(sender, cancellation_token));

        SubscriptionManager {
            trade_events: receiver,
        }
    }

    async fn run_async(
        self,
        sender: Sender<Arc<TradeEvent>>,
        cancellation_token: CancellationToken,
    ) {
        self.feed.run_async(sender, cancellation_token).await;
    }
}

impl SubscriptionManager {
    pub fn subscribe_trade_events(&self) -> Receiver<Arc<TradeEvent>> {
        self.trade_events.resubscribe()
    }
}
