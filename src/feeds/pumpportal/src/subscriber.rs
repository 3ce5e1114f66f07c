use crate::serialize_to_json;
use async_trait::async_trait;
use ezsockets::client::ClientCloseMode;
use ezsockets::{ClientConfig, ClientExt, Error, MessageSignal, WSError};
use pt_types::{TradeEvent, TradeFeedSubscriber};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::select;
use tokio::sync::broadcast::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

pub struct PumpPortalSubscriber {
    url: String,
    keys: Vec<String>,
}

impl PumpPortalSubscriber {
    /// The API key is embedded in the connection URL; PumpPortal performs no
    /// further authentication handshake.
    pub fn new(base_url: &str, api_key: &str, keys: Vec<String>) -> PumpPortalSubscriber {
        PumpPortalSubscriber {
            url: format!("{base_url}?api-key={api_key}"),
            keys,
        }
    }
}

struct WebSocketClient {
    handle: ezsockets::Client<Self>,
    keys: Vec<String>,
    sender: Sender<Arc<TradeEvent>>,
}

impl WebSocketClient {
    fn send<S: Serialize>(&mut self, value: &S) -> Result<MessageSignal, Error> {
        let json = serialize_to_json(value);
        trace!("PumpPortal: Sending message: {json}");
        self.handle.text(json).map_err(|e| e.into())
    }

    fn subscribe(&mut self) -> Result<MessageSignal, Error> {
        let keys = self.keys.clone();
        self.send(&Request::SubscribeTokenTrade { keys })
    }
}

#[async_trait]
impl ClientExt for WebSocketClient {
    type Call = ();

    async fn on_text(&mut self, text: String) -> Result<(), Error> {
        trace!("PumpPortal: Received text: {text}");

        if let Some(event) = parse_trade_event(&text) {
            let _ = self.sender.send(Arc::new(event));
        }
        Ok(())
    }

    async fn on_binary(&mut self, _: Vec<u8>) -> Result<(), Error> {
        unreachable!()
    }

    async fn on_call(&mut self, _: Self::Call) -> Result<(), Error> {
        unreachable!()
    }

    async fn on_connect(&mut self) -> Result<(), Error> {
        info!("PumpPortal: Connected");
        self.subscribe()?;
        Ok(())
    }

    async fn on_disconnect(&mut self) -> Result<ClientCloseMode, Error> {
        warn!("PumpPortal: Disconnected");
        Ok(ClientCloseMode::Reconnect)
    }

    async fn on_connect_fail(&mut self, error: WSError) -> Result<ClientCloseMode, Error> {
        error!("PumpPortal: Failed to connect: {error:?}");
        Ok(ClientCloseMode::Reconnect)
    }
}

fn parse_trade_event(text: &str) -> Option<TradeEvent> {
    match serde_json::from_str(text) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("PumpPortal: Skipping unparseable message: {e}");
            None
        }
    }
}

#[async_trait]
impl TradeFeedSubscriber for PumpPortalSubscriber {
    async fn run_async(
        self,
        sender: Sender<Arc<TradeEvent>>,
        cancellation_token: CancellationToken,
    ) {
        let PumpPortalSubscriber { url, keys } = self;

        let (handle, future) = ezsockets::connect(
            |handle| WebSocketClient {
                handle,
                keys,
                sender,
            },
            ClientConfig::new(url.as_str()),
        )
        .await;

        select! {
            _ = future => (),
            _ = cancellation_token.cancelled() => {
                handle.close(None).unwrap();
            }
        }

        info!("PumpPortal disconnected");
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
enum Request {
    SubscribeTokenTrade { keys: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscription_request_shape() {
        let request = Request::SubscribeTokenTrade {
            keys: vec!["71Jvq4Epe2FCJ7JFSF7jLXdNk1Wy4Bhqd9iL6bEFELvg".to_string()],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "subscribeTokenTrade",
                "keys": ["71Jvq4Epe2FCJ7JFSF7jLXdNk1Wy4Bhqd9iL6bEFELvg"],
            })
        );
    }

    #[test]
    fn malformed_message_is_skipped_and_the_next_one_still_parses() {
        assert!(parse_trade_event("not json {").is_none());

        let event = parse_trade_event(r#"{"mint":"abc","solInPool":1.0}"#).unwrap();
        assert_eq!(event.mint(), "abc");
        assert_eq!(event.sol_in_pool, 1.0);
    }
}
