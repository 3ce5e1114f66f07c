use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::{Receiver, Sender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Sentinel recorded when the feed omits the token identifier.
pub const UNKNOWN_MINT: &str = "N/A";

/// Fixed decimal scale turning a SOL-denominated market cap into a per-token
/// price estimate.
const MARKET_CAP_SCALE: f64 = 1_000_000_000.0;

#[async_trait]
pub trait TradeFeedSubscriber {
    async fn run_async(
        self,
        sender: Sender<Arc<TradeEvent>>,
        cancellation_token: CancellationToken,
    );
}

pub trait TradeEventProcessor {
    fn run(
        self,
        events: Receiver<Arc<TradeEvent>>,
        cancellation_token: CancellationToken,
    ) -> JoinHandle<()>;
}

/// One trade reported by the feed. Every field may be independently absent;
/// numeric fields that are missing or not numeric deserialize to zero rather
/// than failing the message.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(default, deserialize_with = "numeric_or_zero")]
    pub sol_in_pool: f64,
    #[serde(default, deserialize_with = "numeric_or_zero")]
    pub tokens_in_pool: f64,
    #[serde(default, deserialize_with = "numeric_or_zero")]
    pub market_cap_sol: f64,
    #[serde(default, deserialize_with = "numeric_or_zero")]
    pub sol_amount: f64,
    #[serde(default, deserialize_with = "numeric_or_zero")]
    pub token_amount: f64,
}

impl TradeEvent {
    pub fn mint(&self) -> &str {
        self.mint.as_deref().unwrap_or(UNKNOWN_MINT)
    }

    /// Derives the three price estimates. A zero denominator yields a zero
    /// price for that formula, so the result is always fully populated.
    pub fn derive_prices(&self) -> DerivedPrices {
        DerivedPrices {
            pool: ratio(self.sol_in_pool, self.tokens_in_pool),
            market_cap: self.market_cap_sol / MARKET_CAP_SCALE,
            trade: ratio(self.sol_amount, self.token_amount),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedPrices {
    /// solInPool / tokensInPool
    pub pool: f64,
    /// marketCapSol / 10^9
    pub market_cap: f64,
    /// solAmount / tokenAmount
    pub trade: f64,
}

/// Latest accepted price for a single mint, in the shape the snapshot file
/// serializes. The price is a decimal string for downstream readers, never a
/// JSON number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: String,
}

impl PriceEntry {
    pub fn buy_price(mint: &str, price: f64) -> PriceEntry {
        PriceEntry {
            id: mint.to_string(),
            kind: "buyPrice".to_string(),
            price: price.to_string(),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn numeric_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(10.0, 1_000_000.0, 0.00001)]
    #[test_case(10.0, 0.0, 0.0)]
    #[test_case(0.0, 0.0, 0.0)]
    fn pool_price(sol_in_pool: f64, tokens_in_pool: f64, expected: f64) {
        let event = TradeEvent {
            sol_in_pool,
            tokens_in_pool,
            ..TradeEvent::default()
        };
        assert_eq!(event.derive_prices().pool, expected);
    }

    #[test_case(3.0, 2.0, 1.5)]
    #[test_case(5.0, 0.0, 0.0)]
    fn trade_price(sol_amount: f64, token_amount: f64, expected: f64) {
        let event = TradeEvent {
            sol_amount,
            token_amount,
            ..TradeEvent::default()
        };
        assert_eq!(event.derive_prices().trade, expected);
    }

    #[test_case(2_500_000_000.0, 2.5)]
    #[test_case(-1_000_000_000.0, -1.0)]
    #[test_case(0.5, 0.0000000005)]
    #[test_case(0.0, 0.0)]
    fn market_cap_price(market_cap_sol: f64, expected: f64) {
        let event = TradeEvent {
            market_cap_sol,
            ..TradeEvent::default()
        };
        assert_eq!(event.derive_prices().market_cap, expected);
    }

    #[test]
    fn numeric_fields_default_to_zero_when_absent_or_non_numeric() {
        let event: TradeEvent = serde_json::from_str(
            r#"{"mint":"abc","solInPool":"garbage","tokensInPool":null,"marketCapSol":1.5}"#,
        )
        .unwrap();

        assert_eq!(event.mint(), "abc");
        assert_eq!(event.sol_in_pool, 0.0);
        assert_eq!(event.tokens_in_pool, 0.0);
        assert_eq!(event.market_cap_sol, 1.5);
        assert_eq!(event.sol_amount, 0.0);
        assert_eq!(event.token_amount, 0.0);
    }

    #[test]
    fn missing_mint_maps_to_sentinel() {
        let event: TradeEvent = serde_json::from_str("{}").unwrap();
        assert_eq!(event.mint(), UNKNOWN_MINT);
    }

    #[test]
    fn price_entry_serializes_price_as_string() {
        let json = serde_json::to_value(PriceEntry::buy_price("abc", 0.00001)).unwrap();

        assert_eq!(json["id"], "abc");
        assert_eq!(json["type"], "buyPrice");
        assert_eq!(json["price"], "0.00001");
    }
}
