// Kraken WebSocket ticker feed
//
// A reader task owns the socket: it answers pings and keeps only the most
// recent ticker, so each poll sees the current price rather than a backlog.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::clients::PriceSource;
use crate::error::{EngineError, EngineResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct KrakenTickerFeed {
    latest: watch::Receiver<Option<TickerUpdate>>,
    reader: Option<JoinHandle<EngineResult<()>>>,
    trading_pair: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerUpdate {
    pub pair: String,
    pub price: f64,
    pub bid: f64,
    pub ask: f64,
}

impl KrakenTickerFeed {
    /// Connect, subscribe to the ticker channel for `trading_pair` and start
    /// the background reader
    pub async fn connect(url: &str, trading_pair: &str) -> EngineResult<Self> {
        let (mut ws_stream, _) = connect_async(url).await?;
        info!("✅ Connected to Kraken WebSocket at {}", url);

        subscribe_to_ticker(&mut ws_stream, trading_pair).await?;

        let (sender, latest) = watch::channel(None);
        let reader = tokio::spawn(read_tickers(ws_stream, sender));

        Ok(Self {
            latest,
            reader: Some(reader),
            trading_pair: trading_pair.to_string(),
        })
    }

    pub fn trading_pair(&self) -> &str {
        &self.trading_pair
    }

    /// Most recent ticker seen so far, without waiting
    pub fn latest(&self) -> Option<TickerUpdate> {
        self.latest.borrow().clone()
    }

    /// Collect the reader's exit status once the socket is gone
    async fn finish(&mut self) -> EngineResult<Option<f64>> {
        if let Some(reader) = self.reader.take() {
            match reader.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(EngineError::Internal(format!("ticker reader failed: {}", e))),
            }
        }
        Ok(None)
    }
}

impl Drop for KrakenTickerFeed {
    fn drop(&mut self) {
        if let Some(reader) = &self.reader {
            reader.abort();
        }
    }
}

impl PriceSource for KrakenTickerFeed {
    /// Current last trade price. Waits only until the first ticker arrives;
    /// `None` once the connection has closed.
    async fn next_price(&mut self) -> EngineResult<Option<f64>> {
        loop {
            if self.latest.has_changed().is_err() {
                return self.finish().await;
            }

            let latest = self.latest.borrow_and_update().clone();
            if let Some(update) = latest {
                debug!("Ticker {} last={} bid={} ask={}", update.pair, update.price, update.bid, update.ask);
                return Ok(Some(update.price));
            }

            // Nothing received yet; an error here means the reader exited
            let _ = self.latest.changed().await;
        }
    }
}

async fn subscribe_to_ticker(ws_stream: &mut WsStream, trading_pair: &str) -> EngineResult<()> {
    let subscribe_message = json!({
        "event": "subscribe",
        "pair": [trading_pair],
        "subscription": {
            "name": "ticker"
        }
    });

    ws_stream.send(Message::Text(subscribe_message.to_string())).await?;
    info!("📡 Subscribed to {} ticker data", trading_pair);

    Ok(())
}

/// Drain the socket until it closes, publishing each ticker over the
/// previous one
async fn read_tickers(mut ws_stream: WsStream, latest: watch::Sender<Option<TickerUpdate>>) -> EngineResult<()> {
    while let Some(message) = ws_stream.next().await {
        match message? {
            Message::Text(text) => {
                let data: Value = match serde_json::from_str(&text) {
                    Ok(data) => data,
                    Err(e) => {
                        warn!("⚠️ Skipping malformed Kraken message: {}", e);
                        continue;
                    }
                };
                match parse_kraken_ticker(&data) {
                    Some(update) => {
                        latest.send_replace(Some(update));
                    }
                    None => handle_kraken_event(&data)?,
                }
            }
            Message::Ping(payload) => {
                ws_stream.send(Message::Pong(payload)).await?;
            }
            Message::Close(_) => {
                warn!("⚠️ WebSocket connection closed");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Extract a ticker update from a Kraken v1 channel message:
/// `[channel_id, {"c": [price, volume], "b": [...], "a": [...]}, "ticker", pair]`
pub fn parse_kraken_ticker(data: &Value) -> Option<TickerUpdate> {
    let channel_name = data.get(2).and_then(|v| v.as_str())?;
    if channel_name != "ticker" {
        return None;
    }

    let ticker_data = data.get(1)?;
    let field = |key: &str| {
        ticker_data
            .get(key)
            .and_then(|v| v.get(0))
            .and_then(|p| p.as_str())
            .and_then(|p| p.parse::<f64>().ok())
    };

    let price = field("c")?;
    Some(TickerUpdate {
        pair: data.get(3).and_then(|p| p.as_str()).unwrap_or("Unknown").to_string(),
        price,
        bid: field("b").unwrap_or(price),
        ask: field("a").unwrap_or(price),
    })
}

/// Log subscription and system events; subscription errors are fatal
pub fn handle_kraken_event(data: &Value) -> EngineResult<()> {
    let Some(event) = data.get("event").and_then(|e| e.as_str()) else {
        return Ok(());
    };

    match event {
        "subscriptionStatus" => {
            let status = data.get("status").and_then(|s| s.as_str()).unwrap_or("unknown");
            if status == "error" {
                let message = data.get("errorMessage").and_then(|m| m.as_str()).unwrap_or("unknown error");
                return Err(EngineError::FeedConnection(format!("subscription rejected: {}", message)));
            }
            info!("📊 Subscription status: {}", status);
        }
        "systemStatus" => {
            if let Some(status) = data.get("status").and_then(|s| s.as_str()) {
                info!("🔧 System status: {}", status);
            }
        }
        "heartbeat" => {}
        other => debug!("Unhandled Kraken event: {}", other),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticker() {
        let data = json!([
            340,
            {
                "a": ["145.2100", 1, "1.000"],
                "b": ["145.1900", 2, "2.000"],
                "c": ["145.2000", "0.5"],
                "v": ["100.0", "2500.0"]
            },
            "ticker",
            "SOL/USD"
        ]);

        let update = parse_kraken_ticker(&data).unwrap();
        assert_eq!(update.pair, "SOL/USD");
        assert!((update.price - 145.2).abs() < 1e-9);
        assert!((update.bid - 145.19).abs() < 1e-9);
        assert!((update.ask - 145.21).abs() < 1e-9);
    }

    #[test]
    fn test_non_ticker_message_ignored() {
        let data = json!([340, [["145.2", "0.1", "1700000000.1", "b", "m", ""]], "trade", "SOL/USD"]);
        assert!(parse_kraken_ticker(&data).is_none());

        let event = json!({"event": "heartbeat"});
        assert!(parse_kraken_ticker(&event).is_none());
        assert!(handle_kraken_event(&event).is_ok());
    }

    #[test]
    fn test_subscription_error_is_reported() {
        let event = json!({
            "event": "subscriptionStatus",
            "status": "error",
            "errorMessage": "Currency pair not supported"
        });
        assert!(matches!(handle_kraken_event(&event), Err(EngineError::FeedConnection(_))));
    }

    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::accept_async;

    fn ticker_frame(price: f64) -> Message {
        let frame = json!([
            340,
            {
                "a": [format!("{:.4}", price + 0.01), 1, "1.000"],
                "b": [format!("{:.4}", price - 0.01), 1, "1.000"],
                "c": [format!("{:.4}", price), "0.1"]
            },
            "ticker",
            "SOL/USD"
        ]);
        Message::Text(frame.to_string())
    }

    /// Local server: expects a ticker subscription, answers with `replies`,
    /// reports when they are written, then closes when told to
    async fn serve(replies: Vec<Message>) -> (String, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let (sent_tx, sent_rx) = oneshot::channel();
        let (close_tx, close_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();

            let subscribe = ws.next().await.unwrap().unwrap();
            assert!(subscribe.to_text().unwrap().contains("ticker"));

            for reply in replies {
                ws.send(reply).await.unwrap();
            }
            let _ = sent_tx.send(());

            let _ = close_rx.await;
            let _ = ws.close(None).await;
        });

        (url, sent_rx, close_tx)
    }

    async fn wait_for_end(feed: &mut KrakenTickerFeed) -> EngineResult<Option<f64>> {
        loop {
            match feed.next_price().await {
                Ok(Some(_)) => tokio::time::sleep(Duration::from_millis(5)).await,
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn test_next_price_is_latest_ticker() {
        let replies = (1..=50).map(|n| ticker_frame(n as f64)).collect();
        let (url, sent, close) = serve(replies).await;

        let mut feed = KrakenTickerFeed::connect(&url, "SOL/USD").await.unwrap();
        sent.await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        // Backlog is skipped; repeated polls keep reading the current price
        assert_eq!(feed.next_price().await.unwrap(), Some(50.0));
        assert_eq!(feed.next_price().await.unwrap(), Some(50.0));
        assert_eq!(feed.latest().unwrap().pair, "SOL/USD");

        close.send(()).unwrap();
        let end = tokio::time::timeout(Duration::from_secs(5), wait_for_end(&mut feed)).await.unwrap();
        assert!(matches!(end, Ok(None) | Err(EngineError::FeedClosed)));
    }

    #[tokio::test]
    async fn test_first_poll_waits_for_a_ticker() {
        let (url, _sent, _close) = serve(vec![
            Message::Text(json!({"event": "heartbeat"}).to_string()),
            Message::Ping(vec![1, 2, 3]),
            ticker_frame(142.5),
        ])
        .await;

        let mut feed = KrakenTickerFeed::connect(&url, "SOL/USD").await.unwrap();
        let price = tokio::time::timeout(Duration::from_secs(5), feed.next_price()).await.unwrap();
        assert_eq!(price.unwrap(), Some(142.5));
    }

    #[tokio::test]
    async fn test_rejected_subscription_surfaces_error() {
        let rejection = json!({
            "event": "subscriptionStatus",
            "status": "error",
            "errorMessage": "Currency pair not supported"
        });
        let (url, _sent, _close) = serve(vec![Message::Text(rejection.to_string())]).await;

        let mut feed = KrakenTickerFeed::connect(&url, "SOL/USD").await.unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), feed.next_price()).await.unwrap();
        assert!(matches!(result, Err(EngineError::FeedConnection(_))));
        assert_eq!(feed.next_price().await.unwrap(), None);
    }
}
