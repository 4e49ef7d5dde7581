//! Binance spot market data client.
//!
//! Talks to the public, key-less market data API. Every call goes through the
//! [`FetchClient`] so throttling and 5xx responses are retried with backoff.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::fetch::{FetchClient, FetchRequest, RetryPolicy};
use crate::models::{ExchangeInfo, Instrument, Kline};
use crate::provider::ExchangeClient;

const PROVIDER_ID: &str = "BINANCE";

/// Public market data mirror that does not require an API key.
pub const DEFAULT_BASE_URL: &str = "https://data-api.binance.vision";

const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";
const KLINES_PATH: &str = "/api/v3/klines";
const DAILY_INTERVAL: &str = "1d";

/// Binance exchange client.
#[derive(Clone)]
pub struct BinanceClient {
    base_url: String,
    fetcher: FetchClient,
    policy: RetryPolicy,
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>, fetcher: FetchClient, policy: RetryPolicy) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            fetcher,
            policy,
        }
    }

    fn exchange_info_url(&self) -> String {
        format!("{}{}", self.base_url, EXCHANGE_INFO_PATH)
    }

    fn klines_url(&self, symbol: &str, start_ms: i64, end_ms: i64, limit: u32) -> String {
        format!(
            "{}{}?symbol={}&interval={}&startTime={}&endTime={}&limit={}",
            self.base_url,
            KLINES_PATH,
            urlencoding::encode(symbol),
            DAILY_INTERVAL,
            start_ms,
            end_ms,
            limit
        )
    }
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn list_instruments(&self) -> Result<Vec<Instrument>, MarketDataError> {
        let request = FetchRequest::get(self.exchange_info_url());
        let info: ExchangeInfo = self.fetcher.fetch_as(&request, &self.policy).await?;
        debug!("{} lists {} instruments", PROVIDER_ID, info.symbols.len());
        Ok(info.symbols)
    }

    async fn daily_klines(
        &self,
        symbol: &str,
        start_ms: i64,
        end_ms: i64,
        limit: u32,
    ) -> Result<Vec<Kline>, MarketDataError> {
        let request = FetchRequest::get(self.klines_url(symbol, start_ms, end_ms, limit));
        let body = self.fetcher.fetch(&request, &self.policy).await?;
        let klines = Kline::from_response(&body)?;
        debug!(
            "{} returned {} klines for {} in [{}, {}]",
            PROVIDER_ID,
            klines.len(),
            symbol,
            start_ms,
            end_ms
        );
        Ok(klines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{HttpResponse, HttpTransport, RecordingSleeper};
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    struct FixedTransport {
        body: String,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpTransport for FixedTransport {
        async fn send(&self, request: &FetchRequest) -> Result<HttpResponse, MarketDataError> {
            self.urls.lock().unwrap().push(request.url.clone());
            Ok(HttpResponse {
                status: 200,
                content_type: Some("application/json;charset=UTF-8".to_string()),
                retry_after: None,
                body: self.body.clone(),
            })
        }
    }

    fn client_returning(body: &str) -> (BinanceClient, Arc<FixedTransport>) {
        let transport = Arc::new(FixedTransport {
            body: body.to_string(),
            urls: Mutex::new(vec![]),
        });
        let fetcher = FetchClient::new(transport.clone(), Arc::new(RecordingSleeper::new()));
        let client = BinanceClient::new("https://exchange.test/", fetcher, RetryPolicy::default());
        (client, transport)
    }

    #[tokio::test]
    async fn test_list_instruments() {
        let (client, transport) = client_returning(
            r#"{"symbols":[
                {"symbol":"BTCUSDT","status":"TRADING","baseAsset":"BTC","quoteAsset":"USDT"},
                {"symbol":"ETHBTC","status":"TRADING","baseAsset":"ETH","quoteAsset":"BTC"}
            ]}"#,
        );

        let instruments = client.list_instruments().await.unwrap();

        assert_eq!(instruments.len(), 2);
        assert_eq!(instruments[0].symbol, "BTCUSDT");
        assert_eq!(
            transport.urls.lock().unwrap()[0],
            "https://exchange.test/api/v3/exchangeInfo"
        );
    }

    #[tokio::test]
    async fn test_daily_klines_builds_query_and_decodes_rows() {
        let (client, transport) = client_returning(
            r#"[[1704067200000,"42283.58","44184.10","42180.77","44179.55","27174.29",1704153599999,"0",0,"0","0","0"]]"#,
        );

        let klines = client
            .daily_klines("BTCUSDT", 1_704_067_200_000, 1_704_153_599_999, 10)
            .await
            .unwrap();

        assert_eq!(klines.len(), 1);
        assert_eq!(klines[0].close, dec!(44179.55));
        assert_eq!(
            transport.urls.lock().unwrap()[0],
            "https://exchange.test/api/v3/klines?symbol=BTCUSDT&interval=1d\
             &startTime=1704067200000&endTime=1704153599999&limit=10"
        );
    }

    #[test]
    fn test_id() {
        let (client, _) = client_returning("{}");
        assert_eq!(client.id(), "BINANCE");
    }
}
