//! Read-through behaviour of the market-data service against mock providers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockito::{Matcher, Server, ServerGuard};

use marketlens_cache::{BackendKind, CacheManager, MemoryCacheBackend};
use marketlens_core::config::{ProviderEndpoint, ProvidersConfig};
use marketlens_core::error::{AppError, ErrorKind};
use marketlens_core::result::AppResult;
use marketlens_core::traits::CacheBackend;
use marketlens_providers::{Indicator, MarketDataService, NewsQuery};

const KEY: &str = "test-key";

const AAPL_QUOTE: &str =
    r#"{"c":150.25,"d":2.25,"dp":1.52,"h":151.0,"l":147.5,"o":148.0,"pc":148.0,"t":1700000000}"#;
const EMPTY_QUOTE: &str = r#"{"c":0,"d":null,"dp":null,"h":0,"l":0,"o":0,"pc":0,"t":0}"#;
const IBM_DAILY: &str = r#"{"Meta Data":{"2. Symbol":"IBM"},"Time Series (Daily)":{
    "2024-03-04":{"1. open":"187.8","2. high":"193.0","3. low":"187.6","4. close":"191.5","5. volume":"6300000"},
    "2024-03-01":{"1. open":"185.5","2. high":"188.3","3. low":"185.2","4. close":"188.2","5. volume":"5200000"}}}"#;
const ONE_ARTICLE: &str = r#"{"status":"ok","totalResults":1,"articles":[{"source":{"id":null,"name":"AP"},"author":null,"title":"Talks resume","description":null,"url":"https://example.com/a","urlToImage":null,"publishedAt":"2024-05-01T00:00:00Z","content":null}]}"#;
const GEMINI_PATH: &str = "/v1beta/models/gemma-3-27b-it:generateContent";

fn providers_config(server: &ServerGuard) -> ProvidersConfig {
    let endpoint = ProviderEndpoint::new(server.url(), Some(KEY));
    ProvidersConfig {
        request_timeout_seconds: 5,
        finnhub: endpoint.clone(),
        alpha_vantage: endpoint.clone(),
        fred: endpoint.clone(),
        news_api: endpoint.clone(),
        gemini: endpoint,
        insight_model: "gemma-3-27b-it".into(),
    }
}

fn service(server: &ServerGuard) -> MarketDataService {
    MarketDataService::new(&providers_config(server), Arc::new(CacheManager::in_memory())).unwrap()
}

fn quote_query(symbol: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("symbol".into(), symbol.into()),
        Matcher::UrlEncoded("token".into(), KEY.into()),
    ])
}

/// Networked backend that is always down.
#[derive(Debug)]
struct Unreachable;

#[async_trait]
impl CacheBackend for Unreachable {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::cache("Redis error: connection timed out"))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::cache("Redis error: connection timed out"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "unreachable"
    }
}

#[tokio::test]
async fn test_quote_fetched_once_then_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/quote")
        .match_query(quote_query("AAPL"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(AAPL_QUOTE)
        .expect(1)
        .create_async()
        .await;

    let svc = service(&server);
    let first = svc.quote("aapl").await.unwrap();
    let second = svc.quote("AAPL").await.unwrap();

    assert_eq!(first.symbol, "AAPL");
    assert_eq!(first.value, 150.25);
    assert_eq!(first, second);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_symbol_is_not_found_and_not_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/quote")
        .match_query(quote_query("ZZZZ"))
        .with_status(200)
        .with_body(EMPTY_QUOTE)
        .expect(2)
        .create_async()
        .await;

    let svc = service(&server);
    for _ in 0..2 {
        let err = svc.quote("ZZZZ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Stock symbol not found or no data for ZZZZ.");
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_body_is_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/quote")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let err = service(&server).quote("QQQQ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_missing_api_key_is_configuration_error() {
    let server = Server::new_async().await;
    let mut config = providers_config(&server);
    config.finnhub.api_key = None;
    let svc = MarketDataService::new(&config, Arc::new(CacheManager::in_memory())).unwrap();

    let err = svc.quote("AAPL").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
    assert_eq!(err.message, "Finnhub API key not configured.");
}

#[tokio::test]
async fn test_upstream_status_errors() {
    let mut server = Server::new_async().await;
    let _failing = server
        .mock("GET", "/quote")
        .match_query(quote_query("FAIL"))
        .with_status(500)
        .create_async()
        .await;
    let _limited = server
        .mock("GET", "/quote")
        .match_query(quote_query("SLOW"))
        .with_status(429)
        .create_async()
        .await;

    let svc = service(&server);
    assert_eq!(
        svc.quote("FAIL").await.unwrap_err().kind,
        ErrorKind::ExternalService
    );
    assert_eq!(svc.quote("SLOW").await.unwrap_err().kind, ErrorKind::RateLimit);
}

#[tokio::test]
async fn test_quote_served_when_cache_backend_is_down() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/quote")
        .match_query(quote_query("AAPL"))
        .with_status(200)
        .with_body(AAPL_QUOTE)
        .expect(1)
        .create_async()
        .await;

    let cache = Arc::new(CacheManager::from_backends(
        Some(Arc::new(Unreachable)),
        MemoryCacheBackend::new(),
    ));
    let svc = MarketDataService::new(&providers_config(&server), Arc::clone(&cache)).unwrap();

    let quote = svc.quote("AAPL").await.unwrap();
    assert_eq!(quote.value, 150.25);
    assert_eq!(cache.active_backend(), BackendKind::Local);

    // The write after the failed read already landed in memory.
    let again = svc.quote("AAPL").await.unwrap();
    assert_eq!(again, quote);
    assert!(svc.cache().is_degraded());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_batch_quotes_settle_independently() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("GET", "/quote")
        .match_query(quote_query("AAPL"))
        .with_status(200)
        .with_body(AAPL_QUOTE)
        .expect(1)
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/quote")
        .match_query(quote_query("ZZZZ"))
        .with_status(200)
        .with_body(EMPTY_QUOTE)
        .create_async()
        .await;

    let batch = service(&server)
        .quotes(&["aapl".to_string(), "ZZZZ".to_string(), "AAPL".to_string()])
        .await;

    assert_eq!(batch.quotes.len(), 1);
    assert_eq!(batch.quotes[0].symbol, "AAPL");
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].symbol, "ZZZZ");
}

#[tokio::test]
async fn test_search_cached_case_insensitively() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Regex("q=[Aa]pple".into()))
        .with_status(200)
        .with_body(
            r#"{"count":1,"result":[{"description":"APPLE INC","displaySymbol":"AAPL","symbol":"AAPL","type":"Common Stock"}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let svc = service(&server);
    let first = svc.search("Apple").await.unwrap();
    let second = svc.search("apple").await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].name, "APPLE INC");
    assert_eq!(first[0].kind, "Common Stock");
    assert_eq!(first, second);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_search_not_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"count":0,"result":[]}"#)
        .expect(2)
        .create_async()
        .await;

    let svc = service(&server);
    assert!(svc.search("qwertyuiop").await.unwrap().is_empty());
    assert!(svc.search("qwertyuiop").await.unwrap().is_empty());
    mock.assert_async().await;

    let err = svc.search("   ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_time_series_throttle_is_not_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/query")
        .match_query(Matcher::UrlEncoded("function".into(), "TIME_SERIES_DAILY".into()))
        .with_status(200)
        .with_body(r#"{"Note":"Our standard API call frequency is 5 calls per minute."}"#)
        .expect(2)
        .create_async()
        .await;

    let svc = service(&server);
    for _ in 0..2 {
        assert_eq!(
            svc.time_series("IBM").await.unwrap_err().kind,
            ErrorKind::RateLimit
        );
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_time_series_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/query")
        .match_query(Matcher::UrlEncoded("symbol".into(), "IBM".into()))
        .with_status(200)
        .with_body(IBM_DAILY)
        .expect(1)
        .create_async()
        .await;

    let svc = service(&server);
    let series = svc.time_series("ibm").await.unwrap();
    let again = svc.time_series("IBM").await.unwrap();

    assert_eq!(series.data.first().map(|b| b.date.as_str()), Some("2024-03-01"));
    assert_eq!(series, again);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_macro_series_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/fred/series/observations")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("series_id".into(), "CPIAUCSL".into()),
            Matcher::UrlEncoded("sort_order".into(), "desc".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"observations":[{"date":"2024-04-01","value":"313.5"},{"date":"2024-03-01","value":"312.2"}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let svc = service(&server);
    let series = svc.macro_series(Indicator::Cpi).await.unwrap();
    let again = svc.macro_series(Indicator::Cpi).await.unwrap();

    assert_eq!(series.live.value, 313.5);
    assert_eq!(series.live.unit, "");
    assert_eq!(series.historical.len(), 2);
    assert_eq!(series, again);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fred_error_surfaces_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/fred/series/observations")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error_code":400,"error_message":"Bad Request.  The value for variable api_key is not registered."}"#)
        .create_async()
        .await;

    let err = service(&server)
        .macro_series(Indicator::Gdp)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert!(err.message.starts_with("FRED API error for GDPC1: 400"));
    assert!(err.message.contains("not registered"));
}

#[tokio::test]
async fn test_news_theme_routing_and_no_caching() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/everything")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "geopolitics".into()),
            Matcher::UrlEncoded("language".into(), "en".into()),
            Matcher::UrlEncoded("pageSize".into(), "5".into()),
            Matcher::UrlEncoded("sortBy".into(), "popularity".into()),
        ]))
        .with_status(200)
        .with_body(ONE_ARTICLE)
        .expect(2)
        .create_async()
        .await;

    let svc = service(&server);
    let query = NewsQuery {
        theme: Some("geopolitical".into()),
        page_size: Some(5),
        ..Default::default()
    };
    let feed = svc.news(&query).await.unwrap();
    let _ = svc.news(&query).await.unwrap();

    assert_eq!(feed.total_results, 1);
    assert_eq!(feed.articles[0].source.name, "AP");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_news_error_message_surfaced() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/top-headlines")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid or incorrect."}"#)
        .create_async()
        .await;

    let err = service(&server)
        .news(&NewsQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert!(err.message.contains("Your API key is invalid"));
}

fn gemini_reply(text: &str) -> String {
    serde_json::json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    })
    .to_string()
}

#[tokio::test]
async fn test_market_insight_gathers_data_and_is_never_cached() {
    let mut server = Server::new_async().await;
    let quotes = server
        .mock("GET", "/quote")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(AAPL_QUOTE)
        .expect(10)
        .create_async()
        .await;
    let macros = server
        .mock("GET", "/fred/series/observations")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"observations":[{"date":"2024-04-01","value":"3.9"},{"date":"2024-03-01","value":"3.8"}]}"#)
        .expect(4)
        .create_async()
        .await;
    let headlines = server
        .mock("GET", "/v2/top-headlines")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("category".into(), "general".into()),
            Matcher::UrlEncoded("pageSize".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(ONE_ARTICLE)
        .expect(2)
        .create_async()
        .await;
    let gemini = server
        .mock("POST", GEMINI_PATH)
        .match_header("x-goog-api-key", KEY)
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r"- NVDA: 150\.25 \(1\.52%\)".into()),
            Matcher::Regex(r"- IWM: 150\.25".into()),
            Matcher::Regex(r"- Talks resume \(AP\)".into()),
            Matcher::Regex(r"Unemployment: 3\.90%".into()),
        ]))
        .with_status(200)
        .with_body(gemini_reply("## What's Moving Markets Today?\nTech led gains."))
        .expect(2)
        .create_async()
        .await;

    let svc = service(&server);
    let first = svc.market_insight().await.unwrap();
    let second = svc.market_insight().await.unwrap();

    assert_eq!(first.insight, "## What's Moving Markets Today?\nTech led gains.");
    assert_eq!(first, second);
    quotes.assert_async().await;
    macros.assert_async().await;
    headlines.assert_async().await;
    gemini.assert_async().await;
}

#[tokio::test]
async fn test_market_snapshot_leaves_out_failed_sources() {
    let mut server = Server::new_async().await;
    let _apple = server
        .mock("GET", "/quote")
        .match_query(Matcher::Regex("symbol=AAPL&".into()))
        .with_status(200)
        .with_body(AAPL_QUOTE)
        .create_async()
        .await;
    let _others = server
        .mock("GET", "/quote")
        .match_query(Matcher::Regex(
            "symbol=(MSFT|GOOGL|AMZN|TSLA|NVDA|SPY|QQQ|DIA|IWM)&".into(),
        ))
        .with_status(500)
        .create_async()
        .await;
    let _macros = server
        .mock("GET", "/fred/series/observations")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let _headlines = server
        .mock("GET", "/v2/top-headlines")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"status":"error","message":"Your API key is invalid or incorrect."}"#)
        .create_async()
        .await;

    let snapshot = service(&server).market_snapshot().await;

    assert_eq!(snapshot.stocks.len(), 1);
    assert_eq!(snapshot.stocks[0].symbol, "AAPL");
    assert!(snapshot.indices.is_empty());
    assert!(snapshot.macros.is_empty());
    assert!(snapshot.headlines.is_empty());
}

#[tokio::test]
async fn test_insight_without_gemini_key_fetches_nothing() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("GET", Matcher::Any)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = providers_config(&server);
    config.gemini.api_key = None;
    let svc = MarketDataService::new(&config, Arc::new(CacheManager::in_memory())).unwrap();

    for err in [
        svc.market_insight().await.unwrap_err(),
        svc.stock_insight("AAPL").await.unwrap_err(),
    ] {
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert_eq!(err.message, "Gemini API key not configured.");
    }
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_stock_insight_prompt_covers_quote_history_and_news() {
    let mut server = Server::new_async().await;
    let _quote = server
        .mock("GET", "/quote")
        .match_query(quote_query("IBM"))
        .with_status(200)
        .with_body(AAPL_QUOTE)
        .create_async()
        .await;
    let _daily = server
        .mock("GET", "/query")
        .match_query(Matcher::UrlEncoded("symbol".into(), "IBM".into()))
        .with_status(200)
        .with_body(IBM_DAILY)
        .create_async()
        .await;
    let _news = server
        .mock("GET", "/v2/everything")
        .match_query(Matcher::UrlEncoded("q".into(), "IBM".into()))
        .with_status(200)
        .with_body(ONE_ARTICLE)
        .create_async()
        .await;
    let gemini = server
        .mock("POST", GEMINI_PATH)
        .match_header("x-goog-api-key", KEY)
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("Stock Analysis for IBM".into()),
            Matcher::Regex(r"- Price: 150\.25 USD".into()),
            Matcher::Regex(r"- Latest Close: 191\.50".into()),
            Matcher::Regex(r"Talks resume\*\* \(AP\) - Published: May 01, 2024".into()),
        ]))
        .with_status(200)
        .with_body(gemini_reply("## Stock Analysis for IBM"))
        .expect(1)
        .create_async()
        .await;

    let insight = service(&server).stock_insight("ibm").await.unwrap();
    assert_eq!(insight.insight, "## Stock Analysis for IBM");
    gemini.assert_async().await;

    let err = service(&server).stock_insight("TWO WORDS").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_gemini_errors_are_classified() {
    let mut server = Server::new_async().await;
    let _limited = server
        .mock("POST", GEMINI_PATH)
        .with_status(429)
        .with_body(r#"{"error":{"code":429,"message":"Resource has been exhausted.","status":"RESOURCE_EXHAUSTED"}}"#)
        .create_async()
        .await;

    let err = service(&server).stock_insight("IBM").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimit);
}
