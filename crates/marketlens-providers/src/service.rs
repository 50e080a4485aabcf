//! Cached market-data lookups.
//!
//! Every lookup except news goes through the read-through cache: a hit is
//! served as-is, a miss is fetched upstream, normalized, then cached.
//! Generated insights are assembled from those lookups and never cached.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use marketlens_cache::CacheManager;
use marketlens_cache::keys;
use marketlens_core::config::ProvidersConfig;
use marketlens_core::error::AppError;
use marketlens_core::result::AppResult;

use crate::alpha_vantage::AlphaVantageClient;
use crate::finnhub::FinnhubClient;
use crate::fred::{FredClient, Indicator};
use crate::gemini::GeminiClient;
use crate::http::build_http_client;
use crate::insights::{self, BIG_STOCKS, HEADLINES_FETCHED, MAJOR_INDICES};
use crate::news::{NewsApiClient, NewsQuery, NewsRequest};
use crate::types::{
    Article, Insight, MacroSeries, MarketSnapshot, NewsFeed, QuoteBatch, QuoteFailure,
    StockQuote, StockSnapshot, SymbolMatch, TimeSeries,
};

/// Longest accepted ticker, e.g. `BRK.B` or `^GSPC`.
const MAX_SYMBOL_LEN: usize = 16;

/// Aggregates all providers behind the shared cache.
#[derive(Debug, Clone)]
pub struct MarketDataService {
    cache: Arc<CacheManager>,
    finnhub: FinnhubClient,
    alpha_vantage: AlphaVantageClient,
    fred: FredClient,
    news: NewsApiClient,
    gemini: GeminiClient,
}

impl MarketDataService {
    /// Build all provider clients over one HTTP connection pool.
    pub fn new(config: &ProvidersConfig, cache: Arc<CacheManager>) -> AppResult<Self> {
        let http = build_http_client(Duration::from_secs(config.request_timeout_seconds))?;
        Ok(Self {
            cache,
            finnhub: FinnhubClient::new(http.clone(), &config.finnhub),
            alpha_vantage: AlphaVantageClient::new(http.clone(), &config.alpha_vantage),
            fred: FredClient::new(http.clone(), &config.fred),
            news: NewsApiClient::new(http.clone(), &config.news_api),
            gemini: GeminiClient::new(http, &config.gemini, &config.insight_model),
        })
    }

    /// The cache in front of the providers.
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Live quote for a symbol.
    pub async fn quote(&self, symbol: &str) -> AppResult<StockQuote> {
        let symbol = normalize_symbol(symbol)?;
        self.cache
            .get_or_fetch(&keys::stock_quote(&symbol), keys::QUOTE_TTL, || {
                self.finnhub.quote(&symbol)
            })
            .await
    }

    /// Quotes for several symbols fetched concurrently.
    ///
    /// Duplicates are collapsed; each symbol succeeds or fails on its own.
    pub async fn quotes(&self, symbols: &[String]) -> QuoteBatch {
        let mut unique: Vec<String> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let upper = symbol.trim().to_uppercase();
            if !upper.is_empty() && !unique.contains(&upper) {
                unique.push(upper);
            }
        }

        let results = join_all(unique.iter().map(|symbol| self.quote(symbol))).await;

        let mut batch = QuoteBatch::default();
        for (symbol, result) in unique.into_iter().zip(results) {
            match result {
                Ok(quote) => batch.quotes.push(quote),
                Err(e) => batch.errors.push(QuoteFailure {
                    symbol,
                    error: e.message,
                }),
            }
        }
        debug!(
            ok = batch.quotes.len(),
            failed = batch.errors.len(),
            "Quote batch settled"
        );
        batch
    }

    /// Symbol search. Empty results are returned but not cached.
    pub async fn search(&self, keywords: &str) -> AppResult<Vec<SymbolMatch>> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            return Err(AppError::validation("Missing 'keywords' query parameter."));
        }
        self.cache
            .get_or_fetch_if(
                &keys::stock_search(keywords),
                keys::SEARCH_TTL,
                || self.finnhub.search(keywords),
                |matches: &Vec<SymbolMatch>| !matches.is_empty(),
            )
            .await
    }

    /// Daily history for a symbol, oldest first.
    pub async fn time_series(&self, symbol: &str) -> AppResult<TimeSeries> {
        let symbol = normalize_symbol(symbol)?;
        self.cache
            .get_or_fetch(&keys::time_series(&symbol), keys::TIME_SERIES_TTL, || {
                self.alpha_vantage.daily_series(&symbol)
            })
            .await
    }

    /// Latest reading and history for a macro indicator.
    pub async fn macro_series(&self, indicator: Indicator) -> AppResult<MacroSeries> {
        self.cache
            .get_or_fetch(&keys::macro_series(indicator.code()), keys::MACRO_TTL, || {
                self.fred.series(indicator)
            })
            .await
    }

    /// Headlines, always fetched live.
    pub async fn news(&self, query: &NewsQuery) -> AppResult<NewsFeed> {
        let request = NewsRequest::from(query);
        debug!(endpoint = ?request.endpoint, page = request.page, "Fetching news");
        self.news.fetch(&request).await
    }

    /// Headlines, big stocks, indices and every macro indicator, gathered
    /// concurrently. Sources that fail are logged and left out.
    pub async fn market_snapshot(&self) -> MarketSnapshot {
        let headlines = NewsQuery {
            category: Some("general".to_string()),
            page: Some(1),
            page_size: Some(HEADLINES_FETCHED),
            ..NewsQuery::default()
        };
        let stocks = BIG_STOCKS.map(String::from);
        let indices = MAJOR_INDICES.map(String::from);

        let (news, stocks, indices, macros) = futures::join!(
            self.news(&headlines),
            self.quotes(&stocks),
            self.quotes(&indices),
            join_all(Indicator::ALL.map(|indicator| self.macro_series(indicator))),
        );

        let snapshot = MarketSnapshot {
            headlines: settled_headlines(news, "market"),
            stocks: settled_quotes(stocks),
            indices: settled_quotes(indices),
            macros: Indicator::ALL
                .into_iter()
                .zip(macros)
                .filter_map(|(indicator, result)| match result {
                    Ok(series) => Some(series),
                    Err(e) => {
                        warn!(
                            indicator = indicator.code(),
                            error = %e,
                            "Macro series left out of snapshot"
                        );
                        None
                    }
                })
                .collect(),
        };
        debug!(
            headlines = snapshot.headlines.len(),
            stocks = snapshot.stocks.len(),
            indices = snapshot.indices.len(),
            macros = snapshot.macros.len(),
            "Market snapshot settled"
        );
        snapshot
    }

    /// Quote, daily history and headlines for one symbol, gathered
    /// concurrently. Sources that fail are logged and left out.
    pub async fn stock_snapshot(&self, symbol: &str) -> AppResult<StockSnapshot> {
        let symbol = normalize_symbol(symbol)?;
        let headlines = NewsQuery {
            q: Some(symbol.clone()),
            page: Some(1),
            page_size: Some(HEADLINES_FETCHED),
            ..NewsQuery::default()
        };

        let (quote, history, news) = futures::join!(
            self.quote(&symbol),
            self.time_series(&symbol),
            self.news(&headlines),
        );

        let quote = quote
            .map_err(|e| warn!(symbol = %symbol, error = %e, "Quote left out of snapshot"))
            .ok();
        let history = history
            .map_err(|e| {
                warn!(symbol = %symbol, error = %e, "History left out of snapshot");
            })
            .ok();
        let headlines = settled_headlines(news, &symbol);

        Ok(StockSnapshot {
            symbol,
            quote,
            history,
            headlines,
        })
    }

    /// Generated summary of today's market.
    pub async fn market_insight(&self) -> AppResult<Insight> {
        self.gemini.ensure_configured()?;
        let snapshot = self.market_snapshot().await;
        let insight = self.gemini.generate(&insights::market_prompt(&snapshot)).await?;
        Ok(Insight { insight })
    }

    /// Generated overview of one symbol.
    pub async fn stock_insight(&self, symbol: &str) -> AppResult<Insight> {
        self.gemini.ensure_configured()?;
        let snapshot = self.stock_snapshot(symbol).await?;
        let insight = self.gemini.generate(&insights::stock_prompt(&snapshot)).await?;
        Ok(Insight { insight })
    }
}

fn settled_headlines(result: AppResult<NewsFeed>, subject: &str) -> Vec<Article> {
    match result {
        Ok(feed) => feed.articles,
        Err(e) => {
            warn!(subject, error = %e, "Headlines left out of snapshot");
            Vec::new()
        }
    }
}

fn settled_quotes(batch: QuoteBatch) -> Vec<StockQuote> {
    for failure in &batch.errors {
        warn!(symbol = %failure.symbol, error = %failure.error, "Quote left out of snapshot");
    }
    batch.quotes
}

/// Upper-case and sanity-check a ticker.
fn normalize_symbol(raw: &str) -> AppResult<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty()
        || symbol.len() > MAX_SYMBOL_LEN
        || symbol.chars().any(|c| c.is_whitespace() || c == '/')
    {
        return Err(AppError::validation(format!("Invalid stock symbol '{raw}'.")));
    }
    Ok(symbol)
}
