//! Prompt assembly for generated market summaries.
//!
//! Sections whose data could not be fetched are left out of the prompt.

use chrono::DateTime;

use crate::types::{Article, MacroSeries, MarketSnapshot, StockQuote, StockSnapshot, TimeSeries};

/// Bellwether stocks quoted for the market summary.
pub const BIG_STOCKS: [&str; 6] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA"];

/// Index ETFs quoted for the market summary.
pub const MAJOR_INDICES: [&str; 4] = ["SPY", "QQQ", "DIA", "IWM"];

/// Headlines fetched per summary.
pub const HEADLINES_FETCHED: u32 = 5;

/// Headlines quoted in a prompt.
const HEADLINES_QUOTED: usize = 3;

/// Trading days back for the one- and six-month trend.
const MONTH_TRADING_DAYS: usize = 20;
const SIX_MONTH_TRADING_DAYS: usize = 120;

const MARKET_INSTRUCTIONS: &str = "\
Write a \"What's Moving Markets Today?\" summary of the data above in Markdown, \
starting with the heading. Use the sections Overall Market Summary, Key Drivers, \
Notable News and Economic Outlook. Keep the whole summary within 6 sentences, \
focus on how the data points relate, and avoid speculation.";

/// Prompt for the market-wide summary.
pub fn market_prompt(snapshot: &MarketSnapshot) -> String {
    let mut prompt = String::from("Market data for today's summary:\n\n");

    if !snapshot.headlines.is_empty() {
        prompt.push_str("--- Latest News ---\n");
        push_headlines(&mut prompt, &snapshot.headlines, false);
        prompt.push('\n');
    }
    if !snapshot.stocks.is_empty() {
        prompt.push_str("--- Key Stocks ---\n");
        push_quotes(&mut prompt, &snapshot.stocks);
        prompt.push('\n');
    }
    if !snapshot.indices.is_empty() {
        prompt.push_str("--- Major Indices ---\n");
        push_quotes(&mut prompt, &snapshot.indices);
        prompt.push('\n');
    }
    if !snapshot.macros.is_empty() {
        prompt.push_str("--- Macro Economic Indicators ---\n");
        for series in &snapshot.macros {
            prompt.push_str(&macro_line(series));
        }
        prompt.push('\n');
    }

    prompt.push_str(MARKET_INSTRUCTIONS);
    prompt
}

/// Prompt for a single-stock summary.
pub fn stock_prompt(snapshot: &StockSnapshot) -> String {
    let symbol = &snapshot.symbol;
    let mut prompt = format!(
        "Write a concise, analytical overview of {symbol} in Markdown, starting with \
         the heading \"## Stock Analysis for {symbol}\". Use at most 4 sentences. \
         This is for information only: never give investment advice, buy or sell \
         recommendations, or price predictions.\n\n"
    );

    if let Some(quote) = &snapshot.quote {
        prompt.push_str("### Current Performance\n");
        prompt.push_str(&format!("- Price: {:.2} {}\n", quote.value, quote.currency));
        prompt.push_str(&format!(
            "- Change: {:.2} ({:.2}%)\n",
            quote.change, quote.change_percent
        ));
        prompt.push_str(&format!(
            "- Open: {:.2}, High: {:.2}, Low: {:.2}\n",
            quote.open, quote.high, quote.low
        ));
        prompt.push_str(&format!(
            "- Last Updated: {}\n\n",
            quote.timestamp.format("%b %d, %Y %H:%M")
        ));
    }

    if let Some(history) = &snapshot.history {
        push_trend(&mut prompt, history);
    }

    if !snapshot.headlines.is_empty() {
        prompt.push_str("### Recent News\n");
        push_headlines(&mut prompt, &snapshot.headlines, true);
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "Summarize {symbol}'s current status, recent performance and likely influences \
         in neutral, factual language."
    ));
    prompt
}

fn push_headlines(prompt: &mut String, articles: &[Article], dated: bool) {
    for article in articles.iter().take(HEADLINES_QUOTED) {
        let title = article.title.as_deref().unwrap_or("(untitled)");
        if dated {
            prompt.push_str(&format!(
                "- **{title}** ({}) - Published: {}\n",
                article.source.name,
                published_date(&article.published_at)
            ));
        } else {
            prompt.push_str(&format!("- {title} ({})\n", article.source.name));
        }
    }
}

fn push_quotes(prompt: &mut String, quotes: &[StockQuote]) {
    for quote in quotes {
        prompt.push_str(&format!(
            "- {}: {:.2} ({:.2}%)\n",
            quote.symbol, quote.value, quote.change_percent
        ));
    }
}

/// `- CPI: 313.50 (Change: 1.30 / 0.42%)`, change against the prior reading.
fn macro_line(series: &MacroSeries) -> String {
    let change = match series.historical.as_slice() {
        [latest, previous, ..] if previous.value != 0.0 => {
            let delta = latest.value - previous.value;
            format!(
                " (Change: {delta:.2} / {:.2}%)",
                delta / previous.value * 100.0
            )
        }
        _ => String::new(),
    };
    format!(
        "- {}: {:.2}{}{change}\n",
        series.name, series.live.value, series.live.unit
    )
}

/// Latest close plus one- and six-month change. Short histories fall back to
/// the oldest bar available.
fn push_trend(prompt: &mut String, history: &TimeSeries) {
    let Some(latest) = history.data.last() else {
        return;
    };
    let back = |days: usize| {
        let last = history.data.len() - 1;
        &history.data[last - days.min(last)]
    };

    prompt.push_str("### Historical Trends\n");
    prompt.push_str(&format!("- Latest Close: {:.2}\n", latest.close));
    for (label, days) in [
        ("1 Month", MONTH_TRADING_DAYS),
        ("6 Month", SIX_MONTH_TRADING_DAYS),
    ] {
        let reference = back(days).close;
        if reference != 0.0 {
            let change = (latest.close - reference) / reference * 100.0;
            prompt.push_str(&format!("- {label} Change: {change:.2}%\n"));
        }
    }
    prompt.push('\n');
}

fn published_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%b %d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
