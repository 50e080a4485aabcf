//! Query-string DTOs.

use serde::Deserialize;

use marketlens_core::error::AppError;
use marketlens_core::result::AppResult;

/// `?symbols=AAPL,MSFT`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotesQuery {
    pub symbols: Option<String>,
}

impl QuotesQuery {
    /// Comma-separated symbols with blanks removed.
    pub fn symbol_list(&self) -> AppResult<Vec<String>> {
        let symbols: Vec<String> = self
            .symbols
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if symbols.is_empty() {
            return Err(AppError::validation("Missing 'symbols' query parameter."));
        }
        Ok(symbols)
    }
}

/// `?keywords=apple`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keywords: String,
}

/// `?indicator=CPI`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MacroQuery {
    #[serde(default)]
    pub indicator: String,
}
