use crate::error::{AppError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Quote {
    pub english: String,
    pub nepali: String,
    pub reference: String,
}

impl Quote {
    pub fn fallback() -> Self {
        Self {
            english: "His mercies are new every morning.".to_string(),
            nepali: "उहाँको कृपा हरेक बिहान नयाँ हुन्छ।".to_string(),
            reference: "Lamentations 3:22-23".to_string(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let quote: Quote = serde_json::from_str(text)?;
        for (name, value) in [
            ("english", &quote.english),
            ("nepali", &quote.nepali),
            ("reference", &quote.reference),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::QuoteField(name));
            }
        }
        Ok(quote)
    }
}

fn read_quote(path: &Path) -> Result<Quote> {
    let text = std::fs::read_to_string(path)?;
    Quote::from_json(&text)
}

/// Loads the quote at `path`, or the built-in one if there is none or it
/// can't be used.
pub fn load(path: Option<&Path>) -> Quote {
    let Some(path) = path else {
        return Quote::fallback();
    };
    match read_quote(path) {
        Ok(quote) => {
            log::info!("loaded quote from {}", path.display());
            quote
        }
        Err(e) => {
            log::warn!("failed to load quote from {}: {e}", path.display());
            Quote::fallback()
        }
    }
}
