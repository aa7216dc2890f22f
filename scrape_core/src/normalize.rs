//! Normalization of abbreviated numeric text as it appears in scraped
//! cells: currency/percent symbols, thousands separators, and a single
//! trailing K/M/B scale suffix.
//!
//! Two suffix conventions coexist on the site and are deliberately kept
//! as two separate functions. Volume, liquidity and market cap columns
//! are denominated in millions, so "3K" means 0.003 of a million.
//! Price-change columns are raw percent points, so "3K" means 3000.

use crate::{Result, ScrapeError};

/// Null handling for a coerced field: propagate the null, or treat the
/// field as required and fail the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    Tolerate,
    Require,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    None,
    K,
    M,
    B,
}

/// Normalize a volume/liquidity/market-cap cell to millions of USD.
///
/// "1.2M" -> 1.2, "4.5B" -> 4500.0, "3K" -> 0.003, "1,234" -> 1234.0
pub fn normalize_market_scale(text: &str) -> Result<f64> {
    let (value, suffix) = parse_scaled(text)?;
    Ok(match suffix {
        Suffix::None | Suffix::M => value,
        Suffix::B => value * 1_000.0,
        Suffix::K => value / 1_000.0,
    })
}

/// Normalize a price-change cell to raw percent points.
///
/// "150%" -> 150.0, "2M%" -> 2_000_000.0, "3K%" -> 3000.0
pub fn normalize_percent_scale(text: &str) -> Result<f64> {
    let (value, suffix) = parse_scaled(text)?;
    Ok(match suffix {
        Suffix::None => value,
        Suffix::K => value * 1_000.0,
        Suffix::M => value * 1_000_000.0,
        Suffix::B => value * 1_000_000_000.0,
    })
}

// Suffix checks in order M, B, K; first match wins. Suffixes are
// case-sensitive, matching what the site renders.
fn parse_scaled(text: &str) -> Result<(f64, Suffix)> {
    let suffix = if text.contains('M') {
        Suffix::M
    } else if text.contains('B') {
        Suffix::B
    } else if text.contains('K') {
        Suffix::K
    } else {
        Suffix::None
    };

    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | ',' | 'K' | 'M' | 'B'))
        .collect();

    cleaned
        .parse::<f64>()
        .map(|value| (value, suffix))
        .map_err(|_| ScrapeError::Parse(text.to_string()))
}

/// Coerce an optional cell to an integer, stripping thousands
/// separators first. With `NullPolicy::Tolerate` a null cell stays
/// null; with `NullPolicy::Require` it fails the row.
pub fn to_int_or_null(name: &str, raw: Option<&str>, policy: NullPolicy) -> Result<Option<i64>> {
    let Some(text) = require_or_null(name, raw, policy)? else {
        return Ok(None);
    };
    text.trim()
        .replace(',', "")
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ScrapeError::Parse(text.to_string()))
}

/// Float counterpart of [`to_int_or_null`]
pub fn to_float_or_null(name: &str, raw: Option<&str>, policy: NullPolicy) -> Result<Option<f64>> {
    let Some(text) = require_or_null(name, raw, policy)? else {
        return Ok(None);
    };
    text.trim()
        .replace(',', "")
        .replace('$', "")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ScrapeError::Parse(text.to_string()))
}

fn require_or_null<'a>(name: &str, raw: Option<&'a str>, policy: NullPolicy) -> Result<Option<&'a str>> {
    match (raw, policy) {
        (Some(text), _) => Ok(Some(text)),
        (None, NullPolicy::Tolerate) => Ok(None),
        (None, NullPolicy::Require) => Err(ScrapeError::MissingField(name.to_string())),
    }
}
