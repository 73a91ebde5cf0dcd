use crate::error::ApiError;

/// Formats a user-entered symbol for the price provider.
///
/// Trims whitespace, upper-cases, and appends `suffix` (e.g. `.NS`) to bare
/// symbols. Symbols that already carry an exchange suffix (`RELIANCE.BO`),
/// index symbols (`^NSEI`) and currency pairs (`EURUSD=X`) pass through
/// unchanged. An empty `suffix` disables the suffix entirely.
pub fn normalize_ticker(raw: &str, suffix: &str) -> Result<String, ApiError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
        return Err(ApiError::InvalidTicker(raw.to_string()));
    }

    let suffix = suffix.trim().to_uppercase();
    if suffix.is_empty() || symbol.contains(['.', '^', '=']) {
        return Ok(symbol);
    }

    if suffix.starts_with('.') {
        Ok(format!("{}{}", symbol, suffix))
    } else {
        Ok(format!("{}.{}", symbol, suffix))
    }
}

/// Splits a comma or whitespace separated list and normalises every entry.
///
/// Duplicates (after normalisation) are dropped, keeping the first occurrence.
pub fn parse_tickers(input: &str, suffix: &str) -> Result<Vec<String>, ApiError> {
    let mut tickers: Vec<String> = Vec::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let ticker = normalize_ticker(token, suffix)?;
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_symbol_gets_suffix() {
        assert_eq!(normalize_ticker("  reliance ", ".NS").unwrap(), "RELIANCE.NS");
        assert_eq!(normalize_ticker("tcs", "ns").unwrap(), "TCS.NS");
    }

    #[test]
    fn existing_suffix_passes_through() {
        assert_eq!(normalize_ticker("infy.bo", ".NS").unwrap(), "INFY.BO");
        assert_eq!(normalize_ticker("^nsei", ".NS").unwrap(), "^NSEI");
        assert_eq!(normalize_ticker("eurusd=x", ".NS").unwrap(), "EURUSD=X");
    }

    #[test]
    fn empty_suffix_disables_it() {
        assert_eq!(normalize_ticker("aapl", "").unwrap(), "AAPL");
    }

    #[test]
    fn blank_symbol_is_rejected() {
        assert!(matches!(normalize_ticker("   ", ".NS"), Err(ApiError::InvalidTicker(_))));
    }

    #[test]
    fn list_is_split_and_deduplicated() {
        let tickers = parse_tickers("tcs, infy  TCS.NS,,wipro", ".NS").unwrap();
        assert_eq!(tickers, vec!["TCS.NS", "INFY.NS", "WIPRO.NS"]);
    }
}
