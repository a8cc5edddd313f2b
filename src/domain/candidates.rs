//! Candidate symbol list parsing.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CandidateError {
    #[error("empty symbol list")]
    Empty,

    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Parse a comma-separated list, keeping configured order.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, CandidateError> {
    if input.trim().is_empty() {
        return Err(CandidateError::Empty);
    }

    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CandidateError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(CandidateError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_configured_order() {
        let result = parse_symbols("A252670,A114800,A069500").unwrap();
        assert_eq!(result, vec!["A252670", "A114800", "A069500"]);
    }

    #[test]
    fn trims_and_uppercases() {
        let result = parse_symbols("  a252670 , A114800 ").unwrap();
        assert_eq!(result, vec!["A252670", "A114800"]);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse_symbols("   "), Err(CandidateError::Empty));
    }

    #[test]
    fn rejects_empty_token() {
        assert_eq!(parse_symbols("A1,,A2"), Err(CandidateError::EmptyToken));
    }

    #[test]
    fn rejects_duplicates() {
        assert_eq!(
            parse_symbols("A1,A2,a1"),
            Err(CandidateError::DuplicateSymbol("A1".into()))
        );
    }
}
