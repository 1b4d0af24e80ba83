//! Transfer-phrase extraction from agent output.
//!
//! The agent self-reports inbound transfers in prose, e.g. "Successfully
//! transferred 0.5 ETH to the treasury". The parser scans each output chunk
//! for the first such phrase and yields the amount; the caller converts it to
//! budget units via the configured exchange rate. Amounts are taken at face
//! value, there is no on-chain verification.

use regex::Regex;

const TRANSFER_PATTERN: &str = r"(?i)transferred\s*([\d.]+)\s*ETH";

/// Extracts self-reported transfer amounts from chunk text.
#[derive(Debug, Clone)]
pub struct TransferParser {
    pattern: Regex,
}

impl TransferParser {
    /// Create a parser for the standard transfer phrase.
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(TRANSFER_PATTERN).expect("transfer pattern must compile"),
        }
    }

    /// Return the first transfer amount mentioned in the text, if any.
    ///
    /// Matching is case-insensitive and only the first occurrence counts.
    /// A matched numeral that does not parse as a number yields `None`; a
    /// missing match is not an error, it simply produces no credit.
    pub fn extract(&self, text: &str) -> Option<f64> {
        self.pattern
            .captures(text)?
            .get(1)
            .and_then(|amount| amount.as_str().parse::<f64>().ok())
    }
}

impl Default for TransferParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_amount() {
        let parser = TransferParser::new();
        let amount = parser.extract("I just transferred 1.5 ETH to the address.");
        assert_eq!(amount, Some(1.5));
    }

    #[test]
    fn test_no_phrase_yields_none() {
        let parser = TransferParser::new();
        assert_eq!(parser.extract("checked the balance, no action taken"), None);
        assert_eq!(parser.extract(""), None);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let parser = TransferParser::new();
        assert_eq!(parser.extract("TRANSFERRED 0.25 eth successfully"), Some(0.25));
        assert_eq!(parser.extract("Transferred 2 Eth"), Some(2.0));
    }

    #[test]
    fn test_first_match_wins() {
        let parser = TransferParser::new();
        let text = "transferred 0.1 ETH, then later transferred 0.9 ETH";
        assert_eq!(parser.extract(text), Some(0.1));
    }

    #[test]
    fn test_whitespace_is_flexible() {
        let parser = TransferParser::new();
        assert_eq!(parser.extract("transferred0.5ETH"), Some(0.5));
        assert_eq!(parser.extract("transferred   0.000002   ETH"), Some(0.000002));
    }

    #[test]
    fn test_malformed_numeral_yields_none() {
        let parser = TransferParser::new();
        // The pattern happily matches "1.2.3" but the numeral is nonsense.
        assert_eq!(parser.extract("transferred 1.2.3 ETH"), None);
    }

    #[test]
    fn test_amount_inside_larger_chunk() {
        let parser = TransferParser::new();
        let chunk = "Trade complete. Successfully transferred 0.000002 ETH back \
                     to the funding wallet as requested. Balance updated.";
        let amount = parser.extract(chunk).expect("amount");
        assert!((amount - 0.000002).abs() < 1e-15);
    }
}
