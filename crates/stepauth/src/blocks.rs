//! Parsers for `;`-delimited header and cookie blocks.
//!
//! `X-Token: abc; X-Other: 1` and `sid=abc; lang=en`. Each segment splits
//! on its first delimiter only, both sides trimmed. Blank segments (such as
//! a trailing `;`) are skipped.

use crate::error::{AuthError, Result};

/// Parse a header block into ordered `(name, value)` pairs.
pub fn parse_header_block(block: &str) -> Result<Vec<(String, String)>> {
    parse_block(block, ':', "header")
}

/// Parse a cookie block into ordered `(name, value)` pairs.
pub fn parse_cookie_block(block: &str) -> Result<Vec<(String, String)>> {
    parse_block(block, '=', "cookie")
}

fn parse_block(block: &str, delimiter: char, kind: &'static str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    for segment in block.split(';') {
        if segment.trim().is_empty() {
            continue;
        }

        let (name, value) = segment
            .split_once(delimiter)
            .ok_or_else(|| malformed(kind, segment, delimiter))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(malformed(kind, segment, delimiter));
        }

        pairs.push((name.to_string(), value.trim().to_string()));
    }

    Ok(pairs)
}

fn malformed(block: &'static str, segment: &str, delimiter: char) -> AuthError {
    AuthError::MalformedSegment {
        block,
        segment: segment.trim().to_string(),
        delimiter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_block() {
        let headers = parse_header_block("X-Requested-With: XMLHttpRequest;  X-Token :abc ").unwrap();
        assert_eq!(
            headers,
            vec![
                ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
                ("X-Token".to_string(), "abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_header_value_keeps_later_colons() {
        let headers = parse_header_block("Referer: https://example.com:8443/login").unwrap();
        assert_eq!(headers[0].0, "Referer");
        assert_eq!(headers[0].1, "https://example.com:8443/login");
    }

    #[test]
    fn test_cookie_value_keeps_later_equals() {
        let cookies = parse_cookie_block("token=YWJj==; lang = en").unwrap();
        assert_eq!(cookies[0], ("token".to_string(), "YWJj==".to_string()));
        assert_eq!(cookies[1], ("lang".to_string(), "en".to_string()));
    }

    #[test]
    fn test_trailing_separator_skipped() {
        let cookies = parse_cookie_block("a=1;;  ;").unwrap();
        assert_eq!(cookies.len(), 1);
        assert!(parse_header_block("").unwrap().is_empty());
    }

    #[test]
    fn test_segment_without_delimiter_is_error() {
        let err = parse_header_block("X-A: 1; broken").unwrap_err();
        match err {
            AuthError::MalformedSegment { block, segment, delimiter } => {
                assert_eq!(block, "header");
                assert_eq!(segment, "broken");
                assert_eq!(delimiter, ':');
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_name_is_error() {
        assert!(parse_cookie_block("=value").is_err());
    }
}
