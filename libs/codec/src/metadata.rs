//! Metadata mini-grammar
//!
//! `key:value, key:"quoted value"` pairs. Keys are lowercase
//! identifiers; a value must be quoted when it contains any of
//! `, [ ] : " \ { } ( )`; quoted values support `\"` and `\\` escapes.
//! Malformed documents (unterminated quote, missing colon) are
//! configuration errors and raise immediately - this grammar carries
//! protocol plumbing, not user payloads, so there is no tolerant path.

use crate::config::CODEC_CONFIG;
use crate::error::MetadataError;

/// Characters that force quoting on the build side
const QUOTE_TRIGGERS: &[char] = &[',', '[', ']', ':', '"', '\\', '{', '}', '(', ')'];

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Parse a metadata document into ordered key/value pairs
pub fn parse_metadata(text: &str) -> Result<Vec<(String, String)>, MetadataError> {
    let max = CODEC_CONFIG.max_metadata_len;
    if text.len() > max {
        return Err(MetadataError::TooLong {
            len: text.len(),
            max,
        });
    }

    let bytes: Vec<char> = text.chars().collect();
    let mut pairs = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        // skip separators and whitespace between entries
        while pos < bytes.len() && (bytes[pos] == ',' || bytes[pos].is_whitespace()) {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        // key runs to the colon
        let key_start = pos;
        while pos < bytes.len() && bytes[pos] != ':' && bytes[pos] != ',' {
            pos += 1;
        }
        let key: String = bytes[key_start..pos].iter().collect();
        let key = key.trim().to_string();
        if pos >= bytes.len() || bytes[pos] != ':' {
            return Err(MetadataError::MissingColon { entry: key });
        }
        if !is_valid_key(&key) {
            return Err(MetadataError::InvalidKey { key });
        }
        pos += 1; // consume ':'

        while pos < bytes.len() && bytes[pos] == ' ' {
            pos += 1;
        }

        let value = if pos < bytes.len() && bytes[pos] == '"' {
            let quote_offset = pos;
            pos += 1;
            let mut value = String::new();
            let mut closed = false;
            while pos < bytes.len() {
                match bytes[pos] {
                    '\\' if pos + 1 < bytes.len()
                        && (bytes[pos + 1] == '"' || bytes[pos + 1] == '\\') =>
                    {
                        value.push(bytes[pos + 1]);
                        pos += 2;
                    }
                    '"' => {
                        pos += 1;
                        closed = true;
                        break;
                    }
                    c => {
                        value.push(c);
                        pos += 1;
                    }
                }
            }
            if !closed {
                return Err(MetadataError::UnterminatedQuote {
                    offset: quote_offset,
                });
            }
            value
        } else {
            let value_start = pos;
            while pos < bytes.len() && bytes[pos] != ',' {
                pos += 1;
            }
            let value: String = bytes[value_start..pos].iter().collect();
            value.trim().to_string()
        };

        pairs.push((key, value));
    }

    Ok(pairs)
}

/// Build a metadata document, quoting values where the grammar demands
pub fn build_metadata(pairs: &[(String, String)]) -> Result<String, MetadataError> {
    let mut parts = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        if !is_valid_key(key) {
            return Err(MetadataError::InvalidKey { key: key.clone() });
        }
        if value.contains(QUOTE_TRIGGERS) {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            parts.push(format!("{key}:\"{escaped}\""));
        } else {
            parts.push(format!("{key}:{value}"));
        }
    }
    Ok(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_pairs() {
        let pairs = parse_metadata("env:prod, region:eu_west").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("env".to_string(), "prod".to_string()),
                ("region".to_string(), "eu_west".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_value_with_escapes() {
        let pairs = parse_metadata(r#"label:"a, \"quoted\" \\ value", next:1"#).unwrap();
        assert_eq!(pairs[0].1, r#"a, "quoted" \ value"#);
        assert_eq!(pairs[1], ("next".to_string(), "1".to_string()));
    }

    #[test]
    fn test_unterminated_quote_is_fatal() {
        match parse_metadata(r#"label:"never ends"#) {
            Err(MetadataError::UnterminatedQuote { offset }) => assert_eq!(offset, 6),
            other => panic!("expected UnterminatedQuote, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_colon_is_fatal() {
        assert!(matches!(
            parse_metadata("env prod"),
            Err(MetadataError::MissingColon { .. })
        ));
        assert!(matches!(
            parse_metadata("a:1, orphan"),
            Err(MetadataError::MissingColon { .. })
        ));
    }

    #[test]
    fn test_uppercase_key_rejected() {
        assert!(matches!(
            parse_metadata("Env:prod"),
            Err(MetadataError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_build_quotes_when_required() {
        let doc = build_metadata(&[
            ("plain".to_string(), "value".to_string()),
            ("tricky".to_string(), "a,b:[c]".to_string()),
        ])
        .unwrap();
        assert_eq!(doc, r#"plain:value, tricky:"a,b:[c]""#);
        let back = parse_metadata(&doc).unwrap();
        assert_eq!(back[1].1, "a,b:[c]");
    }

    #[test]
    fn test_round_trip_with_backslashes() {
        let pairs = vec![("path".to_string(), r#"c:\dir\"file""#.to_string())];
        let doc = build_metadata(&pairs).unwrap();
        assert_eq!(parse_metadata(&doc).unwrap(), pairs);
    }
}
