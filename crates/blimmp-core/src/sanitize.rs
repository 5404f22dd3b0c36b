//! Non-standard numeric literal cleanup for uploaded JSON.
//!
//! Pipelines that dump floats with Python's `json` module emit bare `NaN`, `Infinity` and
//! `-Infinity`, which strict JSON parsers reject. Those tokens are rewritten to `null` when they
//! appear as whole words outside string literals; string contents are never touched.

const REPLACEMENTS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns `raw` with bare non-finite literals replaced by `null`.
pub fn sanitize_non_finite_literals(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    let mut rest = raw;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if !prev.is_some_and(is_word_char) {
            let token = REPLACEMENTS.iter().find(|t| {
                rest.starts_with(**t)
                    && !rest[t.len()..].chars().next().is_some_and(is_word_char)
            });
            if let Some(token) = token {
                out.push_str("null");
                rest = &rest[token.len()..];
                prev = Some('l');
                continue;
            }
        }
        out.push(c);
        prev = Some(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_bare_literals() {
        assert_eq!(
            sanitize_non_finite_literals(r#"{"a": NaN, "b": Infinity, "c": -Infinity}"#),
            r#"{"a": null, "b": null, "c": null}"#
        );
    }

    #[test]
    fn leaves_strings_and_longer_words_alone() {
        let raw = r#"{"NaN": "Infinity \" NaN", "x": NaNa, "y": [1,NaN]}"#;
        assert_eq!(
            sanitize_non_finite_literals(raw),
            r#"{"NaN": "Infinity \" NaN", "x": NaNa, "y": [1,null]}"#
        );
    }

    #[test]
    fn sanitized_text_parses() {
        let raw = "{\"M00001\": [{\"id\": \"K1\", \"E-value\": NaN}]}";
        let value: serde_json::Value =
            serde_json::from_str(&sanitize_non_finite_literals(raw)).unwrap();
        assert!(value["M00001"][0]["E-value"].is_null());
    }
}
