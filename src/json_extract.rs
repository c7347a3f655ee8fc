//! Recovers a JSON object from model text that may be wrapped in prose or
//! markdown fences.
//!
//! Grounded generation cannot be combined with schema-constrained output, so
//! the planning response is free text. This scan is best effort: it returns the
//! first balanced `{...}` span that parses as a JSON object.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JsonExtractError {
    #[error("response was empty")]
    Empty,
    #[error("no JSON object found in response")]
    NoObject,
    #[error("no balanced JSON object parsed cleanly: {0}")]
    Malformed(String),
}

/// Returns the slice of `text` holding the first balanced, parseable JSON object.
///
/// One pass over `text`. A top-level span that balances but fails to parse is
/// skipped whole, so its nested objects are never returned. Spans nested inside
/// an opening brace that never closes are tried once the scan reaches the end.
pub fn extract_json_object(text: &str) -> Result<&str, JsonExtractError> {
    if text.trim().is_empty() {
        return Err(JsonExtractError::Empty);
    }

    let mut last_parse_error: Option<String> = None;
    // Open braces, each with the closed spans directly inside it.
    let mut open: Vec<(usize, Vec<(usize, usize)>)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push((i, Vec::new())),
            '}' => {
                let Some((start, _)) = open.pop() else {
                    continue;
                };
                let span = (start, i + 1);
                match open.last_mut() {
                    Some((_, children)) => children.push(span),
                    None => match parse_object(&text[span.0..span.1]) {
                        Ok(candidate) => return Ok(candidate),
                        Err(e) => last_parse_error = Some(e),
                    },
                }
            }
            _ => {}
        }
    }

    if open.is_empty() {
        return match last_parse_error {
            Some(e) => Err(JsonExtractError::Malformed(e)),
            None => Err(JsonExtractError::NoObject),
        };
    }

    // Truncated reply: every opening brace left on the stack is unterminated.
    for (start, end) in open.iter().flat_map(|(_, children)| children.iter().copied()) {
        match parse_object(&text[start..end]) {
            Ok(candidate) => return Ok(candidate),
            Err(e) => last_parse_error = Some(e),
        }
    }
    Err(JsonExtractError::Malformed(
        last_parse_error.unwrap_or_else(|| "unterminated object".to_string()),
    ))
}

fn parse_object(candidate: &str) -> Result<&str, String> {
    match serde_json::from_str::<serde_json::Value>(candidate) {
        Ok(value) if value.is_object() => Ok(candidate),
        Ok(_) => Err("not a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        assert_eq!(extract_json_object(r#"{"a":1}"#), Ok(r#"{"a":1}"#));
    }

    #[test]
    fn test_object_inside_prose_and_fence() {
        let text = "Here is your blueprint:\n```json\n{\"days\": [{\"dayNumber\": 1}], \"isFallback\": true}\n```\nEnjoy! {not json}";
        assert_eq!(
            extract_json_object(text),
            Ok("{\"days\": [{\"dayNumber\": 1}], \"isFallback\": true}")
        );
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let text = r#"prefix {"tip": "use {curly} braces \" carefully }", "n": 2} suffix }"#;
        assert_eq!(
            extract_json_object(text),
            Ok(r#"{"tip": "use {curly} braces \" carefully }", "n": 2}"#)
        );
    }

    #[test]
    fn test_skips_unparseable_braces_before_object() {
        let text = "Costs {approx} below. {\"total\": \"₹400\"}";
        assert_eq!(extract_json_object(text), Ok("{\"total\": \"₹400\"}"));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(
            extract_json_object("I could not build a plan today."),
            Err(JsonExtractError::NoObject)
        );
        assert_eq!(extract_json_object("   \n"), Err(JsonExtractError::Empty));
    }

    #[test]
    fn test_unbalanced_object_fails() {
        let result = extract_json_object("{\"days\": [1, 2, 3]");
        assert!(matches!(result, Err(JsonExtractError::Malformed(_))));
    }

    #[test]
    fn test_multibyte_text_around_object() {
        let text = "योजना → {\"cost\": \"₹150\"} ✓";
        assert_eq!(extract_json_object(text), Ok("{\"cost\": \"₹150\"}"));
    }

    #[test]
    fn test_unterminated_object_keeps_inner_candidate() {
        let text = "Draft { \"notes\": \"cut off\", {\"total\": \"₹90\"}";
        assert_eq!(extract_json_object(text), Ok("{\"total\": \"₹90\"}"));
    }

    #[test]
    fn test_malformed_outer_span_does_not_yield_nested_object() {
        let text = r#"{"plan": {"dayNumber": 1}, oops}"#;
        assert!(matches!(extract_json_object(text), Err(JsonExtractError::Malformed(_))));

        let text = r#"{"plan": {"dayNumber": 1}, oops} then {"isFallback": false}"#;
        assert_eq!(extract_json_object(text), Ok(r#"{"isFallback": false}"#));
    }

    #[test]
    fn test_large_truncated_reply_fails_quickly() {
        let text = "{\"a\":".repeat(50_000);
        let started = std::time::Instant::now();
        let result = extract_json_object(&text);
        assert!(matches!(result, Err(JsonExtractError::Malformed(_))));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }
}
