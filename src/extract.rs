use crate::models::RawObject;
use serde_json::Value;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Finds and parses the single top-level object embedded in `text`.
///
/// A fenced ```` ```json ```` block wins when it parses. Otherwise the text
/// between the first `{` and the last `}` is parsed, and on failure parsed
/// once more after trailing commas are stripped.
pub fn extract_json(text: &str) -> Option<RawObject> {
    if text.trim().is_empty() {
        return None;
    }

    if let Some(object) = fenced_block(text).and_then(parse_object) {
        return Some(object);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let blob = &text[start..=end];
    parse_object(blob).or_else(|| parse_object(&strip_trailing_commas(blob)))
}

/// Parses `text` as a JSON object; any other JSON value is rejected.
pub fn parse_object(text: &str) -> Option<RawObject> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_CLOSE)?;
    Some(rest[..end].trim())
}

/// Removes commas that directly precede `}` or `]` (ignoring whitespace),
/// leaving string literals untouched.
pub fn strip_trailing_commas(blob: &str) -> String {
    let chars: Vec<char> = blob.chars().collect();
    let mut out = String::with_capacity(blob.len());
    let mut in_string = false;
    let mut escaped = false;

    for (idx, &ch) in chars.iter().enumerate() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let next = chars[idx + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_surrounded_by_prose() {
        let text = "Sure! Here is your plan:\n{\"summary\": \"sleep earlier\"}\nGood luck.";
        let object = extract_json(text).expect("object");
        assert_eq!(object["summary"], "sleep earlier");
    }

    #[test]
    fn repairs_trailing_commas_inside_prose() {
        let text = "plan follows {\"pain_points\": [\"late nights\", \"snacks\",], \"summary\": \"x\",} thanks";
        let object = extract_json(text).expect("repaired object");
        assert_eq!(object["pain_points"].as_array().map(Vec::len), Some(2));
        assert_eq!(object["summary"], "x");
    }

    #[test]
    fn fenced_block_is_preferred() {
        let text = "{not json}\n```json\n{\"summary\": \"fenced\"}\n```\n";
        let object = extract_json(text).expect("fenced object");
        assert_eq!(object["summary"], "fenced");
    }

    #[test]
    fn commas_inside_strings_survive_repair() {
        let repaired = strip_trailing_commas(r#"{"a": "x,}", "b": [1, 2,],}"#);
        assert_eq!(repaired, r#"{"a": "x,}", "b": [1, 2]}"#);
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let repaired = strip_trailing_commas(r#"{"a": "say \",]\"",}"#);
        assert_eq!(repaired, r#"{"a": "say \",]\""}"#);
    }

    #[test]
    fn rejects_text_without_an_object() {
        assert!(extract_json("").is_none());
        assert!(extract_json("no braces here").is_none());
        assert!(extract_json("} backwards {").is_none());
        assert!(extract_json("{ still broken ").is_none());
    }

    #[test]
    fn parse_object_rejects_non_objects() {
        assert!(parse_object("[1, 2]").is_none());
        assert!(parse_object("\"text\"").is_none());
        assert!(parse_object("{}").is_some());
    }
}
