use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Locates a JSON document inside free-form model output.
///
/// Markdown fences win; otherwise the first balanced top-level `{...}` or
/// `[...]` span is returned. The scan tracks string literals, so braces
/// inside quoted values do not end the span early.
pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    balanced_span(trimmed).map(str::to_string)
}

fn balanced_span(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c == '{' || c == '[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strict parse first; the extraction scan is only a fallback for chatty
/// output.
pub fn parse_document(text: &str) -> Option<Value> {
    if let Ok(v) = serde_json::from_str::<Value>(text.trim()) {
        return Some(v);
    }
    let candidate = extract_json(text)?;
    serde_json::from_str::<Value>(&candidate).ok()
}

/// Unwraps `{ "<key>": ... }` response envelopes. A string payload is treated
/// as raw model text and parsed again.
pub fn unwrap_envelope(doc: Value, key: &str) -> anyhow::Result<Value> {
    let inner = match doc {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => return Ok(other),
    };
    match inner {
        Value::String(s) => parse_document(&s)
            .with_context(|| format!("`{key}` holds text that contains no JSON document")),
        other => Ok(other),
    }
}

/// Full pipeline for JSON intents: locate, unwrap, decode into the schema.
pub fn decode<T: DeserializeOwned>(text: &str, envelope: &str) -> anyhow::Result<T> {
    let doc = parse_document(text).context("response contains no JSON document")?;
    let value = unwrap_envelope(doc, envelope)?;
    serde_json::from_value::<T>(value).context("response JSON does not match the expected schema")
}
