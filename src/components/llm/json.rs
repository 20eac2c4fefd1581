use serde::de::DeserializeOwned;
use serde_json::from_str;
use tracing::debug;

/// Pull a JSON value of type `T` out of free-form model output.
///
/// Models wrap JSON in prose or Markdown fences; try the whole text first,
/// then the outermost `{...}` and `[...]` spans.
pub fn extract_json<T: DeserializeOwned>(response: &str) -> Option<T> {
    let trimmed = strip_code_fence(response.trim());

    if let Ok(value) = from_str::<T>(trimmed) {
        return Some(value);
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                match from_str::<T>(&trimmed[start..=end]) {
                    Ok(value) => return Some(value),
                    Err(e) => debug!("Candidate JSON span did not parse: {}", e),
                }
            }
        }
    }

    None
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
