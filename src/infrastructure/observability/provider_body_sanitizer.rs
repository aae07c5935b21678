const MAX_VISIBLE_LENGTH: usize = 200;

/// Shortens and redacts a third-party response body before it is logged.
/// These bodies are never returned to callers.
pub fn sanitize_provider_body(body: &str) -> String {
    let trimmed = body.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let sanitized = match trimmed.char_indices().nth(MAX_VISIBLE_LENGTH) {
        Some((cut, _)) => format!(
            "{}... ({} chars total)",
            &trimmed[..cut],
            trimmed.chars().count()
        ),
        None => trimmed.to_string(),
    };

    redact_credentials(&sanitized)
}

fn redact_credentials(text: &str) -> String {
    let patterns = [
        ("Bearer ", "Bearer [REDACTED]"),
        ("Token ", "Token [REDACTED]"),
        ("api_key=", "api_key=[REDACTED]"),
        ("token=", "token=[REDACTED]"),
        ("sig=", "sig=[REDACTED]"),
    ];

    let mut result = text.to_string();
    for (pattern, replacement) in patterns {
        let mut from = 0;
        while let Some(offset) = result[from..].find(pattern) {
            let idx = from + offset;
            let value_start = idx + pattern.len();
            let end = result[value_start..]
                .find(|c: char| c.is_whitespace() || c == '&' || c == '"' || c == '\'')
                .map(|i| value_start + i)
                .unwrap_or(result.len());
            result.replace_range(idx..end, replacement);
            from = idx + replacement.len();
        }
    }

    result
}
