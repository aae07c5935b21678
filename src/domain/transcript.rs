use serde_json::Value;

/// Output exactly as the provider shaped it.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutput {
    Text(String),
    Segments(Vec<String>),
    Structured(Value),
}

/// Plain-text transcript handed back to callers regardless of provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript(String);

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Text is kept verbatim. Segments are concatenated in order without
    /// separators since providers already carry the leading whitespace.
    pub fn from_output(output: TranscriptOutput) -> Option<Self> {
        match output {
            TranscriptOutput::Text(text) => Some(Self(text)),
            TranscriptOutput::Segments(segments) => Some(Self(segments.concat())),
            TranscriptOutput::Structured(value) => Self::from_structured(&value),
        }
    }

    fn from_structured(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str())
                .collect::<Option<Vec<_>>>()
                .map(|parts| Self(parts.concat())),
            Value::Object(map) => {
                for key in ["transcription", "text"] {
                    if let Some(text) = map.get(key).and_then(Value::as_str) {
                        return Some(Self(text.to_string()));
                    }
                }
                map.get("segments")
                    .and_then(Value::as_array)
                    .and_then(|segments| {
                        segments
                            .iter()
                            .map(|segment| segment.get("text").and_then(Value::as_str))
                            .collect::<Option<Vec<_>>>()
                    })
                    .map(|parts| Self(parts.concat()))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
