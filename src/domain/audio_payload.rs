use bytes::Bytes;

/// Raw audio received from a client, owned by a single transcription request.
#[derive(Clone)]
pub struct AudioPayload {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

impl AudioPayload {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MediaRecorder clips are frequently labelled `video/webm`, so video
    /// containers are accepted alongside plain audio.
    pub fn is_supported_content_type(&self) -> bool {
        let mime = self.mime_essence();
        mime.starts_with("audio/") || mime.starts_with("video/") || mime == "application/octet-stream"
    }

    pub fn file_extension(&self) -> &'static str {
        match self.mime_essence().as_str() {
            "audio/webm" | "video/webm" => "webm",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
            "audio/ogg" | "audio/opus" => "ogg",
            "audio/flac" | "audio/x-flac" => "flac",
            "video/mp4" => "mp4",
            _ => "bin",
        }
    }

    pub fn file_name_or_default(&self) -> String {
        self.file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("audio.{}", self.file_extension()))
    }

    fn mime_essence(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }
}

impl std::fmt::Debug for AudioPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioPayload")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}
