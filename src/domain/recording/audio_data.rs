//! Audio data value object

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Container formats an assembled recording may be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AudioMimeType {
    #[default]
    #[serde(rename = "audio/wav")]
    Wav,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An assembled audio object: opaque container bytes plus their MIME type.
///
/// The bytes are never decoded or rewritten by the domain; persistence
/// stores them base64-encoded next to the recording metadata. Clones share
/// one immutable buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioData {
    #[serde(with = "base64_bytes")]
    data: Arc<[u8]>,
    mime_type: AudioMimeType,
}

impl AudioData {
    /// Create AudioData from raw bytes
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Self {
        Self {
            data: data.into(),
            mime_type,
        }
    }

    /// Get the raw audio data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the MIME type
    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

impl AsRef<[u8]> for AudioData {
    fn as_ref(&self) -> &[u8] {
        self.data()
    }
}

mod base64_bytes {
    use std::sync::Arc;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Arc<[u8]>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Arc::from)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_strings() {
        assert_eq!(AudioMimeType::Wav.as_str(), "audio/wav");
        assert_eq!(AudioMimeType::default(), AudioMimeType::Wav);
    }

    #[test]
    fn clones_share_the_buffer() {
        let audio = AudioData::new(vec![7; 64], AudioMimeType::Wav);
        let copy = audio.clone();
        assert_eq!(copy.data().as_ptr(), audio.data().as_ptr());
    }

    #[test]
    fn human_readable_sizes() {
        assert_eq!(AudioData::new(vec![0u8; 500], AudioMimeType::Wav).human_readable_size(), "500 B");
        assert_eq!(AudioData::new(vec![0u8; 2048], AudioMimeType::Wav).human_readable_size(), "2.0 KB");
        assert_eq!(
            AudioData::new(vec![0u8; 2 * 1024 * 1024], AudioMimeType::Wav).human_readable_size(),
            "2.0 MB"
        );
    }

    #[test]
    fn serializes_bytes_as_base64() {
        let audio = AudioData::new(vec![1, 2, 3, 4], AudioMimeType::Wav);
        let json = serde_json::to_value(&audio).unwrap();
        assert_eq!(json["data"], "AQIDBA==");
        assert_eq!(json["mime_type"], "audio/wav");

        let back: AudioData = serde_json::from_value(json).unwrap();
        assert_eq!(back, audio);
    }

    #[test]
    fn rejects_malformed_base64() {
        let json = serde_json::json!({ "data": "not base64!", "mime_type": "audio/wav" });
        assert!(serde_json::from_value::<AudioData>(json).is_err());
    }
}
