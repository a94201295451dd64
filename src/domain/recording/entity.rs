//! Recording entity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::audio_data::AudioData;
use super::duration::Duration;
use crate::domain::error::{InvalidRecordingId, TooShortRecording};

/// Recordings shorter than this are discarded instead of stored
pub const MIN_RECORDING_SECS: u32 = 1;

/// Unique, time-derived recording identifier.
///
/// Ids are the decimal form of a millisecond counter that only ever moves
/// forward (see [`IdGenerator`]), so their numeric order is creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordingId(u64);

impl RecordingId {
    pub const fn from_millis(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordingId {
    type Err = InvalidRecordingId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidRecordingId { input: s.to_string() })
    }
}

impl TryFrom<String> for RecordingId {
    type Error = InvalidRecordingId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordingId> for String {
    fn from(id: RecordingId) -> Self {
        id.to_string()
    }
}

/// A stored voice note. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    id: RecordingId,
    audio: AudioData,
    /// Whole seconds, always >= MIN_RECORDING_SECS
    duration: u32,
    /// Creation time, milliseconds since the Unix epoch
    timestamp: u64,
}

impl Recording {
    /// Create a recording, rejecting anything shorter than [`MIN_RECORDING_SECS`].
    pub fn new(
        id: RecordingId,
        audio: AudioData,
        duration_secs: u32,
        timestamp_ms: u64,
    ) -> Result<Self, TooShortRecording> {
        Self::check_length(duration_secs)?;
        Ok(Self {
            id,
            audio,
            duration: duration_secs,
            timestamp: timestamp_ms,
        })
    }

    /// Length policy shared by construction and session finalization
    pub fn check_length(duration_secs: u32) -> Result<(), TooShortRecording> {
        if duration_secs < MIN_RECORDING_SECS {
            return Err(TooShortRecording {
                elapsed_secs: duration_secs,
                minimum_secs: MIN_RECORDING_SECS,
            });
        }
        Ok(())
    }

    pub fn id(&self) -> &RecordingId {
        &self.id
    }

    pub fn audio(&self) -> &AudioData {
        &self.audio
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration))
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp
    }
}

/// Issues strictly increasing recording ids from a millisecond clock.
///
/// A reading that does not move past the last issued id (coarse clock,
/// clock stepping backwards, several finalizations in one millisecond)
/// is bumped to `last + 1`.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: Option<u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure future ids are greater than an id issued elsewhere,
    /// e.g. one loaded from persistent storage.
    pub fn observe(&mut self, id: &RecordingId) {
        self.last = Some(self.last.map_or(id.value(), |last| last.max(id.value())));
    }

    /// Issue the next id for a clock reading in milliseconds
    pub fn next(&mut self, now_ms: u64) -> RecordingId {
        let value = match self.last {
            Some(last) if now_ms <= last => last + 1,
            _ => now_ms,
        };
        self.last = Some(value);
        RecordingId(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::AudioMimeType;

    fn audio() -> AudioData {
        AudioData::new(vec![0u8; 16], AudioMimeType::Wav)
    }

    #[test]
    fn rejects_recordings_under_one_second() {
        let err = Recording::new(RecordingId::from_millis(1), audio(), 0, 10).unwrap_err();
        assert_eq!(err.elapsed_secs, 0);
        assert_eq!(err.minimum_secs, MIN_RECORDING_SECS);
    }

    #[test]
    fn accepts_one_second() {
        let rec = Recording::new(RecordingId::from_millis(7), audio(), 1, 42).unwrap();
        assert_eq!(rec.id().value(), 7);
        assert_eq!(rec.duration_secs(), 1);
        assert_eq!(rec.duration().clock(), "00:01");
        assert_eq!(rec.timestamp_ms(), 42);
    }

    #[test]
    fn id_serializes_as_string() {
        let id = RecordingId::from_millis(1_700_000_000_000);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1700000000000\"");
        let back: RecordingId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<RecordingId>("\"abc\"").is_err());
    }

    #[test]
    fn generator_uses_clock_when_it_advances() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next(100).value(), 100);
        assert_eq!(ids.next(250).value(), 250);
    }

    #[test]
    fn generator_never_repeats_within_one_millisecond() {
        let mut ids = IdGenerator::new();
        let a = ids.next(500);
        let b = ids.next(500);
        let c = ids.next(499);
        assert!(a < b && b < c);
        assert_eq!(c.value(), 502);
    }

    #[test]
    fn generator_skips_past_observed_ids() {
        let mut ids = IdGenerator::new();
        ids.observe(&RecordingId::from_millis(9_000));
        ids.observe(&RecordingId::from_millis(3_000));
        assert_eq!(ids.next(1_000).value(), 9_001);
    }
}
