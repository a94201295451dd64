//! Recording entity and its value objects

mod audio_data;
mod duration;
mod entity;

pub use audio_data::{AudioData, AudioMimeType};
pub use duration::{format_clock, Duration, DEFAULT_MAX_DURATION_SECS};
pub use entity::{IdGenerator, Recording, RecordingId, MIN_RECORDING_SECS};
