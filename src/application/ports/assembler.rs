//! Audio assembly port interface

use thiserror::Error;

use super::capture::StreamSpec;
use crate::domain::recording::AudioData;

/// Assembly errors
#[derive(Debug, Clone, Error)]
pub enum AssemblyError {
    #[error("Invalid stream format: {0}")]
    InvalidSpec(String),

    #[error("Failed to assemble audio: {0}")]
    WriteFailed(String),
}

/// Port for turning captured chunks into a single audio object
pub trait AudioAssembler: Send + Sync {
    /// Join `chunks` (in delivery order) into the platform container format
    fn assemble(&self, chunks: &[Vec<u8>], spec: StreamSpec) -> Result<AudioData, AssemblyError>;
}
