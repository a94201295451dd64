//! Audio assembly and playback reference adapters

mod memory_refs;
mod wav_assembler;

pub use memory_refs::MemoryPlaybackRefs;
pub use wav_assembler::WavAssembler;
