//! WAV container assembly using hound

use std::io::Cursor;

use crate::application::ports::{AssemblyError, AudioAssembler, StreamSpec};
use crate::domain::recording::{AudioData, AudioMimeType};

const BITS_PER_SAMPLE: u16 = 16;

/// Wraps captured little-endian i16 PCM chunks in a RIFF/WAVE container
#[derive(Debug, Default, Clone, Copy)]
pub struct WavAssembler;

impl WavAssembler {
    pub fn new() -> Self {
        Self
    }
}

impl AudioAssembler for WavAssembler {
    fn assemble(&self, chunks: &[Vec<u8>], spec: StreamSpec) -> Result<AudioData, AssemblyError> {
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(AssemblyError::InvalidSpec(format!(
                "{} Hz, {} channels",
                spec.sample_rate, spec.channels
            )));
        }

        let wav_spec = hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, wav_spec)
            .map_err(|e| AssemblyError::WriteFailed(e.to_string()))?;

        // Chunk boundaries may split a sample, so pair bytes across the whole stream
        let mut bytes = chunks.iter().flatten().copied();
        while let (Some(lo), Some(hi)) = (bytes.next(), bytes.next()) {
            writer
                .write_sample(i16::from_le_bytes([lo, hi]))
                .map_err(|e| AssemblyError::WriteFailed(e.to_string()))?;
        }

        // A partial final frame would make the data chunk length invalid
        let channels = u32::from(spec.channels);
        while writer.len() % channels != 0 {
            writer
                .write_sample(0i16)
                .map_err(|e| AssemblyError::WriteFailed(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| AssemblyError::WriteFailed(e.to_string()))?;

        Ok(AudioData::new(cursor.into_inner(), AudioMimeType::Wav))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(rate: u32) -> StreamSpec {
        StreamSpec {
            sample_rate: rate,
            channels: 1,
        }
    }

    #[test]
    fn produces_readable_wav() {
        let chunks = vec![vec![1, 0, 2], vec![0, 0xFF, 0x7F]];
        let audio = WavAssembler::new().assemble(&chunks, mono(8000)).unwrap();
        assert_eq!(audio.mime_type(), AudioMimeType::Wav);

        let mut reader = hound::WavReader::new(Cursor::new(audio.data())).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![1, 2, i16::MAX]);
    }

    #[test]
    fn empty_capture_is_valid_wav() {
        let audio = WavAssembler::new().assemble(&[], mono(16000)).unwrap();
        let reader = hound::WavReader::new(Cursor::new(audio.data())).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn pads_incomplete_stereo_frame() {
        let spec = StreamSpec {
            sample_rate: 44100,
            channels: 2,
        };
        let audio = WavAssembler::new()
            .assemble(&[vec![1, 0, 2, 0, 3, 0]], spec)
            .unwrap();
        let reader = hound::WavReader::new(Cursor::new(audio.data())).unwrap();
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn rejects_zero_channels() {
        let spec = StreamSpec {
            sample_rate: 8000,
            channels: 0,
        };
        assert!(matches!(
            WavAssembler::new().assemble(&[], spec),
            Err(AssemblyError::InvalidSpec(_))
        ));
    }
}
