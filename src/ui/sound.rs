/// Arena sounds: quarter-start whistle, end-of-period horn, score blip.
///
/// Sounds are synthesized into in-memory WAV buffers once at startup and
/// played fire-and-forget through rodio.
///
/// Built without the "sound" feature, `SoundEngine` is a silent stub.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        whistle: Arc<Vec<u8>>,
        horn: Arc<Vec<u8>>,
        blip: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// `None` when no output device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                whistle: Arc::new(encode_wav(&whistle())),
                horn: Arc::new(encode_wav(&horn(1.2))),
                blip: Arc::new(encode_wav(&blip())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_whistle(&self) { self.play(&self.whistle); }
        pub fn play_horn(&self) { self.play(&self.horn); }
        pub fn play_blip(&self) { self.play(&self.blip); }
    }

    fn samples(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Referee whistle: warbling high tone.
    fn whistle() -> Vec<f32> {
        let n = samples(0.35);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let warble = 1.0 + 0.03 * (t * 30.0 * TAU).sin();
                let env = (1.0 - i as f32 / n as f32).powf(0.3);
                (t * 2800.0 * warble * TAU).sin() * env * 0.2
            })
            .collect()
    }

    /// Buzzer horn: low sawtooth-ish chord with a hard stop.
    fn horn(duration: f32) -> Vec<f32> {
        let n = samples(duration);
        let attack = samples(0.02);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = if i < attack { i as f32 / attack as f32 } else { 1.0 };
                let mut wave = 0.0;
                for (k, f) in [220.0_f32, 277.0, 330.0].iter().enumerate() {
                    for h in 1..=4 {
                        wave += (t * f * h as f32 * TAU).sin() / (h as f32 * (k + 1) as f32);
                    }
                }
                wave * env * 0.08
            })
            .collect()
    }

    /// Scoreboard blip when points go up.
    fn blip() -> Vec<f32> {
        let n = samples(0.06);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                (t * 1320.0 * TAU).sin() * env * 0.2
            })
            .collect()
    }

    /// Mono 16-bit PCM WAV.
    fn encode_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let data_len = samples.len() as u32 * block_align as u32;

        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&CHANNELS.to_le_bytes());
        out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        out.extend_from_slice(&(SAMPLE_RATE * block_align as u32).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&BITS.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = encode_wav(&[0.0, 0.5, -0.5, 1.0]);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..16], b"WAVEfmt ");
            assert_eq!(wav.len(), 44 + 8);
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 8);
        }

        #[test]
        fn generated_sounds_stay_in_range() {
            for buf in [whistle(), horn(0.1), blip()] {
                assert!(!buf.is_empty());
                assert!(buf.iter().all(|s| s.abs() <= 1.0));
            }
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_whistle(&self) {}
    pub fn play_horn(&self) {}
    pub fn play_blip(&self) {}
}
