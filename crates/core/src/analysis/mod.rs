use crate::{Result, WaveScopeError};

/// Snapshot sizes the analyser accepts.
pub const SUPPORTED_FFT_SIZES: [usize; 11] = [
    32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
];

/// Byte value of a sample at the zero-crossing centre line.
const CENTRE: u8 = 128;

/// Time-domain analysis primitive behind the signal tap.
///
/// Retains the most recent `fft_size` mono samples in a ring and converts
/// them to the u8 amplitude domain on demand: 128 is the zero-crossing
/// centre, 0 and 255 the extremes of representable amplitude. Snapshots are
/// half the configured size, the usable half of one analysis window. An
/// analyser that has seen no audio reports centre-line silence.
#[derive(Debug, Clone)]
pub struct Analyser {
    fft_size: usize,
    sample_rate: u32,
    ring: Vec<f32>,
    head: usize,
}

impl Analyser {
    /// Creates an analyser for the given snapshot size. Sizes outside
    /// [`SUPPORTED_FFT_SIZES`] are rejected here, at configuration time.
    pub fn new(fft_size: usize, sample_rate: u32) -> Result<Self> {
        if !SUPPORTED_FFT_SIZES.contains(&fft_size) {
            return Err(WaveScopeError::UnsupportedSize(fft_size));
        }
        Ok(Self {
            fft_size,
            sample_rate,
            ring: vec![0.0; fft_size],
            head: 0,
        })
    }

    /// Returns the configured snapshot size.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Returns the audio rate the analyser samples at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the time-domain snapshots this analyser produces.
    pub fn time_domain_len(&self) -> usize {
        self.fft_size / 2
    }

    /// Seconds of audio covered by one retained window.
    pub fn window_seconds(&self) -> f32 {
        self.fft_size as f32 / self.sample_rate.max(1) as f32
    }

    /// Appends mono samples, discarding the oldest once the window is full.
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.ring[self.head] = sample;
            self.head = (self.head + 1) % self.fft_size;
        }
    }

    /// Overwrites `out` with the current snapshot, oldest sample first.
    /// Targets longer than the retained window are padded with silence.
    pub fn fill_time_domain(&self, out: &mut [u8]) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = if i < self.fft_size {
                byte_amplitude(self.ring[(self.head + i) % self.fft_size])
            } else {
                CENTRE
            };
        }
    }

    /// Clears the retained window back to silence.
    pub fn reset(&mut self) {
        self.ring.fill(0.0);
        self.head = 0;
    }
}

/// Converts a sample in [-1, 1] to the u8 amplitude domain, clamping
/// anything outside the representable range.
fn byte_amplitude(sample: f32) -> u8 {
    (128.0 * (1.0 + sample)).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inverse of the byte conversion; exact for every byte value.
    fn byte_input(byte: u8) -> f32 {
        (f32::from(byte) - 128.0) / 128.0
    }

    #[test]
    fn rejects_sizes_outside_the_supported_set() {
        for size in [0, 1, 31, 1000, 48_000, 65_536] {
            let err = Analyser::new(size, 48_000).unwrap_err();
            assert!(matches!(err, WaveScopeError::UnsupportedSize(s) if s == size));
        }
    }

    #[test]
    fn accepts_every_supported_size_with_halved_snapshots() {
        for &size in SUPPORTED_FFT_SIZES.iter() {
            let analyser = Analyser::new(size, 48_000).expect("size should be accepted");
            assert_eq!(analyser.fft_size(), size);
            assert_eq!(analyser.time_domain_len(), size / 2);
        }
    }

    #[test]
    fn idle_analyser_reports_centre_line_silence() {
        let analyser = Analyser::new(64, 48_000).unwrap();
        let mut out = vec![0u8; analyser.time_domain_len()];
        analyser.fill_time_domain(&mut out);
        assert!(out.iter().all(|&byte| byte == CENTRE));
    }

    #[test]
    fn converts_full_scale_samples_to_byte_extremes() {
        let mut analyser = Analyser::new(32, 48_000).unwrap();
        let mut samples = vec![0.0f32; 32];
        samples[0] = -1.0;
        samples[1] = 1.0;
        samples[2] = 2.0; // clipped input still lands on the byte ceiling
        analyser.push_samples(&samples);

        let mut out = vec![0u8; 16];
        analyser.fill_time_domain(&mut out);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 255);
        assert_eq!(out[2], 255);
        assert_eq!(out[3], CENTRE);
    }

    #[test]
    fn retains_only_the_most_recent_window() {
        let mut analyser = Analyser::new(32, 48_000).unwrap();
        let samples: Vec<f32> = (0u8..48).map(byte_input).collect();
        analyser.push_samples(&samples);

        let mut out = vec![0u8; 16];
        analyser.fill_time_domain(&mut out);
        let expected: Vec<u8> = (16..32).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn oversized_targets_are_padded_with_silence() {
        let mut analyser = Analyser::new(32, 48_000).unwrap();
        analyser.push_samples(&[1.0; 32]);

        let mut out = vec![0u8; 40];
        analyser.fill_time_domain(&mut out);
        assert!(out[..32].iter().all(|&byte| byte == 255));
        assert!(out[32..].iter().all(|&byte| byte == CENTRE));
    }

    #[test]
    fn reset_restores_silence() {
        let mut analyser = Analyser::new(32, 48_000).unwrap();
        analyser.push_samples(&[0.5; 32]);
        analyser.reset();

        let mut out = vec![0u8; 16];
        analyser.fill_time_domain(&mut out);
        assert!(out.iter().all(|&byte| byte == CENTRE));
    }

    #[test]
    fn window_covers_fft_size_samples_of_audio() {
        let analyser = Analyser::new(4096, 48_000).unwrap();
        assert!((analyser.window_seconds() - 4096.0 / 48_000.0).abs() < f32::EPSILON);
    }
}
