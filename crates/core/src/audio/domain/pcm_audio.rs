/// Decoded audio: interleaved PCM samples normalized to [-1.0, 1.0].
#[derive(Clone, Debug)]
pub struct PcmAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl PcmAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_and_into_samples() {
        let samples = vec![0.25f32; 160];
        let audio = PcmAudio::new(samples.clone(), 16000, 1);
        assert_eq!(audio.samples(), &samples[..]);
        assert_eq!(audio.sample_rate(), 16000);
        assert_eq!(audio.channels(), 1);
        assert_eq!(audio.into_samples(), samples);
    }

    #[test]
    fn test_duration_mono() {
        let audio = PcmAudio::new(vec![0.0; 48000], 16000, 1);
        assert_eq!(audio.duration(), 3.0);
    }

    #[test]
    fn test_duration_stereo() {
        let audio = PcmAudio::new(vec![0.0; 96000], 48000, 2);
        assert_eq!(audio.duration(), 1.0);
    }

    #[test]
    fn test_is_empty() {
        assert!(PcmAudio::new(Vec::new(), 16000, 1).is_empty());
        assert!(!PcmAudio::new(vec![0.1], 16000, 1).is_empty());
    }
}
