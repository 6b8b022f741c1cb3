use std::path::Path;

use ffmpeg_next::format::sample::Type as SampleLayout;
use ffmpeg_next::format::Sample;
use ffmpeg_next::software::resampling;
use ffmpeg_next::util::frame::audio::Audio as AudioFrame;
use ffmpeg_next::{codec, decoder, media, ChannelLayout};

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::pcm_audio::PcmAudio;
use crate::audio::domain::transcription_engine::EngineError;

/// Decodes any ffmpeg-readable audio file (mp3, wav, ogg, m4a, ...) to mono f32.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<PcmAudio>, EngineError> {
        decode(path, target_sample_rate)
            .map_err(|e| EngineError::Decode(format!("{}: {e}", path.display())))
    }
}

fn decode(path: &Path, target_sample_rate: u32) -> Result<Option<PcmAudio>, ffmpeg_next::Error> {
    ffmpeg_next::init()?;
    let mut input = ffmpeg_next::format::input(path)?;

    let Some(stream) = input.streams().best(media::Type::Audio) else {
        return Ok(None);
    };
    let stream_index = stream.index();
    let decoder = codec::context::Context::from_parameters(stream.parameters())?
        .decoder()
        .audio()?;
    let mut sink = MonoSink::new(decoder, target_sample_rate)?;

    for (stream, packet) in input.packets() {
        if stream.index() == stream_index {
            sink.decoder.send_packet(&packet)?;
            sink.drain()?;
        }
    }
    sink.decoder.send_eof()?;
    sink.drain()?;

    Ok(Some(PcmAudio::new(sink.finish(), target_sample_rate, 1)))
}

/// Decoder plus resampler to planar mono f32, collecting every sample.
struct MonoSink {
    decoder: decoder::Audio,
    resampler: resampling::Context,
    decoded: AudioFrame,
    resampled: AudioFrame,
    samples: Vec<f32>,
}

impl MonoSink {
    fn new(decoder: decoder::Audio, rate: u32) -> Result<Self, ffmpeg_next::Error> {
        let resampler = resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            Sample::F32(SampleLayout::Planar),
            ChannelLayout::MONO,
            rate,
        )?;
        Ok(Self {
            decoder,
            resampler,
            decoded: AudioFrame::empty(),
            resampled: AudioFrame::empty(),
            samples: Vec::new(),
        })
    }

    fn drain(&mut self) -> Result<(), ffmpeg_next::Error> {
        while self.decoder.receive_frame(&mut self.decoded).is_ok() {
            self.resampler.run(&self.decoded, &mut self.resampled)?;
            push_samples(&self.resampled, &mut self.samples);
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<f32> {
        // Samples still buffered in the resampler.
        if let Ok(Some(delay)) = self.resampler.flush(&mut self.resampled) {
            if delay.output > 0 {
                push_samples(&self.resampled, &mut self.samples);
            }
        }
        self.samples
    }
}

fn push_samples(frame: &AudioFrame, out: &mut Vec<f32>) {
    let count = frame.samples();
    if count == 0 {
        return;
    }
    // Plane 0 of a planar mono F32 frame holds `count` native-endian floats.
    let floats = frame.plane::<f32>(0);
    out.extend_from_slice(&floats[..count.min(floats.len())]);
}
