//! Audio sink: a cpal output stream that pulls blocks from the renderer.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, SampleFormat, SupportedBufferSize, SupportedStreamConfig,
    SupportedStreamConfigRange,
};

use fire_keys::{
    config::SynthConfig,
    synth::{monitor::RenderMonitor, BlockRenderer},
    MAX_BLOCK_SIZE,
};

/// The default output device and its preferred format.
pub struct OutputDevice {
    device: cpal::Device,
    config: SupportedStreamConfig,
}

impl OutputDevice {
    pub fn open_default() -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let default = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let config = if default.sample_format() == SampleFormat::F32 {
            default
        } else {
            let ranges = device
                .supported_output_configs()
                .wrap_err("failed to list output configs")?;
            let config = f32_config(&default, ranges)?;
            log::warn!(
                "device prefers {:?} samples, using f32 at {} Hz instead",
                default.sample_format(),
                config.sample_rate().0
            );
            config
        };

        Ok(Self { device, config })
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate().0 as f32
    }

    /// Start streaming. Asks the device for `block_size` frames per callback
    /// when it advertises support for that size, otherwise takes its default.
    pub fn play(
        self,
        synth: &SynthConfig,
        mut renderer: BlockRenderer,
        mut monitor: RenderMonitor,
    ) -> EyreResult<cpal::Stream> {
        let mut config: cpal::StreamConfig = self.config.clone().into();
        config.buffer_size = buffer_size(self.config.buffer_size(), synth.block_size);

        let channels = config.channels as usize;
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = self
            .device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames_remaining = total_frames - frames_written;
                        let frames_to_render = frames_remaining.min(MAX_BLOCK_SIZE);

                        let block = &mut render_buf[..frames_to_render];
                        monitor.render(&mut renderer, block);

                        // Copy to output (mono to all channels)
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                        }

                        frames_written += frames_to_render;
                    }
                },
                |err| log::error!("audio stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;
        Ok(stream)
    }
}

/// Pick an f32 config when the device's default uses another sample format.
///
/// Prefers the default's sample rate and channel count. Falls back to the
/// highest rate of any f32 range.
fn f32_config(
    default: &SupportedStreamConfig,
    ranges: impl IntoIterator<Item = SupportedStreamConfigRange>,
) -> EyreResult<SupportedStreamConfig> {
    let rate = default.sample_rate();
    let mut candidates: Vec<_> = ranges
        .into_iter()
        .filter(|range| range.sample_format() == SampleFormat::F32)
        .collect();
    candidates.sort_by_key(|range| range.channels() != default.channels());

    let at_default_rate = candidates
        .iter()
        .find(|range| range.min_sample_rate() <= rate && rate <= range.max_sample_rate())
        .cloned()
        .map(|range| range.with_sample_rate(rate));

    at_default_rate
        .or_else(|| {
            candidates
                .into_iter()
                .next()
                .map(SupportedStreamConfigRange::with_max_sample_rate)
        })
        .ok_or_else(|| {
            eyre!(
                "output device has no f32 format (default is {:?})",
                default.sample_format()
            )
        })
}

/// Ask for `frames` per callback only when the device advertises it.
fn buffer_size(supported: &SupportedBufferSize, frames: usize) -> BufferSize {
    match supported {
        SupportedBufferSize::Range { min, max }
            if (*min as usize..=*max as usize).contains(&frames) =>
        {
            BufferSize::Fixed(frames as u32)
        }
        supported => {
            log::warn!("device buffer sizes {supported:?} exclude {frames} frames, using its default");
            BufferSize::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpal::SampleRate;

    fn range(channels: u16, min: u32, max: u32, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            channels,
            SampleRate(min),
            SampleRate(max),
            SupportedBufferSize::Unknown,
            format,
        )
    }

    fn default_i16() -> SupportedStreamConfig {
        SupportedStreamConfig::new(
            2,
            SampleRate(48_000),
            SupportedBufferSize::Unknown,
            SampleFormat::I16,
        )
    }

    #[test]
    fn keeps_default_rate_and_channels_for_f32() {
        let ranges = [
            range(2, 44_100, 96_000, SampleFormat::I16),
            range(1, 8_000, 192_000, SampleFormat::F32),
            range(2, 8_000, 192_000, SampleFormat::F32),
        ];

        let config = f32_config(&default_i16(), ranges).unwrap();
        assert_eq!(config.sample_format(), SampleFormat::F32);
        assert_eq!(config.sample_rate(), SampleRate(48_000));
        assert_eq!(config.channels(), 2);
    }

    #[test]
    fn falls_back_to_another_f32_rate() {
        let ranges = [range(2, 44_100, 44_100, SampleFormat::F32)];

        let config = f32_config(&default_i16(), ranges).unwrap();
        assert_eq!(config.sample_format(), SampleFormat::F32);
        assert_eq!(config.sample_rate(), SampleRate(44_100));
    }

    #[test]
    fn integer_only_device_is_an_error() {
        let ranges = [
            range(2, 44_100, 48_000, SampleFormat::I16),
            range(2, 44_100, 48_000, SampleFormat::I32),
        ];

        assert!(f32_config(&default_i16(), ranges).is_err());
    }

    #[test]
    fn fixed_buffer_only_inside_the_advertised_range() {
        let range = SupportedBufferSize::Range { min: 64, max: 4096 };
        assert_eq!(buffer_size(&range, 4096), BufferSize::Fixed(4096));
        assert_eq!(buffer_size(&range, 8192), BufferSize::Default);
        assert_eq!(buffer_size(&SupportedBufferSize::Unknown, 512), BufferSize::Default);
    }
}
