//! Spoken plan briefings: synthesis, PCM decoding and playback sinks.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api_connection::endpoints::{
    model_for, Content, GenerateContentRequest, GenerationConfig, ModelCapability, Part, SpeechConfig,
};
use crate::api_connection::GenerationService;

pub const BRIEFING_SAMPLE_RATE: u32 = 24_000;
pub const BRIEFING_CHANNELS: usize = 1;
pub const BRIEFING_VOICE: &str = "Kore";

pub fn build_briefing_request(text: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![Part::text(format!(
            "Say this in a cool, tactical mafia boss voice: {}",
            text
        ))])],
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["AUDIO".to_string()],
            speech_config: Some(SpeechConfig::prebuilt(BRIEFING_VOICE)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Synthesizes `text` and returns base64 PCM (mono, s16le, 24 kHz), or `None`
/// when the service fails or returns no audio.
pub async fn generate_briefing_audio<S>(service: &S, text: &str) -> Option<String>
where
    S: GenerationService + ?Sized,
{
    let request = build_briefing_request(text);
    let model = model_for(ModelCapability::Speech);

    match service.generate_content(model, &request).await {
        Ok(response) => match response.inline_data() {
            Some(inline) if !inline.data.is_empty() => {
                debug!(mime = %inline.mime_type, len = inline.data.len(), "briefing audio received");
                Some(inline.data.clone())
            }
            _ => {
                warn!("TTS generation failed: audio data missing");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "TTS generation failed");
            None
        }
    }
}

pub fn decode_base64_audio(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(payload.trim())
}

/// Decoded, normalized audio ready for a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    /// One vector of samples in [-1.0, 1.0] per channel.
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frame_count();
        let mut out = Vec::with_capacity(frames * self.channel_count());
        for i in 0..frames {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }
}

/// Reinterprets bytes as interleaved 16-bit little-endian samples and scales
/// each by 1/32768. Frames = len / 2 / channels; a trailing partial frame is
/// dropped.
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channel_count: usize) -> AudioBuffer {
    let channel_count = channel_count.max(1);
    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    let frame_count = samples.len() / channel_count;

    let channels = (0..channel_count)
        .map(|channel| {
            (0..frame_count)
                .map(|i| samples[i * channel_count + channel] as f32 / 32768.0)
                .collect()
        })
        .collect();

    AudioBuffer { sample_rate, channels }
}

/// Serializes samples as `f32le`. Little-endian targets reinterpret the slice
/// in place; others convert per sample.
fn f32_le_bytes(samples: &[f32]) -> Vec<u8> {
    if cfg!(target_endian = "little") {
        bytemuck::cast_slice(samples).to_vec()
    } else {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

#[async_trait]
pub trait AudioSink: Send {
    async fn play(&mut self, buffer: &AudioBuffer) -> anyhow::Result<()>;
}

/// Writes interleaved little-endian f32 samples to a file
/// (`ffplay -f f32le -ar 24000 -ac 1 <file>`).
pub struct PcmFileSink {
    pub path: PathBuf,
}

#[async_trait]
impl AudioSink for PcmFileSink {
    async fn play(&mut self, buffer: &AudioBuffer) -> anyhow::Result<()> {
        let samples = buffer.interleaved();
        let bytes = f32_le_bytes(&samples);
        tokio::fs::write(&self.path, bytes).await?;
        debug!(path = %self.path.display(), frames = buffer.frame_count(), "briefing written");
        Ok(())
    }
}
