use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::frame::Frame;

/// Everything a recording session needs to know up front.
///
/// Adopted by the recorder at `start`; changes made afterwards do not affect
/// a session already in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderSettings {
    /// Destination video file.
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Target output frame rate in frames per second. Must be positive.
    pub fps: f32,
    /// Bitrate hint handed to the encoder, in kbit/s.
    pub bitrate_kbps: u32,
    /// Output codec identifier, e.g. `libx264`.
    pub codec: String,
    /// Extra encoder arguments inserted before `-i pipe:`, whitespace-separated.
    pub extra_input_args: String,
    /// Extra encoder arguments inserted before the output path, whitespace-separated.
    pub extra_output_args: String,
    pub allow_overwrite: bool,
    /// Encoder executable; empty means `ffmpeg` on the search path.
    pub encoder_path: String,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output.mp4"),
            width: 640,
            height: 480,
            fps: 30.0,
            bitrate_kbps: 20_000,
            codec: "libx264".to_string(),
            extra_input_args: String::new(),
            extra_output_args: "-pix_fmt yuv420p -vsync 1 -g 1".to_string(),
            allow_overwrite: true,
            encoder_path: "ffmpeg".to_string(),
        }
    }
}

impl RecorderSettings {
    /// Byte length of one raw frame at the configured resolution.
    pub fn frame_len(&self) -> usize {
        Frame::rgb24_len(self.width, self.height)
    }

    /// Duration of one output frame slot.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }
}
