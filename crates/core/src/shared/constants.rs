use std::time::Duration;

/// Packed 24-bit RGB, the only pixel layout the encoder pipe accepts.
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// Encoder executable used when the settings leave the path empty.
pub const DEFAULT_ENCODER_EXECUTABLE: &str = "ffmpeg";

/// How long the drain thread sleeps between queue checks while idle.
pub const QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(2);
