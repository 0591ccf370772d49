use std::process::ExitStatus;

use thiserror::Error;

use crate::recording::domain::encoder_command::EncoderCommand;

/// Failures over a sink's open/write/close lifecycle.
///
/// `Write` is fatal to the recording in flight. `EncoderExit` is reported by
/// `close` after the frames have already been delivered, so callers treat it
/// as a diagnostic rather than a session failure.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to spawn encoder `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("spawned encoder exposes no writable input channel")]
    NoInputChannel,
    #[error("sink is not open")]
    NotOpen,
    #[error("write to encoder failed: {0}")]
    Write(#[source] std::io::Error),
    #[error("encoder exited with status {0}")]
    EncoderExit(ExitStatus),
    #[error("failed to wait for encoder exit: {0}")]
    Wait(#[source] std::io::Error),
}

/// Abstracts the byte channel into an external encoder process so the
/// recorder can be exercised without spawning one.
pub trait FrameSink: Send {
    /// Spawns the encoder and acquires its writable input channel.
    ///
    /// On failure the sink stays closed.
    fn open(&mut self, command: &EncoderCommand) -> Result<(), SinkError>;

    /// Blocking write of one frame's raw bytes; returns the count written.
    ///
    /// Anything short of a complete write is an error, and fatal to the
    /// current recording.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError>;

    /// Signals end-of-input and waits for the encoder to exit.
    ///
    /// The sink is closed and reusable afterwards even when the encoder
    /// reports a bad exit.
    fn close(&mut self) -> Result<(), SinkError>;

    fn is_open(&self) -> bool;
}
