use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::recording::domain::encoder_command::EncoderCommand;
use crate::recording::domain::frame_sink::{FrameSink, SinkError};

/// Byte channel into a spawned encoder process, fed through its stdin.
///
/// stdout and stderr are discarded; the encoder reports back only through
/// its exit status. Reusable: `open` may be called again after `close`.
pub struct FfmpegPipeSink {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegPipeSink {
    pub fn new() -> Self {
        Self {
            child: None,
            stdin: None,
        }
    }
}

impl Default for FfmpegPipeSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for FfmpegPipeSink {
    fn open(&mut self, command: &EncoderCommand) -> Result<(), SinkError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SinkError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdin = match child.stdin.take() {
            Some(stdin) => stdin,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SinkError::NoInputChannel);
            }
        };

        self.child = Some(child);
        self.stdin = Some(stdin);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        let stdin = self.stdin.as_mut().ok_or(SinkError::NotOpen)?;
        stdin.write_all(bytes).map_err(SinkError::Write)?;
        Ok(bytes.len())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        // Dropping stdin signals end-of-input to the encoder.
        drop(self.stdin.take());

        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        // No timeout here: a hung encoder stalls shutdown until it exits.
        let status = child.wait().map_err(SinkError::Wait)?;
        if status.success() {
            Ok(())
        } else {
            Err(SinkError::EncoderExit(status))
        }
    }

    fn is_open(&self) -> bool {
        self.stdin.is_some()
    }
}

impl Drop for FfmpegPipeSink {
    fn drop(&mut self) {
        if self.is_open() {
            let _ = self.close();
        }
    }
}
