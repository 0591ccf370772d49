use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::recording::domain::frame_queue::FrameQueue;
use crate::recording::domain::frame_sink::{FrameSink, SinkError};
use crate::recording::domain::pacing::PacingEngine;
use crate::recording::infrastructure::ffmpeg_command::build_encoder_command;
use crate::recording::infrastructure::ffmpeg_pipe_sink::FfmpegPipeSink;
use crate::shared::constants::{DEFAULT_ENCODER_EXECUTABLE, QUEUE_POLL_INTERVAL};
use crate::shared::frame::Frame;
use crate::shared::settings::RecorderSettings;

/// Why a `start` call was rejected. Reported through the log and the
/// boolean return value; never escalated.
#[derive(Error, Debug)]
pub enum StartError {
    #[error("already recording")]
    AlreadyRecording,
    #[error("previous recording is still draining {queued} frames")]
    PreviousRecordingBusy { queued: usize },
    #[error("output path is not set")]
    EmptyOutputPath,
    #[error("output file {0} exists and overwriting is disabled")]
    OutputExists(PathBuf),
    #[error("frame rate must be positive, got {0}")]
    NonPositiveFrameRate(f32),
    #[error("failed to open encoder pipe: {0}")]
    PipeOpen(#[from] SinkError),
}

struct Session {
    settings: RecorderSettings,
    started_at: Option<Instant>,
}

/// State shared between the caller's context and the drain thread.
struct Shared {
    queue: FrameQueue,
    sink: Mutex<Box<dyn FrameSink>>,
    is_recording: AtomicBool,
    /// True iff no pipe is open and no drain is in progress.
    is_ready: AtomicBool,
    pipe_open: AtomicBool,
    quit_drain: AtomicBool,
    /// Output frame slots produced since start, the authoritative timeline.
    frames_recorded: AtomicU64,
    session: Mutex<Session>,
}

/// Records an irregular stream of raw frames to a video file at a fixed
/// output rate, by piping pixel data to an external encoder process.
///
/// Frames submitted through [`add_frame`](Recorder::add_frame) are
/// duplicated or accepted singly so the output timeline tracks wall-clock
/// time, queued, and written out by a dedicated drain thread at the target
/// cadence. `stop` keeps the drain alive until everything queued before the
/// stop has reached the encoder.
pub struct Recorder {
    shared: Arc<Shared>,
    drain: Mutex<Option<JoinHandle<()>>>,
}

impl Recorder {
    /// A recorder writing through a spawned encoder process.
    pub fn new() -> Self {
        Self::with_sink(Box::new(FfmpegPipeSink::new()))
    }

    /// A recorder over a caller-supplied sink implementation.
    pub fn with_sink(sink: Box<dyn FrameSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: FrameQueue::new(),
                sink: Mutex::new(sink),
                is_recording: AtomicBool::new(false),
                is_ready: AtomicBool::new(true),
                pipe_open: AtomicBool::new(false),
                quit_drain: AtomicBool::new(false),
                frames_recorded: AtomicU64::new(0),
                session: Mutex::new(Session {
                    settings: RecorderSettings::default(),
                    started_at: None,
                }),
            }),
            drain: Mutex::new(None),
        }
    }

    /// Begins a new recording session.
    ///
    /// Fails while a session is recording, and while a previous session is
    /// still draining unless `force_if_not_ready` cancels the drain and
    /// discards its queue. Returns whether recording is now active.
    pub fn start(&self, settings: RecorderSettings, force_if_not_ready: bool) -> bool {
        match self.try_start(settings, force_if_not_ready) {
            Ok(()) => {
                log::info!("recording started");
                true
            }
            Err(e) => {
                log::error!("can't start recording: {e}");
                false
            }
        }
    }

    fn try_start(&self, mut settings: RecorderSettings, force: bool) -> Result<(), StartError> {
        if self.is_recording() {
            return Err(StartError::AlreadyRecording);
        }

        if !self.is_ready() {
            if force {
                log::warn!(
                    "cancelling still-draining recording, discarding {} queued frames",
                    self.queued_frames()
                );
                self.shared.quit_drain.store(true, Ordering::SeqCst);
                self.shared.queue.clear();
            } else {
                return Err(StartError::PreviousRecordingBusy {
                    queued: self.queued_frames(),
                });
            }
        }

        // The outgoing drain thread closes the sink on its way out; join it
        // before touching the sink again.
        self.join_drain_thread();

        if settings.output_path.as_os_str().is_empty() {
            return Err(StartError::EmptyOutputPath);
        }
        if settings.output_path.exists() && !settings.allow_overwrite {
            return Err(StartError::OutputExists(settings.output_path.clone()));
        }
        if settings.fps <= 0.0 {
            return Err(StartError::NonPositiveFrameRate(settings.fps));
        }
        if settings.encoder_path.is_empty() {
            settings.encoder_path = DEFAULT_ENCODER_EXECUTABLE.to_string();
        }

        let command = build_encoder_command(&settings);

        {
            let mut sink = self.shared.sink.lock().unwrap();
            if sink.is_open() {
                if let Err(e) = sink.close() {
                    log::warn!("stale encoder pipe closed uncleanly: {e}");
                }
                self.shared.pipe_open.store(false, Ordering::SeqCst);
            }

            self.shared.frames_recorded.store(0, Ordering::SeqCst);
            self.shared.quit_drain.store(false, Ordering::SeqCst);
            {
                let mut session = self.shared.session.lock().unwrap();
                session.settings = settings;
                session.started_at = None;
            }

            log::info!("starting encoder: {command}");
            sink.open(&command)?;
            self.shared.pipe_open.store(true, Ordering::SeqCst);
            self.shared.is_ready.store(false, Ordering::SeqCst);
        }

        self.shared.is_recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stops accepting new frames. Frames already queued keep draining to
    /// the encoder; `is_ready` reports when the session has fully wound
    /// down.
    pub fn stop(&self) {
        self.shared.is_recording.store(false, Ordering::SeqCst);
    }

    /// True when the recording is active, the pipe is open, and at least one
    /// output slot is due — or when the session's timeline has not started
    /// yet and a first frame is needed to establish it.
    pub fn wants_frame(&self) -> bool {
        if !self.is_recording() || !self.shared.pipe_open.load(Ordering::SeqCst) {
            return false;
        }

        let session = self.shared.session.lock().unwrap();
        let Some(started_at) = session.started_at else {
            return true;
        };
        let fps = session.settings.fps;
        let pacing = PacingEngine::new(fps);
        pacing.frames_due(started_at.elapsed(), self.timeline_position(fps)) > 0
    }

    /// Submits one frame, replicating or single-copying it per the pacing
    /// policy. Returns the number of queue entries produced, 0 when the
    /// frame was rejected.
    pub fn add_frame(&self, frame: &Frame) -> usize {
        if !self.is_recording() {
            log::error!("can't add frame: not recording");
            return 0;
        }
        if !self.shared.pipe_open.load(Ordering::SeqCst) {
            log::error!("can't add frame: encoder pipe is not open");
            return 0;
        }
        if frame.is_empty() {
            log::error!("can't add frame: pixel data is empty");
            return 0;
        }

        let (fps, first_frame, elapsed) = {
            let mut session = self.shared.session.lock().unwrap();
            let settings = &session.settings;
            if frame.width() != settings.width || frame.height() != settings.height {
                log::error!(
                    "can't add frame: got {}x{}, recording at {}x{}",
                    frame.width(),
                    frame.height(),
                    settings.width,
                    settings.height
                );
                return 0;
            }
            let fps = settings.fps;
            let first_frame = session.started_at.is_none();
            let started_at = *session.started_at.get_or_insert_with(Instant::now);
            (fps, first_frame, started_at.elapsed())
        };

        if first_frame {
            self.spawn_drain_thread(fps);
        }

        let pacing = PacingEngine::new(fps);
        let copies = pacing.replication(elapsed, self.timeline_position(fps));

        // One pixel allocation per submission; every queued handle shares it
        // and the last handle consumed frees it.
        let handle = Arc::new(frame.clone());
        for _ in 0..copies {
            self.shared.queue.push(Arc::clone(&handle));
        }

        self.shared
            .frames_recorded
            .fetch_add(copies as u64, Ordering::SeqCst);
        copies
    }

    pub fn is_recording(&self) -> bool {
        self.shared.is_recording.load(Ordering::SeqCst)
    }

    /// True when no pipe is open and no drain is in progress; a new `start`
    /// without force succeeds only in this state.
    pub fn is_ready(&self) -> bool {
        self.shared.is_ready.load(Ordering::SeqCst)
    }

    /// Seconds of output produced so far: logical frames divided by the
    /// target rate, independent of wall-clock time.
    pub fn recorded_duration(&self) -> f32 {
        let fps = self.shared.session.lock().unwrap().settings.fps;
        self.shared.frames_recorded.load(Ordering::SeqCst) as f32 / fps
    }

    pub fn queued_frames(&self) -> usize {
        self.shared.queue.len()
    }

    /// The settings adopted by the most recent `start`.
    pub fn settings(&self) -> RecorderSettings {
        self.shared.session.lock().unwrap().settings.clone()
    }

    fn timeline_position(&self, fps: f32) -> Duration {
        let frames = self.shared.frames_recorded.load(Ordering::SeqCst);
        Duration::from_secs_f64(frames as f64 / fps as f64)
    }

    fn spawn_drain_thread(&self, fps: f32) {
        let shared = Arc::clone(&self.shared);
        let handle = thread::spawn(move || drain_loop(shared, fps));
        *self.drain.lock().unwrap() = Some(handle);
    }

    fn join_drain_thread(&self) {
        let handle = self.drain.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("drain thread panicked");
            }
        }
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.stop();
        self.join_drain_thread();
    }
}

/// Pops queued frames and writes them to the sink at the target cadence.
///
/// Runs until the recording is stopped and the queue is empty, a quit is
/// signalled, or a write fails. The sink is closed on every exit path.
fn drain_loop(shared: Arc<Shared>, fps: f32) {
    let frame_duration = Duration::from_secs_f64(1.0 / fps as f64);
    let ticker = crossbeam_channel::tick(frame_duration);
    let mut announced_flush = false;

    loop {
        if shared.quit_drain.load(Ordering::SeqCst) {
            break;
        }

        if shared.queue.is_empty() {
            if !shared.is_recording.load(Ordering::SeqCst) {
                break;
            }
            thread::sleep(QUEUE_POLL_INTERVAL);
            continue;
        }

        if !shared.is_recording.load(Ordering::SeqCst) && !announced_flush {
            log::info!(
                "recording stopped, flushing {} queued frames at {fps} fps",
                shared.queue.len()
            );
            announced_flush = true;
        }

        // Writes leave at the output cadence even when the queue was filled
        // in a burst.
        if ticker.recv().is_err() {
            break;
        }
        if shared.quit_drain.load(Ordering::SeqCst) {
            break;
        }

        let Some(frame) = shared.queue.try_pop() else {
            continue;
        };

        let result = shared.sink.lock().unwrap().write(frame.data());
        if let Err(e) = result {
            log::error!("frame write failed, cancelling recording: {e}");
            shared.quit_drain.store(true, Ordering::SeqCst);
            break;
        }
    }

    // Frames left behind by a cancelled or failed session will never be
    // written; drop them so they can't leak into the next session.
    shared.queue.clear();

    match shared.sink.lock().unwrap().close() {
        Ok(()) => log::info!("encoder pipe closed"),
        // The frames are already delivered; a bad exit is reported, not
        // escalated.
        Err(e) => log::warn!("encoder finished with an error: {e}"),
    }
    shared.pipe_open.store(false, Ordering::SeqCst);

    shared.is_recording.store(false, Ordering::SeqCst);
    shared.is_ready.store(true, Ordering::SeqCst);
}
