use std::fs;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;

use framepipe_core::recording::recorder::Recorder;
use framepipe_core::shared::frame::Frame;
use framepipe_core::shared::settings::RecorderSettings;

/// Records a synthetic animated clip through an external encoder, pacing an
/// irregular frame producer to a fixed output rate.
#[derive(Parser)]
#[command(name = "framepipe")]
struct Cli {
    /// Output video file.
    output: PathBuf,

    /// Load recorder settings from a JSON file instead of the flags below.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame width in pixels.
    #[arg(long, default_value = "640")]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value = "480")]
    height: u32,

    /// Target output frame rate.
    #[arg(long, default_value = "30")]
    fps: f32,

    /// Encoder bitrate hint in kbit/s.
    #[arg(long, default_value = "20000")]
    bitrate: u32,

    /// Output codec identifier.
    #[arg(long, default_value = "libx264")]
    codec: String,

    /// Encoder executable.
    #[arg(long, default_value = "ffmpeg")]
    encoder: String,

    /// Seconds of video to record.
    #[arg(long, default_value = "5")]
    duration: f32,

    /// How often to offer new frames, per second; defaults to the output
    /// rate. Lower values exercise frame replication, higher values are
    /// absorbed by the pacing engine.
    #[arg(long)]
    produce_fps: Option<f32>,

    /// Refuse to replace an existing output file.
    #[arg(long)]
    no_overwrite: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => RecorderSettings {
            width: cli.width,
            height: cli.height,
            fps: cli.fps,
            bitrate_kbps: cli.bitrate,
            codec: cli.codec.clone(),
            encoder_path: cli.encoder.clone(),
            allow_overwrite: !cli.no_overwrite,
            ..Default::default()
        },
    };
    settings.output_path = cli.output.clone();

    let recorder = Recorder::new();
    if !recorder.start(settings.clone(), false) {
        return Err("recorder failed to start".into());
    }

    let produce_fps = cli.produce_fps.unwrap_or(settings.fps).max(0.1);
    let poll_interval = Duration::from_secs_f64(1.0 / produce_fps as f64);

    let mut tick: u64 = 0;
    while recorder.recorded_duration() < cli.duration {
        if !recorder.is_recording() {
            log::warn!("recording ended early");
            break;
        }
        if recorder.wants_frame() {
            let frame = synthetic_frame(settings.width, settings.height, tick);
            let queued = recorder.add_frame(&frame);
            log::debug!(
                "tick {tick}: queued {queued} frame(s), {} waiting",
                recorder.queued_frames()
            );
            tick += 1;
        }
        thread::sleep(poll_interval);
    }

    recorder.stop();
    log::info!("flushing {} queued frames", recorder.queued_frames());
    while !recorder.is_ready() {
        thread::sleep(Duration::from_millis(20));
    }

    log::info!(
        "wrote {:.2}s of video to {}",
        recorder.recorded_duration(),
        settings.output_path.display()
    );
    Ok(())
}

/// Horizontally scrolling gradient; cheap to generate and obviously animated
/// in playback.
fn synthetic_frame(width: u32, height: u32, tick: u64) -> Frame {
    let w = width as usize;
    let h = height as usize;
    let mut data = vec![0u8; Frame::rgb24_len(width, height)];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 3;
            let phase = (x + tick as usize * 4) % w;
            data[i] = (phase * 255 / w) as u8;
            data[i + 1] = (y * 255 / h) as u8;
            data[i + 2] = ((tick * 3) % 256) as u8;
        }
    }
    Frame::rgb24(data, width, height)
}
