use crate::recording::domain::encoder_command::EncoderCommand;
use crate::shared::constants::DEFAULT_ENCODER_EXECUTABLE;
use crate::shared::settings::RecorderSettings;

/// Renders the canonical raw-video-over-stdin invocation:
///
/// `-y -an -r <fps> -s <w>x<h> -f rawvideo -pix_fmt rgb24 [extra input]
///  -i pipe: -r <fps> -c:v <codec> -b:v <kbps>k [extra output] <path>`
///
/// The encoder learns the frame geometry from these arguments; the byte
/// stream itself carries no framing.
pub fn build_encoder_command(settings: &RecorderSettings) -> EncoderCommand {
    let program = if settings.encoder_path.is_empty() {
        DEFAULT_ENCODER_EXECUTABLE.to_string()
    } else {
        settings.encoder_path.clone()
    };

    let fps = format_fps(settings.fps);

    let mut args: Vec<String> = vec![
        "-y".to_string(),
        "-an".to_string(),
        "-r".to_string(),
        fps.clone(),
        "-s".to_string(),
        format!("{}x{}", settings.width, settings.height),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
    ];
    args.extend(split_extra_args(&settings.extra_input_args));
    args.push("-i".to_string());
    args.push("pipe:".to_string());
    args.push("-r".to_string());
    args.push(fps);
    args.push("-c:v".to_string());
    args.push(settings.codec.clone());
    args.push("-b:v".to_string());
    args.push(format!("{}k", settings.bitrate_kbps));
    args.extend(split_extra_args(&settings.extra_output_args));
    args.push(settings.output_path.to_string_lossy().into_owned());

    EncoderCommand { program, args }
}

/// Whitespace-tokenizes a user-supplied argument string; empty input
/// contributes nothing.
fn split_extra_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Integral rates print without a trailing `.0` so the command line reads
/// `-r 30`, not `-r 30.0`.
fn format_fps(fps: f32) -> String {
    if fps.fract() == 0.0 {
        format!("{}", fps as u32)
    } else {
        format!("{fps}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    #[test]
    fn test_default_settings_produce_canonical_args() {
        let command = build_encoder_command(&RecorderSettings::default());
        assert_eq!(command.program, "ffmpeg");
        let expected: Vec<&str> = vec![
            "-y", "-an", "-r", "30", "-s", "640x480", "-f", "rawvideo", "-pix_fmt", "rgb24",
            "-i", "pipe:", "-r", "30", "-c:v", "libx264", "-b:v", "20000k", "-pix_fmt",
            "yuv420p", "-vsync", "1", "-g", "1", "output.mp4",
        ];
        assert_eq!(command.args, expected);
    }

    #[test]
    fn test_empty_extra_args_are_omitted() {
        let settings = RecorderSettings {
            extra_input_args: String::new(),
            extra_output_args: String::new(),
            ..Default::default()
        };
        let command = build_encoder_command(&settings);
        assert!(!command.args.iter().any(|arg| arg.is_empty()));
        // nothing between the pixel format and the pipe input
        let pix_fmt = command.args.iter().position(|a| a == "rgb24").unwrap();
        assert_eq!(command.args[pix_fmt + 1], "-i");
        // output path directly follows the bitrate
        assert_eq!(command.args.last().unwrap(), "output.mp4");
        assert_eq!(command.args[command.args.len() - 2], "20000k");
    }

    #[test]
    fn test_extra_input_args_are_tokenized_before_pipe() {
        let settings = RecorderSettings {
            extra_input_args: "-use_wallclock_as_timestamps 1".to_string(),
            ..Default::default()
        };
        let command = build_encoder_command(&settings);
        let flag = command
            .args
            .iter()
            .position(|a| a == "-use_wallclock_as_timestamps")
            .unwrap();
        assert_eq!(command.args[flag + 1], "1");
        assert_eq!(command.args[flag + 2], "-i");
        assert_eq!(command.args[flag + 3], "pipe:");
    }

    #[test]
    fn test_empty_encoder_path_defaults_to_ffmpeg() {
        let settings = RecorderSettings {
            encoder_path: String::new(),
            ..Default::default()
        };
        assert_eq!(build_encoder_command(&settings).program, "ffmpeg");
    }

    #[test]
    fn test_custom_settings_flow_through() {
        let settings = RecorderSettings {
            output_path: PathBuf::from("/tmp/clip.mkv"),
            width: 1920,
            height: 1080,
            bitrate_kbps: 8_000,
            codec: "libx265".to_string(),
            encoder_path: "/opt/ffmpeg/bin/ffmpeg".to_string(),
            ..Default::default()
        };
        let command = build_encoder_command(&settings);
        assert_eq!(command.program, "/opt/ffmpeg/bin/ffmpeg");
        assert!(command.args.contains(&"1920x1080".to_string()));
        assert!(command.args.contains(&"libx265".to_string()));
        assert!(command.args.contains(&"8000k".to_string()));
        assert_eq!(command.args.last().unwrap(), "/tmp/clip.mkv");
    }

    #[rstest]
    #[case(30.0, "30")]
    #[case(24.0, "24")]
    #[case(29.97, "29.97")]
    #[case(0.5, "0.5")]
    fn test_fps_formatting(#[case] fps: f32, #[case] expected: &str) {
        assert_eq!(format_fps(fps), expected);
    }
}
