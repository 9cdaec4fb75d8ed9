/// External encoder launcher
use loopcast_core::AudioFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Program and argument template used to start one encoder process
///
/// Arguments may contain the placeholders `{input_format}`,
/// `{output_format}`, `{codec}` and `{bitrate}`; they are substituted on every
/// launch. The process must read raw track bytes on stdin and write the
/// encoded stream on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EncoderCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl EncoderCommand {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// ffmpeg reading `pipe:0` and writing `pipe:1`
    pub fn ffmpeg(program: impl Into<PathBuf>) -> Self {
        Self::new(program, Self::default_ffmpeg_args())
    }

    /// Arguments for ffmpeg with the input format probed from stdin
    ///
    /// The input is a pipe, so MP4/M4A files whose `moov` atom sits after the
    /// audio cannot be decoded and end up skipped. Templates that know their
    /// library can add `-f {input_format}` before `-i`.
    pub fn default_ffmpeg_args() -> Vec<String> {
        [
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            "pipe:0",
            "-vn",
            "-map_metadata",
            "-1",
            "-c:a",
            "{codec}",
            "-b:a",
            "{bitrate}k",
            "-f",
            "{output_format}",
            "pipe:1",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
    }

    /// Arguments with placeholders filled in
    pub fn render_args(
        &self,
        input: AudioFormat,
        output: AudioFormat,
        bitrate_kbps: u32,
    ) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input_format}", input.ffmpeg_demuxer())
                    .replace("{output_format}", output.ffmpeg_muxer())
                    .replace("{codec}", output.ffmpeg_codec())
                    .replace("{bitrate}", &bitrate_kbps.to_string())
            })
            .collect()
    }

    /// Command ready to spawn with all three standard streams piped
    pub fn command(&self, input: AudioFormat, output: AudioFormat, bitrate_kbps: u32) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.render_args(input, output, bitrate_kbps))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Resolve the program to an executable file, searching `PATH` for bare names
    pub fn locate(&self) -> Option<PathBuf> {
        let program = self.program.as_path();
        if program.components().count() > 1 || program.is_absolute() {
            return program.is_file().then(|| program.to_path_buf());
        }

        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths).find_map(|dir| candidate_in(&dir, program))
    }

    pub fn is_available(&self) -> bool {
        self.locate().is_some()
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Default for EncoderCommand {
    fn default() -> Self {
        Self::ffmpeg("ffmpeg")
    }
}

fn candidate_in(dir: &Path, program: &Path) -> Option<PathBuf> {
    let plain = dir.join(program);
    if plain.is_file() {
        return Some(plain);
    }

    let suffix = std::env::consts::EXE_SUFFIX;
    if suffix.is_empty() {
        return None;
    }
    let mut with_suffix = plain.into_os_string();
    with_suffix.push(suffix);
    let with_suffix = PathBuf::from(with_suffix);
    with_suffix.is_file().then_some(with_suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_ffmpeg_placeholders() {
        let encoder = EncoderCommand::default();
        let args = encoder.render_args(AudioFormat::Flac, AudioFormat::Mp3, 192);
        assert!(args.contains(&"libmp3lame".to_string()));
        assert!(args.contains(&"192k".to_string()));
        assert!(args.contains(&"mp3".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }

    #[test]
    fn renders_input_format() {
        let encoder = EncoderCommand::new("enc", vec!["--from={input_format}".to_string()]);
        let args = encoder.render_args(AudioFormat::Ogg, AudioFormat::Mp3, 128);
        assert_eq!(args, vec!["--from=ogg".to_string()]);

        // MP4 input needs the demuxer name, not the AAC output muxer
        let args = encoder.render_args(AudioFormat::M4a, AudioFormat::Mp3, 128);
        assert_eq!(args, vec!["--from=mov".to_string()]);
    }

    #[test]
    fn default_args_probe_the_input_format() {
        let args = EncoderCommand::default().render_args(AudioFormat::M4a, AudioFormat::Ogg, 96);
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input + 1], "pipe:0");
        assert!(!args[..input].contains(&"-f".to_string()));
        assert!(!args.contains(&"adts".to_string()));
    }

    #[test]
    fn missing_program_is_unavailable() {
        let encoder = EncoderCommand::new("/definitely/not/an/encoder", Vec::new());
        assert!(!encoder.is_available());

        let encoder = EncoderCommand::new("loopcast-no-such-encoder-binary", Vec::new());
        assert!(!encoder.is_available());
    }

    #[cfg(unix)]
    #[test]
    fn bare_name_is_found_on_path() {
        let encoder = EncoderCommand::new("sh", Vec::new());
        assert!(encoder.locate().is_some());
    }
}
