use std::{
    path::{Path, PathBuf},
    process::{self, Stdio},
    time::Duration,
};

use app_config::{Config, EncoderConfig};
use log::{debug, trace, warn};

use crate::{error::EncodeError, tool::ExternalTool};

/// [`ExternalTool`] backed by the `ffprobe` and `ffmpeg` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
    encoder: EncoderConfig,
}

impl FfmpegTool {
    #[must_use]
    pub const fn new(ffmpeg_path: PathBuf, ffprobe_path: PathBuf, encoder: EncoderConfig) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            encoder,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ffmpeg_path(),
            config.ffprobe_path(),
            config.encoder.clone(),
        )
    }

    fn probe_command(&self, path: &Path) -> process::Command {
        let mut cmd = process::Command::new(&self.ffprobe_path);
        cmd.args(["-v", "error"])
            .args(["-select_streams", "v:0"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .stdin(Stdio::null());

        cmd
    }

    fn encode_command(&self, source: &Path, dest: &Path) -> process::Command {
        let mut cmd = process::Command::new(&self.ffmpeg_path);
        cmd.arg("-hide_banner")
            .arg("-nostdin")
            .arg("-y")
            .args(["-loglevel", "warning"])
            .arg("-stats")
            .arg("-i")
            .arg(source)
            .args(["-c:v", self.encoder.video_codec()])
            .args(["-preset", self.encoder.preset()]);

        if let Some(crf) = self.encoder.crf() {
            cmd.args(["-crf", &crf.to_string()]);
        }

        cmd.args(["-c:a", self.encoder.audio_codec()])
            .arg(dest)
            .stdin(Stdio::null());

        cmd
    }
}

impl ExternalTool for FfmpegTool {
    fn probe(&self, path: &Path) -> Option<Duration> {
        let mut cmd = self.probe_command(path);
        trace!("Running `ffprobe' command: {cmd:?}");

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to run `ffprobe' for {path:?}: {e}");
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                "Failed to get duration for {path:?}: {stderr}",
                stderr = String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration = parse_duration(&stdout);
        if duration.is_none() {
            warn!("Failed to parse duration of {path:?} from {stdout:?}");
        }

        duration
    }

    fn encode(&self, source: &Path, dest: &Path) -> Result<(), EncodeError> {
        let mut cmd = self.encode_command(source, dest);
        debug!("Running `ffmpeg' command: {cmd:?}");

        let status = cmd.status().map_err(EncodeError::Spawn)?;
        if !status.success() {
            return Err(EncodeError::Status(status.code()));
        }

        if !dest.exists() {
            return Err(EncodeError::MissingOutput(dest.to_path_buf()));
        }

        Ok(())
    }
}

/// Reads the seconds value ffprobe prints on its first line.
pub(crate) fn parse_duration(stdout: &str) -> Option<Duration> {
    let seconds = stdout.lines().next()?.trim().parse::<f64>().ok()?;

    Duration::try_from_secs_f64(seconds).ok()
}
