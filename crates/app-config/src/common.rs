use std::path::PathBuf;

use clap::{Args, ValueHint};
use serde::{Deserialize, Serialize};

const DEFAULT_VIDEO_CODEC: &str = "libx265";
const DEFAULT_PRESET: &str = "slow";
const DEFAULT_AUDIO_CODEC: &str = "copy";
const DEFAULT_EXTENSIONS: &[&str] = &["mp4"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Args)]
#[allow(clippy::struct_field_names)]
pub struct ProgramPathConfig {
    #[arg(long, default_value = None, env = "X265_CONVERT_FFMPEG", value_hint = ValueHint::FilePath)]
    /// Path to the ffmpeg executable.
    ///
    /// If not provided, ffmpeg will be searched for in $PATH
    pub ffmpeg_path: Option<PathBuf>,

    #[arg(long, default_value = None, env = "X265_CONVERT_FFPROBE", value_hint = ValueHint::FilePath)]
    /// Path to the ffprobe executable.
    ///
    /// If not provided, ffprobe will be searched for in $PATH
    pub ffprobe_path: Option<PathBuf>,
}
impl ProgramPathConfig {
    pub(crate) fn merge(&mut self, config: &Self) -> &Self {
        if let Some(ffmpeg_path) = config.ffmpeg_path.as_ref() {
            self.ffmpeg_path = Some(ffmpeg_path.clone());
        }

        if let Some(ffprobe_path) = config.ffprobe_path.as_ref() {
            self.ffprobe_path = Some(ffprobe_path.clone());
        }

        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Args)]
pub struct EncoderConfig {
    #[arg(long, default_value = None, env = "X265_CONVERT_VIDEO_CODEC", value_hint = ValueHint::Other)]
    /// The ffmpeg video encoder to use.
    ///
    /// Defaults to `libx265'
    pub video_codec: Option<String>,

    #[arg(long, default_value = None, env = "X265_CONVERT_PRESET", value_hint = ValueHint::Other)]
    /// The encoder preset.
    ///
    /// Defaults to `slow'
    pub preset: Option<String>,

    #[arg(long, default_value = None, env = "X265_CONVERT_CRF")]
    /// Constant rate factor passed to the encoder.
    ///
    /// If not provided, the encoder's own default is used
    pub crf: Option<u8>,

    #[arg(long, default_value = None, env = "X265_CONVERT_AUDIO_CODEC", value_hint = ValueHint::Other)]
    /// The ffmpeg audio encoder to use.
    ///
    /// Defaults to `copy', which keeps the original audio stream
    pub audio_codec: Option<String>,
}
impl EncoderConfig {
    pub(crate) fn merge(&mut self, config: &Self) -> &Self {
        if let Some(video_codec) = config.video_codec.as_ref() {
            self.video_codec = Some(video_codec.clone());
        }

        if let Some(preset) = config.preset.as_ref() {
            self.preset = Some(preset.clone());
        }

        if let Some(crf) = config.crf {
            self.crf = Some(crf);
        }

        if let Some(audio_codec) = config.audio_codec.as_ref() {
            self.audio_codec = Some(audio_codec.clone());
        }

        self
    }

    #[must_use]
    pub fn video_codec(&self) -> &str {
        self.video_codec.as_deref().unwrap_or(DEFAULT_VIDEO_CODEC)
    }

    #[must_use]
    pub fn preset(&self) -> &str {
        self.preset.as_deref().unwrap_or(DEFAULT_PRESET)
    }

    #[must_use]
    pub const fn crf(&self) -> Option<u8> {
        self.crf
    }

    #[must_use]
    pub fn audio_codec(&self) -> &str {
        self.audio_codec.as_deref().unwrap_or(DEFAULT_AUDIO_CODEC)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Args)]
pub struct FileMatchConfig {
    #[arg(long, default_value = None, env = "X265_CONVERT_EXTENSIONS", value_delimiter = ',', value_name = "EXT")]
    /// Extensions of the files to convert, comma separated.
    ///
    /// Matched case-insensitively. Defaults to `mp4'
    pub extensions: Option<Vec<String>>,
}
impl FileMatchConfig {
    pub(crate) fn merge(&mut self, config: &Self) -> &Self {
        if let Some(extensions) = config.extensions.as_ref() {
            self.extensions = Some(extensions.clone());
        }

        self
    }

    /// Configured extensions, lowercased and without a leading dot.
    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        self.extensions.as_ref().map_or_else(
            || DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            |extensions| {
                extensions
                    .iter()
                    .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect()
            },
        )
    }
}
