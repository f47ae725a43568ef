use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum, ValueHint};
use serde::{Deserialize, Serialize};

use crate::{
    common::{EncoderConfig, FileMatchConfig, ProgramPathConfig},
    Config,
};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(flatten)]
    pub app: AppArgs,

    #[command(flatten, next_help_heading = Some("Program paths"))]
    pub paths: ProgramPathConfig,

    #[command(flatten, next_help_heading = Some("Encoder"))]
    pub encoder: EncoderConfig,

    #[command(flatten, next_help_heading = Some("File matching"))]
    pub files: FileMatchConfig,
}

impl CliArgs {
    pub(crate) fn merge_into_config(&self, config: &mut Config) {
        if let Some(ffmpeg_path) = &self.paths.ffmpeg_path {
            eprintln!(
                "Found ffmpeg path from arguments: {:?}",
                ffmpeg_path.display()
            );
        }

        if let Some(ffprobe_path) = &self.paths.ffprobe_path {
            eprintln!(
                "Found ffprobe path from arguments: {:?}",
                ffprobe_path.display()
            );
        }

        config.dependencies.merge(&self.paths);
        config.encoder.merge(&self.encoder);
        config.files.merge(&self.files);

        if let Some(config_path) = &self.app.config_path {
            config.app.config_path = config_path.into();
        }

        config.run.directory = self.app.directory.clone();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ValueEnum)]
pub enum DumpType {
    Toml,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct AppArgs {
    #[arg(short = 'd', long, value_hint = ValueHint::DirPath)]
    /// The directory containing the videos to convert.
    pub directory: PathBuf,

    #[arg(short = 'c', long, default_value = None, env = "X265_CONVERT_CONFIG", value_hint = ValueHint::FilePath)]
    /// Location of the configuration file.
    ///
    /// By default should be in the os-appropriate config directory
    /// under the name `x265-convert/config.toml`
    pub config_path: Option<PathBuf>,

    #[arg(long, ignore_case = true, value_name = "FORMAT")]
    /// Dump the configuration to stdout and exit.
    ///
    /// Useful for debugging.
    /// When dumped with the `toml` format, can be used as a config file.
    #[allow(clippy::option_option)]
    pub dump_config: Option<Option<DumpType>>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn directory_is_required() {
        assert!(CliArgs::try_parse_from(["x265-convert"]).is_err());
    }

    #[test]
    fn short_directory_flag() {
        let args = CliArgs::try_parse_from(["x265-convert", "-d", "/videos"]).unwrap();

        assert_eq!(args.app.directory, PathBuf::from("/videos"));
        assert!(args.app.dump_config.is_none());
    }

    #[test]
    fn args_override_config() {
        let args = CliArgs::try_parse_from([
            "x265-convert",
            "--directory",
            "/videos",
            "--preset",
            "fast",
            "--extensions",
            "mp4,mkv",
            "--ffmpeg-path",
            "/opt/ffmpeg",
        ])
        .unwrap();

        let mut config = Config::default();
        config.encoder.preset = Some("slow".to_string());
        config.encoder.crf = Some(26);
        args.merge_into_config(&mut config);

        assert_eq!(config.run.directory, PathBuf::from("/videos"));
        assert_eq!(config.encoder.preset(), "fast");
        assert_eq!(config.encoder.crf(), Some(26));
        assert_eq!(config.files.extensions(), vec!["mp4", "mkv"]);
        assert_eq!(
            config.dependencies.ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg"))
        );
    }

    #[test]
    fn dump_config_format_is_optional() {
        let args =
            CliArgs::try_parse_from(["x265-convert", "-d", ".", "--dump-config"]).unwrap();
        assert!(matches!(args.app.dump_config, Some(None)));

        let args =
            CliArgs::try_parse_from(["x265-convert", "-d", ".", "--dump-config", "JSON"]).unwrap();
        assert!(matches!(args.app.dump_config, Some(Some(DumpType::Json))));
    }
}
