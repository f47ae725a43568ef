use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    process::exit,
};

use anyhow::{anyhow, bail};
use clap::Parser;
use cli::{CliArgs, DumpType};
use directories::ProjectDirs;
use file::FileConfiguration;
use lazy_static::lazy_static;
use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use which::which;

pub use common::{EncoderConfig, FileMatchConfig, ProgramPathConfig};

mod cli;
mod common;
mod file;

pub static APPLICATION_NAME: &str = "x265-convert";
pub static ORGANIZATION_NAME: &str = "allypost";
pub static ORGANIZATION_QUALIFIER: &str = "net";

lazy_static! {
    pub static ref CONFIG: Config = Config::new();
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub app: AppConfig,

    #[serde(skip)]
    pub run: RunConfig,

    pub dependencies: ProgramPathConfig,

    pub encoder: EncoderConfig,

    pub files: FileMatchConfig,
}

impl Config {
    #[must_use]
    pub fn get_config_dir() -> Option<PathBuf> {
        Self::get_project_dir().map(|x| x.config_dir().into())
    }

    fn get_project_dir() -> Option<ProjectDirs> {
        ProjectDirs::from(ORGANIZATION_QUALIFIER, ORGANIZATION_NAME, APPLICATION_NAME)
    }

    /// Path of the ffmpeg binary, resolved while loading the configuration.
    #[must_use]
    pub fn ffmpeg_path(&self) -> PathBuf {
        self.dependencies.ffmpeg_path.clone().unwrap_or_default()
    }

    /// Path of the ffprobe binary, resolved while loading the configuration.
    #[must_use]
    pub fn ffprobe_path(&self) -> PathBuf {
        self.dependencies.ffprobe_path.clone().unwrap_or_default()
    }

    fn new() -> Self {
        let args = CliArgs::parse();

        Self::from_args(&args).unwrap_or_else(|e| {
            eprintln!("Failed to load configuration: {e:#}");
            exit(1);
        })
    }

    fn from_args(args: &CliArgs) -> anyhow::Result<Self> {
        let mut config = Self::default();
        let directory = target_directory(&args.app.directory)?;
        let (file_config, config_path) =
            FileConfiguration::new(args.app.config_path.as_deref())?;

        config.app.config_path = config_path;
        config.merge_file_config(&file_config);
        config.merge_args(args);

        {
            if config.dependencies.ffmpeg_path.is_none() {
                config.dependencies.ffmpeg_path =
                    Some(which("ffmpeg").map_err(|e| anyhow!("ffmpeg not found: {}", e))?);
            }

            if config.dependencies.ffprobe_path.is_none() {
                config.dependencies.ffprobe_path =
                    Some(which("ffprobe").map_err(|e| anyhow!("ffprobe not found: {}", e))?);
            }
        }

        config.run.directory = directory;

        if let Some(dump_type) = &args.app.dump_config {
            match dump_type.as_ref().unwrap_or(&DumpType::Toml) {
                DumpType::Toml => {
                    println!("{}", toml::to_string_pretty(&config)?);
                }

                DumpType::Json => {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
            }
            exit(0);
        }

        Ok(config)
    }

    fn merge_args(&mut self, args: &CliArgs) -> &Self {
        args.merge_into_config(self);

        self
    }

    fn merge_file_config(&mut self, file_config: &FileConfiguration) -> &Self {
        file_config.merge_into_config(self);

        self
    }
}

/// Expands `~` and makes the path absolute. Falls back to the path as given.
fn resolve_directory(directory: &Path) -> anyhow::Result<PathBuf> {
    if directory.as_os_str().is_empty() {
        bail!("The directory to convert must not be empty");
    }

    Ok(directory
        .try_resolve()
        .map_or_else(|_| directory.to_path_buf(), Cow::into_owned))
}

/// Checked before anything is written, the config file included.
fn target_directory(directory: &Path) -> anyhow::Result<PathBuf> {
    let directory = resolve_directory(directory)?;

    if !directory.is_dir() {
        bail!("{directory:?} does not exist or is not a directory");
    }

    Ok(directory)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// The directory whose videos get converted.
    pub directory: PathBuf,
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn resolves_relative_directory_against_cwd() {
        let resolved = resolve_directory(Path::new("videos")).unwrap();

        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("videos"));
    }

    #[test]
    fn keeps_absolute_directory() {
        let resolved = resolve_directory(Path::new("/srv/videos")).unwrap();

        assert_eq!(resolved, PathBuf::from("/srv/videos"));
    }

    #[test]
    fn explicit_tool_paths_skip_path_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[dependencies]\nffmpeg_path = \"/opt/ffmpeg\"\nffprobe_path = \"/opt/ffprobe\"\n",
        )
        .unwrap();

        let args = CliArgs::try_parse_from([
            OsString::from("x265-convert"),
            OsString::from("-d"),
            dir.path().as_os_str().to_owned(),
            OsString::from("-c"),
            config_path.as_os_str().to_owned(),
            OsString::from("--crf"),
            OsString::from("30"),
        ])
        .unwrap();

        let config = Config::from_args(&args).unwrap();

        assert_eq!(config.ffmpeg_path(), PathBuf::from("/opt/ffmpeg"));
        assert_eq!(config.ffprobe_path(), PathBuf::from("/opt/ffprobe"));
        assert_eq!(config.encoder.crf(), Some(30));
        assert_eq!(config.app.config_path, config_path);
        assert_eq!(config.run.directory, dir.path());
    }

    #[test]
    fn empty_directory_is_rejected() {
        let err = resolve_directory(Path::new("")).unwrap_err();

        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn missing_directory_fails_before_reading_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let config_path = dir.path().join("config.toml");

        let args = CliArgs::try_parse_from([
            OsString::from("x265-convert"),
            OsString::from("-d"),
            missing.as_os_str().to_owned(),
            OsString::from("-c"),
            config_path.as_os_str().to_owned(),
        ])
        .unwrap();

        let err = Config::from_args(&args).unwrap_err();

        assert!(err.to_string().contains("is not a directory"));
        assert!(!missing.exists());
        assert!(!config_path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn empty_directory_argument_fails_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = CliArgs::try_parse_from([
            OsString::from("x265-convert"),
            OsString::from("-d"),
            dir.path().as_os_str().to_owned(),
        ])
        .unwrap();
        args.app.directory = PathBuf::new();

        let err = Config::from_args(&args).unwrap_err();

        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn file_is_not_a_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, b"video").unwrap();

        assert!(target_directory(&file).is_err());
        assert_eq!(target_directory(dir.path()).unwrap(), dir.path());
    }
}
