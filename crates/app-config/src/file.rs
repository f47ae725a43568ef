use std::{
    fs,
    io::prelude::*,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};

use crate::{
    common::{EncoderConfig, FileMatchConfig, ProgramPathConfig},
    Config,
};

#[derive(Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileConfiguration {
    pub dependencies: Option<ProgramPathConfig>,

    pub encoder: Option<EncoderConfig>,

    pub files: Option<FileMatchConfig>,
}

impl FileConfiguration {
    pub(crate) fn new(config_path: Option<&Path>) -> anyhow::Result<(Self, PathBuf)> {
        let config_path = match config_path {
            Some(config_path) if !Self::is_default_config_path(config_path) => {
                config_path.to_path_buf()
            }
            _ => Self::create_default_config_file()?,
        };

        Self::load_from_file(&config_path).map(|config| (config, config_path))
    }

    pub(crate) fn merge_into_config(&self, config: &mut Config) {
        if let Some(dependencies) = &self.dependencies {
            if let Some(ffmpeg_path) = &dependencies.ffmpeg_path {
                eprintln!("Found ffmpeg path from config file: {ffmpeg_path:?}");
            }

            if let Some(ffprobe_path) = &dependencies.ffprobe_path {
                eprintln!("Found ffprobe path from config file: {ffprobe_path:?}");
            }

            config.dependencies.merge(dependencies);
        }

        if let Some(encoder) = &self.encoder {
            config.encoder.merge(encoder);
        }

        if let Some(files) = &self.files {
            config.files.merge(files);
        }
    }

    pub(crate) fn parse(contents: &str) -> anyhow::Result<Self> {
        toml::from_str::<Self>(contents).map_err(|e| anyhow!("Error parsing config file: {e}"))
    }

    fn load_from_file<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let p = path.as_ref();

        if !p.is_file() {
            bail!("Config file {:?} does not exist or is not a file", &p);
        }

        let config_file = fs::read_to_string(p)
            .with_context(|| format!("Failed to read config file {p:?}"))?;

        Self::parse(&config_file)
    }

    fn create_default_config_file() -> anyhow::Result<PathBuf> {
        let file = Self::default_config_path().ok_or_else(|| {
            anyhow!(
                "Failed to get config directory. Please pass a config file with --config-path \
                 or the X265_CONVERT_CONFIG environment variable"
            )
        })?;

        let config_dir: PathBuf = file
            .parent()
            .ok_or_else(|| {
                anyhow!(
                    "Failed to get parent directory of config file. Is the config file in root?"
                )
            })?
            .into();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        if !file.exists() {
            eprintln!("Config file not found. Creating one at {file:?}");
            let mut f = fs::File::create(&file);
            let res: Result<_, _> = f
                .as_mut()
                .map(|f| f.write_all(include_bytes!("./config.toml")));

            if let Err(e) = res {
                eprintln!("Failed to create config file: {e}");
                bail!("Failed to create config file: {}", e);
            }
        }

        Ok(file)
    }

    fn default_config_path() -> Option<PathBuf> {
        Config::get_config_dir().map(|x| x.join("config.toml"))
    }

    fn is_default_config_path<P>(path: P) -> bool
    where
        P: AsRef<Path>,
    {
        let p = path.as_ref().as_os_str();

        p.is_empty() || Self::default_config_path().is_some_and(|default| p == default.as_os_str())
    }
}
