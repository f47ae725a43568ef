use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub use log::{debug, error, info, trace, warn, LevelFilter};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use sanitize_filename::sanitize_with_options;

const CONSOLE_PATTERN: &str = "{h({l:<5})} {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} [{M}] {m}{n}";

/// The log file always records everything down to debug.
const FILE_LEVEL: LevelFilter = LevelFilter::Debug;

/// Where one run logs to and how much of it reaches the console.
#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig<'a> {
    program_name: &'a str,
    run_name: Option<&'a str>,
    console_level: LevelFilter,
}

impl Default for LoggerConfig<'_> {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

impl<'a> LoggerConfig<'a> {
    #[must_use]
    pub const fn new(program_name: &'a str) -> Self {
        Self {
            program_name,
            run_name: None,
            console_level: LevelFilter::Info,
        }
    }

    /// Gives the log file of this run its own name, e.g. the converted directory's.
    /// An empty name is ignored.
    #[must_use]
    pub fn run_name(mut self, run_name: &'a str) -> Self {
        self.run_name = Some(run_name).filter(|name| !name.is_empty());
        self
    }

    #[must_use]
    pub const fn console_level(mut self, level: LevelFilter) -> Self {
        self.console_level = level;
        self
    }

    /// `<temp dir>/<program>[_<run>].log`
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        env::temp_dir().join(self.log_file_name())
    }

    fn log_file_name(&self) -> String {
        let file_name = match self.run_name {
            Some(run) => format!("{}_{run}.log", self.program_name),
            None => format!("{}.log", self.program_name),
        };

        sanitize_with_options(
            file_name,
            sanitize_filename::Options {
                truncate: true,
                replacement: "^",
                ..Default::default()
            },
        )
    }
}

/// Sets up logging to stdout and to a per-run file in the temp directory.
///
/// Returns the handle together with the path of the log file.
pub fn init(cfg: LoggerConfig) -> anyhow::Result<(log4rs::Handle, PathBuf)> {
    let log_file = cfg.log_file();
    let config = build_config(&cfg, &log_file)?;
    let handle = log4rs::init_config(config)?;

    debug!("Logging to {:?}", &log_file);

    Ok((handle, log_file))
}

fn build_config(cfg: &LoggerConfig, log_file: &Path) -> anyhow::Result<Config> {
    let parent = log_file.parent().ok_or_else(|| {
        anyhow::anyhow!("Failed to get parent directory of log file path: {log_file:?}")
    })?;
    fs::create_dir_all(parent)?;

    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(log_file)?;
    let console = ConsoleAppender::builder()
        .target(Target::Stdout)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(FILE_LEVEL)))
                .build("logfile", Box::new(file)),
        )
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(cfg.console_level)))
                .build("stdout", Box::new(console)),
        )
        .build(
            Root::builder()
                .appender("logfile")
                .appender("stdout")
                .build(LevelFilter::Trace),
        )?;

    Ok(config)
}
