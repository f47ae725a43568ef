use std::process::ExitCode;

use app_config::{APPLICATION_NAME, CONFIG};
use app_converter::{convert_directory, BatchReport, DriverError, FfmpegTool};
use app_logger::{error, info, trace, warn, LevelFilter, LoggerConfig};

const EXIT_SUCCESS: u8 = 0;
/// Bad input or setup, nothing was processed.
const EXIT_FATAL: u8 = 1;
/// The run completed but at least one file could not be converted.
const EXIT_SOME_FAILED: u8 = 2;

fn main() -> ExitCode {
    let directory = CONFIG.run.directory.clone();

    let log_suffix = directory
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let logger_config = LoggerConfig::new(APPLICATION_NAME)
        .run_name(&log_suffix)
        .console_level(if cfg!(debug_assertions) {
            LevelFilter::Trace
        } else {
            LevelFilter::Info
        });

    let log_file = match app_logger::init(logger_config) {
        Ok((_handle, log_file)) => log_file,
        Err(e) => {
            eprintln!("Failed to initialize logger: {e:?}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    trace!("Config: {:?}", *CONFIG);

    let tool = FfmpegTool::from_config(&CONFIG);
    let extensions = CONFIG.files.extensions();

    info!("Converting {extensions:?} files in {directory:?}");

    let result = convert_directory(&directory, &extensions, &tool);

    match &result {
        Ok(report) => {
            info!("Done. {report}");

            if report.has_failures() {
                for file in report.files.iter().filter(|f| f.outcome.is_failure()) {
                    warn!("{:?}: {}", file.source, file.outcome);
                }
                info!("See {log_file:?} for details");
            }
        }
        Err(e) => error!("Error: {e}"),
    }

    ExitCode::from(exit_code(&result))
}

fn exit_code(result: &Result<BatchReport, DriverError>) -> u8 {
    match result {
        Err(_) => EXIT_FATAL,
        Ok(report) if report.has_failures() => EXIT_SOME_FAILED,
        Ok(_) => EXIT_SUCCESS,
    }
}
