pub mod driver;
pub mod error;
pub mod ffmpeg;
pub mod source;
pub mod tool;

pub use driver::{
    assess_existing, convert_directory, convert_file, Assessment, BatchReport, ConversionOutcome,
    FileReport,
};
pub use error::{DriverError, EncodeError};
pub use ffmpeg::FfmpegTool;
pub use source::{derived_path, is_derived, list_candidates, SourceFile, DERIVED_SUFFIX};
pub use tool::ExternalTool;
