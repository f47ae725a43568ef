use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, error, info, warn};
use scopeguard::{guard, ScopeGuard};

use crate::{
    error::{DriverError, EncodeError},
    source::{list_candidates, SourceFile},
    tool::ExternalTool,
};

/// What happened to a single source file.
#[derive(Debug)]
pub enum ConversionOutcome {
    /// No derived file existed and one was produced.
    Converted,
    /// The derived file looked complete and was left alone.
    SkippedExisting,
    /// The derived file was unreadable or too short, so it was produced again.
    ReplacedCorrupt,
    /// The source could not be probed, so the existing derived file was produced again.
    ProbeFailed,
    EncodeFailed(EncodeError),
}

impl ConversionOutcome {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::EncodeFailed(_))
    }

    /// Whether the encoder produced a new file for this outcome.
    #[must_use]
    pub const fn encoded(&self) -> bool {
        matches!(
            self,
            Self::Converted | Self::ReplacedCorrupt | Self::ProbeFailed
        )
    }
}

impl fmt::Display for ConversionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converted => write!(f, "converted"),
            Self::SkippedExisting => write!(f, "skipped, already converted"),
            Self::ReplacedCorrupt => write!(f, "replaced corrupted output"),
            Self::ProbeFailed => write!(f, "re-encoded, source duration unknown"),
            Self::EncodeFailed(e) => write!(f, "failed: {e}"),
        }
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub derived: PathBuf,
    pub outcome: ConversionOutcome,
}

/// Results of one pass over a directory, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    fn count(&self, pred: impl Fn(&ConversionOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    #[must_use]
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::Converted))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::SkippedExisting))
    }

    #[must_use]
    pub fn replaced(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::ReplacedCorrupt))
    }

    #[must_use]
    pub fn probe_failed(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::ProbeFailed))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(ConversionOutcome::is_failure)
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.files.iter().any(|f| f.outcome.is_failure())
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{total} file(s): {converted} converted, {replaced} replaced, {probe_failed} re-encoded \
             without source duration, {skipped} skipped, {failed} failed",
            total = self.files.len(),
            converted = self.converted(),
            replaced = self.replaced(),
            probe_failed = self.probe_failed(),
            skipped = self.skipped(),
            failed = self.failed(),
        )
    }
}

/// Verdict on a derived file that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    Complete,
    Truncated { source: Duration, derived: Duration },
    DerivedUnreadable,
    SourceUnreadable,
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "duration matches or exceeds original"),
            Self::Truncated { source, derived } => write!(
                f,
                "duration {:.2}s is shorter than the original {:.2}s",
                derived.as_secs_f64(),
                source.as_secs_f64()
            ),
            Self::DerivedUnreadable => write!(f, "duration could not be read"),
            Self::SourceUnreadable => write!(f, "duration of the original could not be read"),
        }
    }
}

/// Decides whether an existing derived file can be kept.
///
/// A derived file shorter than its source is taken as the leftover of an
/// interrupted encode. This is a heuristic: an encode that legitimately drops
/// trailing frames is also treated as corrupt.
#[must_use]
pub fn assess_existing(source: Option<Duration>, derived: Option<Duration>) -> Assessment {
    match (source, derived) {
        (_, None) => Assessment::DerivedUnreadable,
        (None, Some(_)) => Assessment::SourceUnreadable,
        (Some(source), Some(derived)) if derived < source => {
            Assessment::Truncated { source, derived }
        }
        (Some(_), Some(_)) => Assessment::Complete,
    }
}

/// Brings one source file to the state where it has a complete derived file.
///
/// Never fails: every error ends up in the returned report.
pub fn convert_file<T: ExternalTool + ?Sized>(tool: &T, source: &SourceFile) -> FileReport {
    let derived = source.derived_path();
    let outcome = resolve(tool, source, &derived);

    FileReport {
        source: source.path.clone(),
        derived,
        outcome,
    }
}

fn resolve<T: ExternalTool + ?Sized>(
    tool: &T,
    source: &SourceFile,
    derived: &Path,
) -> ConversionOutcome {
    let mut replaced = None;

    if derived.exists() {
        let assessment = assess_existing(tool.probe(&source.path), tool.probe(derived));

        if assessment == Assessment::Complete {
            info!("Skipping: {derived:?} ({assessment})");
            return ConversionOutcome::SkippedExisting;
        }

        warn!("Removing corrupted file: {derived:?} ({assessment})");
        if let Err(e) = fs::remove_file(derived) {
            let e = EncodeError::RemoveStale {
                path: derived.to_path_buf(),
                source: e,
            };
            error!("Error processing {:?}: {e}", source.file_name());
            return ConversionOutcome::EncodeFailed(e);
        }

        replaced = Some(assessment);
    }

    info!(
        "Processing: {:?} -> {:?}",
        source.file_name(),
        derived.file_name().unwrap_or_default()
    );

    if let Err(e) = encode_or_clean_up(tool, &source.path, derived) {
        error!("Error processing {:?}: {e}", source.file_name());
        return ConversionOutcome::EncodeFailed(e);
    }

    if let Err(e) = source.times.apply_to(derived) {
        warn!("Failed to copy file times of {:?} to {derived:?}: {e}", source.path);
    }

    match replaced {
        None => ConversionOutcome::Converted,
        Some(Assessment::SourceUnreadable) => ConversionOutcome::ProbeFailed,
        Some(_) => ConversionOutcome::ReplacedCorrupt,
    }
}

/// Runs the encoder and deletes whatever it left at `dest` if it failed.
fn encode_or_clean_up<T: ExternalTool + ?Sized>(
    tool: &T,
    source: &Path,
    dest: &Path,
) -> Result<(), EncodeError> {
    let partial = guard(dest, |dest| {
        if dest.exists() {
            debug!("Deleting partial output {dest:?}");
            if let Err(e) = fs::remove_file(dest) {
                warn!("Failed to delete partial output {dest:?}: {e}");
            }
        }
    });

    tool.encode(source, dest)?;

    ScopeGuard::into_inner(partial);
    Ok(())
}

/// Converts every eligible file in `directory`, one after the other.
///
/// Only a missing or unreadable directory is an error. Per-file problems are
/// recorded in the returned [`BatchReport`].
pub fn convert_directory<T: ExternalTool + ?Sized>(
    directory: &Path,
    extensions: &[String],
    tool: &T,
) -> Result<BatchReport, DriverError> {
    let candidates = list_candidates(directory, extensions)?;
    info!(
        "Found {} file(s) to check in {directory:?}",
        candidates.len()
    );

    let total = candidates.len();
    let mut report = BatchReport::default();
    for (i, source) in candidates.iter().enumerate() {
        debug!("[{}/{total}] Checking {:?}", i + 1, source.path);

        let file_report = convert_file(tool, source);
        debug!("{:?}: {}", source.file_name(), file_report.outcome);

        report.files.push(file_report);
    }

    Ok(report)
}
