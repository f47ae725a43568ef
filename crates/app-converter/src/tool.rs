use std::{path::Path, time::Duration};

use crate::error::EncodeError;

/// The two external calls the driver depends on.
pub trait ExternalTool {
    /// Duration of the media at `path`, or `None` if it can't be determined.
    ///
    /// Must not modify the file.
    fn probe(&self, path: &Path) -> Option<Duration>;

    /// Encodes `source` into `dest`.
    ///
    /// `Ok` means `dest` now holds the complete output.
    fn encode(&self, source: &Path, dest: &Path) -> Result<(), EncodeError>;
}

impl<T: ExternalTool + ?Sized> ExternalTool for &T {
    fn probe(&self, path: &Path) -> Option<Duration> {
        (**self).probe(path)
    }

    fn encode(&self, source: &Path, dest: &Path) -> Result<(), EncodeError> {
        (**self).encode(source, dest)
    }
}
