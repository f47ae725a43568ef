use std::{fs::Metadata, io, path::Path};

use filetime::FileTime;
use log::trace;

/// Access and modification times of a file, captured at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub accessed: FileTime,
    pub modified: FileTime,
}

impl FileTimes {
    pub fn of<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        trace!("Getting file times of {path:?}");

        path.metadata().map(|meta| Self::from_metadata(&meta))
    }

    #[must_use]
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            accessed: FileTime::from_last_access_time(meta),
            modified: FileTime::from_last_modification_time(meta),
        }
    }

    pub fn apply_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        trace!("Setting file times of {path:?} to {self:?}");

        filetime::set_file_times(path, self.accessed, self.modified)
    }
}
