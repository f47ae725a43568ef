use std::{
    ffi::{OsStr, OsString},
    fs, io,
    path::{Path, PathBuf},
};

use app_helpers::file_times::FileTimes;
use log::{trace, warn};

use crate::error::DriverError;

/// Appended to the stem of every file the encoder produces.
pub const DERIVED_SUFFIX: &str = "_X265";

/// A video found in the target directory, as it was when it was listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub stem: OsString,
    /// Extension as written on disk, without the dot.
    pub extension: String,
    pub times: FileTimes,
}

impl SourceFile {
    pub fn observe<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();

        let stem = path.file_stem().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("{path:?} has no file name"))
        })?;
        let extension = extension_of(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("{path:?} has no extension"))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            stem: stem.to_os_string(),
            extension: extension.to_string(),
            times: FileTimes::of(path)?,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or(self.path.as_os_str())
    }

    /// Where the converted copy of this file lives.
    #[must_use]
    pub fn derived_path(&self) -> PathBuf {
        derived_path_from(&self.path, &self.stem, &self.extension)
    }
}

/// `dir/clip.MP4` becomes `dir/clip_X265.MP4`.
///
/// The extension keeps its case, so `clip.MP4` and `clip.mp4` never share an output.
#[must_use]
pub fn derived_path(source: &Path) -> Option<PathBuf> {
    let stem = source.file_stem()?;
    let extension = extension_of(source)?;

    Some(derived_path_from(source, stem, extension))
}

fn derived_path_from(source: &Path, stem: &OsStr, extension: &str) -> PathBuf {
    let mut file_name = stem.to_os_string();
    file_name.push(DERIVED_SUFFIX);
    file_name.push(".");
    file_name.push(extension);

    source.with_file_name(file_name)
}

/// Whether the file name already marks this as encoder output.
#[must_use]
pub fn is_derived(path: &Path) -> bool {
    path.file_stem()
        .is_some_and(|stem| stem.to_string_lossy().ends_with(DERIVED_SUFFIX))
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension()
        .and_then(OsStr::to_str)
        .filter(|ext| !ext.is_empty())
}

fn has_wanted_extension(path: &Path, extensions: &[String]) -> bool {
    extension_of(path).is_some_and(|ext| {
        extensions
            .iter()
            .any(|wanted| wanted.eq_ignore_ascii_case(ext))
    })
}

/// Lists the files in `directory` that should have a derived copy, sorted by path.
///
/// `extensions` are matched ignoring ASCII case and without the leading dot.
pub fn list_candidates(
    directory: &Path,
    extensions: &[String],
) -> Result<Vec<SourceFile>, DriverError> {
    if !directory.is_dir() {
        return Err(DriverError::NotADirectory(directory.to_path_buf()));
    }

    let entries = fs::read_dir(directory).map_err(|source| DriverError::ReadDirectory {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut candidates = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Failed to read an entry of {directory:?}: {e}");
                None
            }
        })
        .filter(|path| path.is_file())
        .filter(|path| has_wanted_extension(path, extensions))
        .filter(|path| {
            let derived = is_derived(path);
            if derived {
                trace!("Ignoring {path:?}, it is already a converted file");
            }
            !derived
        })
        .filter_map(|path| match SourceFile::observe(&path) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!("Failed to read {path:?}: {e}");
                None
            }
        })
        .collect::<Vec<_>>();

    candidates.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp4() -> Vec<String> {
        vec!["mp4".to_string()]
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"video").unwrap();
        path
    }

    #[test]
    fn derived_name_keeps_stem_and_extension_case() {
        assert_eq!(
            derived_path(Path::new("/videos/clip.mp4")),
            Some(PathBuf::from("/videos/clip_X265.mp4"))
        );
        assert_eq!(
            derived_path(Path::new("/videos/Holiday 2019.MP4")),
            Some(PathBuf::from("/videos/Holiday 2019_X265.MP4"))
        );
        assert_eq!(
            derived_path(Path::new("a.b.c.mp4")),
            Some(PathBuf::from("a.b.c_X265.mp4"))
        );
    }

    #[test]
    fn derived_name_needs_an_extension() {
        assert_eq!(derived_path(Path::new("/videos/README")), None);
    }

    #[test]
    fn extension_case_variants_get_their_own_output() {
        let upper = derived_path(Path::new("/videos/clip.MP4")).unwrap();
        let lower = derived_path(Path::new("/videos/clip.mp4")).unwrap();

        assert_ne!(upper, lower);
        assert!(has_wanted_extension(Path::new("/videos/clip.MP4"), &mp4()));
        assert!(has_wanted_extension(Path::new("/videos/clip.Mp4"), &mp4()));
    }

    #[test]
    fn recognizes_derived_files() {
        assert!(is_derived(Path::new("clip_X265.mp4")));
        assert!(is_derived(Path::new("/a/b/clip_X265.MP4")));
        assert!(!is_derived(Path::new("clip.mp4")));
        assert!(!is_derived(Path::new("clip_x265.mp4")));
        assert!(!is_derived(Path::new("clip_X265_final.mp4")));
    }

    #[test]
    fn derived_path_of_derived_is_never_a_candidate_name() {
        let derived = derived_path(Path::new("clip.mp4")).unwrap();

        assert!(is_derived(&derived));
    }

    #[test]
    fn lists_only_matching_non_derived_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.mp4");
        touch(dir.path(), "a.MP4");
        touch(dir.path(), "a_X265.mp4");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "movie.mkv");
        fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let candidates = list_candidates(dir.path(), &mp4()).unwrap();
        let names = candidates
            .iter()
            .map(|c| c.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["a.MP4", "b.mp4"]);
        assert_eq!(candidates[0].extension, "MP4");
        assert_eq!(
            candidates[0].derived_path(),
            dir.path().join("a_X265.MP4")
        );
    }

    #[test]
    fn respects_configured_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "clip.mp4");
        touch(dir.path(), "movie.mkv");
        touch(dir.path(), "movie_X265.mkv");

        let candidates =
            list_candidates(dir.path(), &["mkv".to_string(), "mov".to_string()]).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path, dir.path().join("movie.mkv"));
    }

    #[test]
    fn does_not_descend_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested"), "clip.mp4");

        assert!(list_candidates(dir.path(), &mp4()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let err = list_candidates(&missing, &mp4()).unwrap_err();

        assert!(matches!(err, DriverError::NotADirectory(path) if path == missing));
    }

    #[test]
    fn file_instead_of_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "clip.mp4");

        assert!(matches!(
            list_candidates(&file, &mp4()),
            Err(DriverError::NotADirectory(_))
        ));
    }

    #[test]
    fn observing_captures_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "clip.mp4");
        let mtime = app_helpers::FileTime::from_unix_time(1_500_000_000, 0);
        filetime_set_mtime(&path, mtime);

        let source = SourceFile::observe(&path).unwrap();

        assert_eq!(source.times.modified, mtime);
        assert_eq!(source.stem, OsString::from("clip"));
    }

    fn filetime_set_mtime(path: &Path, mtime: app_helpers::FileTime) {
        let times = FileTimes::of(path).unwrap();
        FileTimes {
            accessed: times.accessed,
            modified: mtime,
        }
        .apply_to(path)
        .unwrap();
    }
}
