use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that stop a run before any file is touched.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{0:?} is not a valid directory")]
    NotADirectory(PathBuf),

    #[error("failed to read directory {path:?}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a fresh derived file could not be produced.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to launch the encoder: {0}")]
    Spawn(#[source] io::Error),

    #[error("encoder exited with {}", exit_code_display(.0))]
    Status(Option<i32>),

    #[error("encoder reported success but {0:?} was not created")]
    MissingOutput(PathBuf),

    #[error("failed to remove stale output {path:?}: {source}")]
    RemoveStale {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[allow(clippy::ref_option)]
fn exit_code_display(code: &Option<i32>) -> String {
    code.map_or_else(
        || "no exit code (killed by a signal)".to_string(),
        |code| format!("exit code {code}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_includes_exit_code() {
        assert_eq!(
            EncodeError::Status(Some(187)).to_string(),
            "encoder exited with exit code 187"
        );
        assert_eq!(
            EncodeError::Status(None).to_string(),
            "encoder exited with no exit code (killed by a signal)"
        );
    }
}
