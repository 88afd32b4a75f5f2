//! Captures saved as files in one directory.

use std::io;
use std::path::PathBuf;

use tracing::debug;

use crate::collector::traits::CaptureSource;
use crate::collector::{CaptureKind, CollectError};
use crate::sample::Sample;

/// Reads each capture from `<dir>/<CaptureKind::file_name>`.
///
/// A missing file is `Ok(None)` for optional captures and
/// [`CollectError::Missing`] for required ones.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CaptureSource for DirSource {
    fn capture(&mut self, kind: CaptureKind) -> Result<Option<Sample>, CollectError> {
        let path = self.dir.join(kind.file_name());
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(Sample::from_text(&text))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if kind.is_required() {
                    Err(CollectError::Missing(kind))
                } else {
                    debug!(path = %path.display(), "optional capture not present");
                    Ok(None)
                }
            }
            Err(e) => Err(CollectError::Io(e)),
        }
    }
}
