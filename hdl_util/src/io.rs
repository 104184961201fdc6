use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::{fs, io};

#[derive(Debug)]
pub struct IoErrorWithPath {
    pub error: io::Error,
    pub path: PathBuf,
}

impl Display for IoErrorWithPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "io error for path {:?}: {}", self.path, self.error)
    }
}

impl std::error::Error for IoErrorWithPath {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub trait IoErrorExt {
    fn with_path(self, path: PathBuf) -> IoErrorWithPath;
}

impl IoErrorExt for io::Error {
    fn with_path(self, path: PathBuf) -> IoErrorWithPath {
        IoErrorWithPath { error: self, path }
    }
}

pub fn read_to_string(path: &Path) -> Result<String, IoErrorWithPath> {
    fs::read_to_string(path).map_err(|e| e.with_path(path.to_owned()))
}
