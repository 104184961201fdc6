use crate::src_loc::SrcLoc;
use hdl_util::io::IoErrorWithPath;

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum BuildErrorKind {
    /// A construct was used outside of the construct that must enclose it.
    #[strum(serialize = "scoping")]
    Scoping,
    /// Duplicate or missing names: submodules, clock domains, state machine states.
    #[strum(serialize = "naming")]
    Naming,
    /// Malformed or mismatched switch case patterns.
    #[strum(serialize = "pattern")]
    Pattern,
    /// A signal driven from more than one domain.
    #[strum(serialize = "driver conflict")]
    DriverConflict,
}

/// Fatal error in the description of the hardware.
/// The construct that caused it is abandoned, previously completed constructs stay valid.
#[must_use]
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("{kind} error at {src_loc}: {message}")]
pub struct BuildError {
    pub kind: BuildErrorKind,
    pub message: String,
    pub src_loc: SrcLoc,
}

pub type BuildResult<T> = Result<T, BuildError>;

impl BuildError {
    pub fn new(kind: BuildErrorKind, message: impl Into<String>, src_loc: SrcLoc) -> BuildError {
        BuildError {
            kind,
            message: message.into(),
            src_loc,
        }
    }

    pub fn scoping(message: impl Into<String>, src_loc: SrcLoc) -> BuildError {
        BuildError::new(BuildErrorKind::Scoping, message, src_loc)
    }

    pub fn naming(message: impl Into<String>, src_loc: SrcLoc) -> BuildError {
        BuildError::new(BuildErrorKind::Naming, message, src_loc)
    }

    pub fn pattern(message: impl Into<String>, src_loc: SrcLoc) -> BuildError {
        BuildError::new(BuildErrorKind::Pattern, message, src_loc)
    }

    pub fn driver_conflict(message: impl Into<String>, src_loc: SrcLoc) -> BuildError {
        BuildError::new(BuildErrorKind::DriverConflict, message, src_loc)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Io(#[from] IoErrorWithPath),
    #[error("invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),
}
