use std::fmt::{Debug, Display, Formatter};
use std::panic::Location;

/// Location in the Rust source code that describes the hardware,
/// captured from the caller of the builder entry point through `#[track_caller]`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct SrcLoc {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl SrcLoc {
    #[track_caller]
    pub fn caller() -> SrcLoc {
        let location = Location::caller();
        SrcLoc {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl Display for SrcLoc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl Debug for SrcLoc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SrcLoc({})", self)
    }
}
