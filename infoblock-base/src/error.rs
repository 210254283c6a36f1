// We want a few things here:
// 1. A way to create a new error with a backtrace
// 2. A way to centralize setting a breakpoint to trap any error in the system fairly soon
//    after it's created (or at least when it's propagated from a library we use back to us)
// 3. Same but for logging / emitting error messages into the tracing/logging system
// 4. A coarse kind, so a caller can tell a rejected record from a bug in the planner

use std::borrow::Cow;
use backtrace_error::DynBacktraceError;
use tracing::error;

#[cfg(test)]
use test_log::test;

/// What went wrong, coarsely. Only `Internal` indicates a bug; the others are
/// about the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Record text that could not be tokenized. The record is rejected.
    Parse,
    /// A header or catalogue declaration that could not be used.
    Schema,
    /// Accounting or bounds violation between planning and construction.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    inner: DynBacktraceError,
}
pub type Result<T> = std::result::Result<T, Error>;

struct SimpleErr(Cow<'static, str>);
impl std::fmt::Debug for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for SimpleErr {
    fn description(&self) -> &str {
        &self.0
    }
}

impl<E: std::error::Error + Send + Sync + 'static> From<E> for Error {
    fn from(err: E) -> Error {
        Error::new(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} error: {:?}", self.kind, self.inner)
    }
}

impl Error {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(err: E) -> Error {
        Error::with_kind(ErrorKind::Internal, err)
    }

    pub fn with_kind<E: std::error::Error + Send + Sync + 'static>(kind: ErrorKind, err: E) -> Error {
        error!(target: "infoblock", ?kind, "{:?}", err);
        let inner = DynBacktraceError::from(err);
        Error { kind, inner }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ErrorKind::Internal
    }
}

pub fn err(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::with_kind(ErrorKind::Internal, SimpleErr(msg.into()))
}

pub fn parse_err(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::with_kind(ErrorKind::Parse, SimpleErr(msg.into()))
}

pub fn schema_err(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::with_kind(ErrorKind::Schema, SimpleErr(msg.into()))
}

#[test]
fn test_error() {
    let e = err("test error");
    assert_eq!(e.kind(), ErrorKind::Internal);
    assert!(e.is_internal());
}

#[test]
fn test_error_kinds() {
    assert_eq!(parse_err("unterminated").kind(), ErrorKind::Parse);
    assert_eq!(schema_err("bad Number").kind(), ErrorKind::Schema);
    let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
    let e: Error = io.into();
    assert_eq!(e.kind(), ErrorKind::Internal);
    assert!(e.to_string().contains("boom"));
}
