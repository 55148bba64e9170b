//! Error taxonomy and its mapping to POSIX errno at the FUSE boundary.

use thiserror::Error;

/// The error taxonomy described in the specification: every failure
/// reported by a storage call, cache operation, or VFS operation reduces
/// to one of these variants before crossing the FUSE boundary.
#[derive(Debug, Error)]
pub enum SwiftFsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not supported: {0}")]
    NotSupported(&'static str),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    #[error("storage throttled")]
    Throttled,

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SwiftFsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        SwiftFsError::NotFound(path.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        SwiftFsError::Io(msg.into())
    }
}

/// The single site in the crate that converts the taxonomy to an errno.
/// `fuse_adapter` is the only caller; no other module should reach for
/// `libc` error codes directly.
impl From<&SwiftFsError> for libc::c_int {
    fn from(err: &SwiftFsError) -> libc::c_int {
        match err {
            SwiftFsError::NotFound(_) => libc::ENOENT,
            SwiftFsError::NotSupported(_) => libc::ENOTSUP,
            SwiftFsError::NotEmpty(_) => libc::ENOTEMPTY,
            SwiftFsError::Throttled => libc::EAGAIN,
            SwiftFsError::Io(_) => libc::EIO,
            SwiftFsError::InvalidConfig(_) => libc::EINVAL,
        }
    }
}

impl From<SwiftFsError> for libc::c_int {
    fn from(err: SwiftFsError) -> libc::c_int {
        libc::c_int::from(&err)
    }
}

pub type Result<T> = std::result::Result<T, SwiftFsError>;
