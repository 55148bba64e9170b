//! A FUSE filesystem exposing an OpenStack Swift / hubiC object storage
//! account as a POSIX directory tree: containers as top-level
//! directories, delimiter-scanned pseudo-directories, large objects
//! reassembled from Static Large Object manifests, and an in-process
//! Directory Cache standing in for a real inode table.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod fs;
pub mod fuse_adapter;
pub mod handle;
pub mod lister;
pub mod naming;
pub mod node;
pub mod pool;
pub mod storage;
pub mod truncate;
pub mod write_engine;

pub use error::{Result, SwiftFsError};
