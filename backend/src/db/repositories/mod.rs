//! Repository implementations module.
//!
//! - `local`: In-memory implementation for unit testing and local development
//! - `file`: The local repository plus a JSON snapshot on disk
pub mod file;
pub mod local;

pub use file::FileRepository;
pub use local::LocalRepository;
