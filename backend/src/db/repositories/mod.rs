//! Repository implementations module.
//!
//! - `local`: In-memory implementation for unit testing, local development and the server
//! - `remote`: HTTP client for a store served by `timetabler-server`
pub mod local;
#[cfg(feature = "remote-repo")]
pub mod remote;

pub use local::LocalRepository;
#[cfg(feature = "remote-repo")]
pub use remote::RemoteRepository;
