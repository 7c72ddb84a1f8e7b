//! User-space control plane for the precompiled XDP filter program.

pub mod attach;
pub mod codec;
pub mod error;
pub mod lifecycle;
pub mod loader;
pub mod publish;
pub mod resolver;
pub mod trace;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
