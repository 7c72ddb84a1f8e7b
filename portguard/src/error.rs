//! Error taxonomy for the control plane.

use thiserror::Error;

/// Top-level error type. Every variant is fatal; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The OS interface table has no interface with the given name.
    #[error("interface not found: {0}")]
    InterfaceNotFound(String),

    /// The interface exists but has no IPv4 address bound.
    #[error("no IPv4 address bound to interface {0}")]
    NoAddressBound(String),

    /// Not four dot-separated octets 0-255.
    #[error("malformed IPv4 address: {0:?}")]
    MalformedAddress(String),

    /// The object file failed to parse or the kernel rejected it.
    #[error("failed to load XDP object: {0}")]
    Load(#[from] aya::EbpfError),

    #[error("program {0:?} not found in object file")]
    ProgramNotFound(&'static str),

    /// The entry point exists but is not an XDP program, or the kernel
    /// rejected its bytecode.
    #[error("failed to load XDP program into kernel: {0}")]
    ProgramLoad(#[source] aya::programs::ProgramError),

    #[error("map {0:?} not found in object file")]
    MapNotFound(&'static str),

    /// The config record write was rejected by the shared store.
    #[error("failed to write config record: {0}")]
    ConfigWrite(#[from] aya::maps::MapError),

    /// The interface rejected the XDP attachment.
    #[error("failed to attach XDP program: {0}")]
    Attach(#[source] aya::programs::ProgramError),

    #[error("failed to detach XDP program: {0}")]
    Detach(#[source] aya::programs::ProgramError),

    /// The trace channel could not be opened or read.
    #[error("trace channel error: {0}")]
    Trace(#[from] std::io::Error),
}
