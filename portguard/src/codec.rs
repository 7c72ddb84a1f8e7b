//! Encoding of the local address into the kernel-side config record.

use std::net::Ipv4Addr;

use crate::{Error, Result};

/// Reinterpret the four octets of `addr` as a little-endian `u32`.
///
/// The octets stay in network order; the first octet lands in the least
/// significant byte. The kernel program compares this value against
/// addresses read straight out of packet headers, so the exact bit
/// pattern matters.
pub fn encode_local_address(addr: Ipv4Addr) -> u32 {
    u32::from_le_bytes(addr.octets())
}

/// Parse a dotted-quad string and encode it.
pub fn encode_dotted_quad(addr: &str) -> Result<u32> {
    addr.parse::<Ipv4Addr>()
        .map(encode_local_address)
        .map_err(|_| Error::MalformedAddress(addr.to_owned()))
}
