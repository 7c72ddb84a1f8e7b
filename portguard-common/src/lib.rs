#![no_std]

/// Configuration record read by the XDP program, one instance at index 0
/// of its `config_map`.
///
/// `local_address` holds the interface's IPv4 address with the first octet
/// in the least significant byte, matching how the kernel side reads
/// addresses out of packet headers.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterConfig {
    pub local_address: u32,
}

#[cfg(feature = "user")]
unsafe impl aya::Pod for FilterConfig {}
