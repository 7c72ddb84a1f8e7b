//! IPv4 address lookup for a named interface.

use std::net::{IpAddr, Ipv4Addr};

use pnet::datalink::{self, NetworkInterface};

use crate::{Error, Result};

/// Query the OS interface table for the IPv4 address bound to `name`.
pub fn local_ipv4(name: &str) -> Result<Ipv4Addr> {
    lookup(&datalink::interfaces(), name)
}

fn lookup(interfaces: &[NetworkInterface], name: &str) -> Result<Ipv4Addr> {
    let iface = interfaces
        .iter()
        .find(|iface| iface.name == name)
        .ok_or_else(|| Error::InterfaceNotFound(name.to_owned()))?;

    iface
        .ips
        .iter()
        .find_map(|net| match net.ip() {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| Error::NoAddressBound(name.to_owned()))
}
