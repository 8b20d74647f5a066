use crate::error::{Error, Result};
use if_addrs::{get_if_addrs, IfAddr};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::collections::HashSet;
use std::io;
use std::net::{IpAddr, Ipv4Addr};

/// Parse a target range descriptor into an IP network.
///
/// Accepts CIDR notation with host bits tolerated (`192.168.1.5/24` becomes
/// `192.168.1.0/24`) or a bare address, which is treated as its full-length
/// prefix.
pub fn parse_target(descriptor: &str) -> Result<IpNet> {
    let text = descriptor.trim();
    if let Ok(net) = text.parse::<IpNet>() {
        return Ok(net.trunc());
    }
    match text.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => Ok(IpNet::V4(
            Ipv4Net::new(v4, 32).expect("/32 is always valid"),
        )),
        Ok(IpAddr::V6(v6)) => Ok(IpNet::V6(
            Ipv6Net::new(v6, 128).expect("/128 is always valid"),
        )),
        Err(_) => Err(Error::InvalidRange(descriptor.to_string())),
    }
}

/// Expand a network into its ordered usable host addresses.
///
/// Network and broadcast addresses are excluded for standard IPv4 subnets;
/// /31 and /32 keep every address, per conventional CIDR host semantics.
pub fn expand_hosts(net: &IpNet) -> Vec<IpAddr> {
    net.hosts().collect()
}

/// Detect local non-loopback IPv4 addresses and convert each to a default /24
/// network. Duplicates are removed and the result is sorted for stable output.
pub fn detect_local_networks() -> io::Result<Vec<IpNet>> {
    let mut set = HashSet::<Ipv4Net>::new();
    for iface in get_if_addrs()? {
        if let IfAddr::V4(v4) = iface.addr {
            let ip = v4.ip;
            if ip.is_loopback() {
                continue;
            }
            set.insert(default_ipv4_net(ip));
        }
    }
    let mut nets: Vec<IpNet> = set.into_iter().map(IpNet::V4).collect();
    nets.sort_by_key(|n| match n {
        IpNet::V4(n4) => (u32::from(n4.network()), n4.prefix_len()),
        IpNet::V6(_) => (0, 0),
    });
    Ok(nets)
}

/// Helper: convert an IPv4 address into its default /24 network.
pub fn default_ipv4_net(ip: Ipv4Addr) -> Ipv4Net {
    let o = ip.octets();
    let net = Ipv4Addr::new(o[0], o[1], o[2], 0);
    Ipv4Net::new(net, 24).expect("/24 is always valid")
}
