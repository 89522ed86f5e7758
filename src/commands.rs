//! Command text issued inside emulated hosts.
//!
//! Only the address and route builders depend on the address family.

use crate::topology::AddressFamily;
use std::path::Path;

/// Global forwarding, issued first on every host.
pub const GLOBAL_FORWARDING: [&str; 3] = [
    "sysctl net.ipv4.ip_forward=1",
    "sysctl net.ipv6.conf.all.forwarding=1",
    "sysctl net.ipv6.conf.all.mc_forwarding=1",
];

/// IPv6 forwarding on the loopback interface.
pub const LOOPBACK_FORWARDING: [&str; 2] = [
    "sysctl net.ipv6.conf.lo.forwarding=1",
    "sysctl net.ipv6.conf.lo.mc_forwarding=1",
];

/// Per-interface forwarding: IPv6 unicast, IPv6 multicast, then IPv4.
pub fn interface_forwarding(iface: &str) -> [String; 3] {
    [
        format!("sysctl net.ipv6.conf.{}.forwarding=1", iface),
        format!("sysctl net.ipv6.conf.{}.mc_forwarding=1", iface),
        format!("sysctl net.ipv4.conf.{}.forwarding=1", iface),
    ]
}

pub fn add_address(family: AddressFamily, address: &str, iface: &str) -> String {
    match family {
        AddressFamily::Ipv4 => format!("ip addr add {} dev {}", address, iface),
        AddressFamily::Ipv6 => format!("ip -6 addr add {} dev {}", address, iface),
    }
}

pub fn add_route(family: AddressFamily, destination: &str, gateway: &str) -> String {
    match family {
        AddressFamily::Ipv4 => format!("ip route add {} via {}", destination, gateway),
        AddressFamily::Ipv6 => format!("ip -6 route add {} via {}", destination, gateway),
    }
}

pub fn start_capture(iface: &str, output: &Path) -> String {
    format!("tcpdump -i {} -w {}", iface, output.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_variants() {
        assert_eq!(
            add_address(AddressFamily::Ipv4, "10.0.0.5/30", "A-eth0"),
            "ip addr add 10.0.0.5/30 dev A-eth0"
        );
        assert_eq!(
            add_address(AddressFamily::Ipv6, "fc00::1/128", "lo"),
            "ip -6 addr add fc00::1/128 dev lo"
        );
    }

    #[test]
    fn test_route_variants() {
        assert_eq!(
            add_route(AddressFamily::Ipv4, "10.0.0.2/32", "10.0.0.6"),
            "ip route add 10.0.0.2/32 via 10.0.0.6"
        );
        assert_eq!(
            add_route(AddressFamily::Ipv6, "fc00::2/128", "fc00:12::2"),
            "ip -6 route add fc00::2/128 via fc00:12::2"
        );
    }

    #[test]
    fn test_interface_forwarding() {
        let cmds = interface_forwarding("1-eth0");
        assert_eq!(cmds[0], "sysctl net.ipv6.conf.1-eth0.forwarding=1");
        assert_eq!(cmds[2], "sysctl net.ipv4.conf.1-eth0.forwarding=1");
    }

    #[test]
    fn test_capture_command() {
        assert_eq!(
            start_capture("1-eth0", Path::new("pcaps/1-0.pcap")),
            "tcpdump -i 1-eth0 -w pcaps/1-0.pcap"
        );
    }
}
