//
// Helix — stable identifiers used across the topology, path, and
// protection layers (§3 Data Model).
//

use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// A switch's OpenFlow datapath identifier.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[derive(Deserialize, Serialize)]
pub struct Dpid(pub u64);

impl fmt::Display for Dpid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for Dpid {
    fn from(value: u64) -> Self {
        Dpid(value)
    }
}

/// An OpenFlow port number on a switch.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[derive(Deserialize, Serialize)]
pub struct PortNo(pub u32);

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PortNo {
    fn from(value: u32) -> Self {
        PortNo(value)
    }
}

/// A host's identity: its MAC address paired with its IPv4 address.
///
/// Hosts are not switches: they have no DPID and are reached only through
/// the access port of their first-hop switch.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct HostId {
    pub mac: MacAddr,
    pub ip: Ipv4Addr,
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.ip, self.mac)
    }
}

/// A 48-bit MAC address.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[derive(Deserialize, Serialize)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// A deterministic candidate identifier derived from a host pair (§3).
///
/// Using the same derivation on every controller guarantees that the same
/// (src, dst) pair always yields the same gid, independent of discovery
/// order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Gid(pub u64);

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gid-{:016x}", self.0)
    }
}

impl Gid {
    /// Derives the gid for an ordered (src, dst) host pair.
    ///
    /// FNV-1a is used instead of `std`'s default (randomly-seeded)
    /// `HashMap` hasher precisely because the result must be identical
    /// across processes and across runs.
    pub fn for_pair(src: HostId, dst: HostId) -> Gid {
        let mut hasher = Fnv1a::new();
        src.hash(&mut hasher);
        dst.hash(&mut hasher);
        Gid(hasher.finish())
    }
}

struct Fnv1a(u64);

impl Fnv1a {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Fnv1a(Self::OFFSET)
    }
}

impl Hasher for Fnv1a {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }
}
