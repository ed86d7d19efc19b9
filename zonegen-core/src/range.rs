//! Partitioning of declared IPv4 ranges into reverse-zone groups.
//!
//! Each extension declares a `[start, stop]` range. A range is classified
//! into the smallest canonical network that covers it (`/32`, `/24`, `/16`,
//! `/8`, falling back to `0.0.0.0/0`), then overlapping and nested networks
//! are merged so every extension ends up in exactly one group and groups are
//! pairwise disjoint. The final partition depends only on the set of ranges,
//! not on insertion order.

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::error::ZoneError;
use crate::model::Extension;

/// A reverse-zone grouping: one network plus every extension whose declared
/// range it subsumes, in tag-accumulation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeGroup {
    pub network: Ipv4Network,
    pub extensions: Vec<Extension>,
}

impl RangeGroup {
    /// Dotted base address of the group's network, identifying the reverse
    /// zone on disk. The prefix length is not part of the key, so two groups
    /// sharing a base address would collide (kept behavior, see DESIGN.md).
    pub fn key(&self) -> String {
        self.network.network().to_string()
    }

    /// The extension whose SOA parameters head the reverse zone.
    pub fn leading_extension(&self) -> Result<&Extension, ZoneError> {
        self.extensions
            .first()
            .ok_or_else(|| ZoneError::EmptyGroup(self.key()))
    }
}

/// Classify a declared range into the smallest canonical network: `/32` when
/// the endpoints are equal, otherwise the widest shared-octet prefix, with
/// `0.0.0.0/0` when not even the first octet agrees.
pub fn network_for_range(start: &str, stop: &str) -> Result<Ipv4Network, ZoneError> {
    let a = parse_addr(start)?.octets();
    let b = parse_addr(stop)?.octets();

    if a == b {
        return canonical(a, 32);
    }
    if a[..3] == b[..3] {
        return canonical([a[0], a[1], a[2], 0], 24);
    }
    if a[..2] == b[..2] {
        return canonical([a[0], a[1], 0, 0], 16);
    }
    if a[0] == b[0] {
        return canonical([a[0], 0, 0, 0], 8);
    }
    canonical([0, 0, 0, 0], 0)
}

/// Merge each extension's network into the working set of groups.
///
/// Per existing group, scanned from newest to oldest: an existing network
/// equal to or inside the new one is absorbed into it; an existing network
/// containing the new one hands over its (wider) network and its tags; a
/// disjoint group is kept untouched. The merged group is appended last.
pub fn partition(extensions: &[Extension]) -> Result<Vec<RangeGroup>, ZoneError> {
    let mut groups: Vec<RangeGroup> = Vec::new();

    for extension in extensions {
        let network = network_for_range(&extension.domaine_ip_start, &extension.domaine_ip_stop)?;
        let mut merged = RangeGroup {
            network,
            extensions: vec![extension.clone()],
        };

        for k in (0..groups.len()).rev() {
            match overlap(groups[k].network, merged.network) {
                Overlap::ExistingInsideNew => {
                    merged.extensions.extend(groups.remove(k).extensions);
                }
                Overlap::NewInsideExisting => {
                    let absorbed = groups.remove(k);
                    merged.network = absorbed.network;
                    merged.extensions.extend(absorbed.extensions);
                }
                Overlap::Disjoint => {}
            }
        }

        groups.push(merged);
    }

    Ok(groups)
}

enum Overlap {
    ExistingInsideNew,
    NewInsideExisting,
    Disjoint,
}

fn overlap(existing: Ipv4Network, new: Ipv4Network) -> Overlap {
    if existing == new || is_subnet(existing, new) {
        Overlap::ExistingInsideNew
    } else if is_subnet(new, existing) {
        Overlap::NewInsideExisting
    } else {
        Overlap::Disjoint
    }
}

fn is_subnet(inner: Ipv4Network, outer: Ipv4Network) -> bool {
    outer.prefix() <= inner.prefix() && outer.contains(inner.network())
}

fn parse_addr(raw: &str) -> Result<Ipv4Addr, ZoneError> {
    raw.trim()
        .parse()
        .map_err(|_| ZoneError::InvalidAddress(raw.to_string()))
}

fn canonical(octets: [u8; 4], prefix: u8) -> Result<Ipv4Network, ZoneError> {
    Ipv4Network::new(Ipv4Addr::from(octets), prefix)
        .map_err(|_| ZoneError::InvalidAddress(format!("{}/{}", Ipv4Addr::from(octets), prefix)))
}
