//! Reverse (PTR) zone rendering, one zone file per merged range group.

use crate::error::ZoneError;
use crate::forward::soa_header;
use crate::model::ZoneData;
use crate::range::RangeGroup;
use crate::serial::ZoneSerial;

/// Column width for the PTR fragment field.
const FRAGMENT_COLUMN: usize = 7;

/// A rendered reverse zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseZone {
    /// Dotted base address of the group's network; the on-disk file is
    /// `db_<key>`. Collides for equal base addresses with different prefix
    /// lengths (kept behavior, see DESIGN.md).
    pub key: String,
    /// `in-addr.arpa` origin handed to the zone checker.
    pub origin: String,
    pub text: String,
}

/// Render the reverse zone for one merged range group.
///
/// The SOA header and the single NS line use the group's first extension in
/// tag-accumulation order. Every host whose `ip_type` matches any extension
/// in the group gets a PTR line mapping its address fragment to
/// `domain + extension + "."`.
pub fn render_reverse(
    group: &RangeGroup,
    data: &ZoneData,
    serial: &ZoneSerial,
) -> Result<ReverseZone, ZoneError> {
    let lead = group.leading_extension()?;
    let zone = data
        .zone_meta(&lead.extension)
        .ok_or_else(|| ZoneError::MissingZoneMeta(lead.extension.clone()))?;

    let mut text = soa_header(&lead.extension, zone, serial);
    text.push('\n');
    text.push_str(&format!("@       IN  NS      ns{}.\n", lead.extension));
    text.push('\n');

    for host in &data.hosts {
        let matches = group
            .extensions
            .iter()
            .any(|e| e.ip_type == host.ipv4.ip_type);
        if !matches {
            continue;
        }
        let fragment = ptr_fragment(group.network.prefix(), &host.ipv4.ipv4);
        text.push_str(&format!(
            "{:<width$} IN  PTR     {}{}.\n",
            fragment,
            host.domain,
            host.extension,
            width = FRAGMENT_COLUMN
        ));
    }

    Ok(ReverseZone {
        key: group.key(),
        origin: reverse_origin(group),
        text,
    })
}

/// Octets of a host address that remain inside a reverse zone of the given
/// prefix length, least significant first. A `/32` zone names the host
/// itself, so the fragment is empty; the `/0` fallback keeps all four
/// octets.
pub fn ptr_fragment(prefix: u8, ipv4: &str) -> String {
    let keep = match prefix {
        32 => 0,
        24..=31 => 1,
        16..=23 => 2,
        8..=15 => 3,
        _ => 4,
    };
    let mut octets: Vec<&str> = ipv4.split('.').rev().collect();
    octets.truncate(keep);
    octets.join(".")
}

/// `in-addr.arpa` origin for a group, derived from the network base address
/// with the octets covered by the prefix reversed. A `/32` keeps the full
/// unreversed address (kept behavior from the original layout).
pub fn reverse_origin(group: &RangeGroup) -> String {
    let octets = group.network.network().octets();
    let fragment = match group.network.prefix() {
        32 => format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3]),
        24..=31 => format!("{}.{}.{}", octets[2], octets[1], octets[0]),
        16..=23 => format!("{}.{}", octets[1], octets[0]),
        _ => format!("{}", octets[0]),
    };
    format!("{fragment}.in-addr.arpa")
}
