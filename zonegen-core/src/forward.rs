//! Forward zone rendering, one zone file per extension.

use crate::error::ZoneError;
use crate::model::{ZoneData, ZoneMeta};
use crate::serial::ZoneSerial;

/// Column width for host name fields in A/AAAA lines.
const HOST_COLUMN: usize = 15;

/// Render the forward zone file for one extension.
///
/// Layout: `$TTL` and SOA header, the zone's own literal entry line, NS, MX,
/// TXT and SRV records, then per-host A records (each followed by the host's
/// AAAA records) and CNAME aliases. Sections are separated by blank lines
/// even when empty. NS and MX entries get a trailing dot appended when the
/// stored text does not already end with one; TXT and SRV entries are
/// emitted verbatim.
pub fn render_forward(
    extension: &str,
    data: &ZoneData,
    serial: &ZoneSerial,
) -> Result<String, ZoneError> {
    let zone = data
        .zone_meta(extension)
        .ok_or_else(|| ZoneError::MissingZoneMeta(extension.to_string()))?;

    let mut out = soa_header(extension, zone, serial);
    out.push('\n');

    out.push_str(&zone.zone_entry);
    out.push('\n');
    out.push('\n');

    for record in data.ns.iter().filter(|r| r.zone == extension) {
        push_dotted(&mut out, &record.ns_entry);
    }
    out.push('\n');

    for record in data.mx.iter().filter(|r| r.zone == extension) {
        push_dotted(&mut out, &record.mx_entry);
    }
    out.push('\n');

    for record in data.txt.iter().filter(|r| r.zone == extension) {
        out.push_str(&record.txt_entry);
        out.push('\n');
    }
    out.push('\n');

    for record in data.srv.iter().filter(|r| r.extension == extension) {
        out.push_str(&record.srv_entry);
        out.push('\n');
    }
    out.push('\n');

    for host in &data.hosts {
        if host.extension != extension || host.ipv4.ip_type.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "{:<width$} IN  A       {}\n",
            host.domain,
            host.ipv4.ipv4,
            width = HOST_COLUMN
        ));
        for address in &host.ipv6 {
            out.push_str(&format!(
                "{:<width$} IN  AAAA    {}\n",
                host.domain,
                address.ipv6,
                width = HOST_COLUMN
            ));
        }
    }
    out.push('\n');

    for alias in data.aliases.iter().filter(|r| r.extension == extension) {
        out.push_str(&alias.cname_entry);
        out.push('\n');
    }

    Ok(out)
}

/// `$TTL` directive and SOA record shared by forward and reverse zones.
pub(crate) fn soa_header(extension: &str, zone: &ZoneMeta, serial: &ZoneSerial) -> String {
    format!(
        "$TTL 2D\n\
         @ IN SOA ns{extension}. {mail} (\n    \
         {serial}; serial, todays date + todays serial\n\
         {param}\n\
         )\n",
        extension = extension,
        mail = zone.soa.mail,
        serial = serial.padded(),
        param = zone.soa.param,
    )
}

fn push_dotted(out: &mut String, entry: &str) {
    out.push_str(entry);
    if !entry.ends_with('.') {
        out.push('.');
    }
    out.push('\n');
}
