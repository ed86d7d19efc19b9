//! DHCP lease list regeneration for isc-dhcp-server.

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};
use zonegen_core::{Extension, HostRecord};

use crate::client::AuthClient;
use crate::config::Config;
use crate::error::ServiceError;
use crate::exec;
use crate::fetch::Fetcher;
use crate::output::write_artifact;
use crate::progress::{Progress, Status};

/// Regenerate the per-type lease lists, check the server configuration and
/// restart the DHCP server. The restart is skipped when the syntax check
/// fails.
pub fn regen(config: &Config, client: &mut AuthClient, progress: Progress) -> Vec<ServiceError> {
    let mut errors = Vec::new();
    let mut fetcher = Fetcher::new(client, &config.server);

    progress.step("Fetching host and range data", Status::Running);
    let fetched = fetcher
        .hosts()
        .and_then(|hosts| fetcher.extensions().map(|extensions| (hosts, extensions)));
    let (hosts, extensions) = match fetched {
        Ok(data) => {
            progress.step("Fetching host and range data", Status::Ok);
            data
        }
        Err(source) => {
            progress.step("Fetching host and range data", Status::Error);
            errors.push(ServiceError::Fetch {
                what: "DHCP data",
                source,
            });
            return errors;
        }
    };

    if hosts.is_empty() {
        warn!("empty host list received, skipping DHCP generation");
        return errors;
    }

    for (tag, text) in render_leases(&hosts, &extensions) {
        let name = format!("dhcp-{}.list", normalize_tag(&tag));
        match write_artifact(&config.output.dir, &name, &text) {
            Ok(path) => info!("wrote {}", path.display()),
            Err(source) => errors.push(ServiceError::Write {
                path: config.output.dir.join(name),
                source,
            }),
        }
    }

    progress.step("Checking DHCP configuration", Status::Running);
    match exec::check_output(&config.dhcp.check) {
        Ok(_) => progress.step("Checking DHCP configuration", Status::Ok),
        Err(source) => {
            progress.step("Checking DHCP configuration", Status::Error);
            errors.push(ServiceError::Check {
                target: "dhcpd configuration".to_string(),
                source,
            });
            return errors;
        }
    }

    progress.step("Restarting DHCP server", Status::Running);
    match exec::check_output(&config.dhcp.reload) {
        Ok(_) => progress.step("Restarting DHCP server", Status::Ok),
        Err(source) => {
            progress.step("Restarting DHCP server", Status::Error);
            errors.push(ServiceError::Reload {
                service: "isc-dhcp-server".to_string(),
                source,
            });
        }
    }

    errors
}

/// One `host` stanza per matching host, grouped by the extension type tag.
/// Every declared tag gets a file, even when no host carries it.
pub fn render_leases(
    hosts: &[HostRecord],
    extensions: &[Extension],
) -> BTreeMap<String, String> {
    let tags: BTreeSet<&str> = extensions.iter().map(|e| e.ip_type.as_str()).collect();
    let mut out = BTreeMap::new();
    for tag in tags {
        let stanzas: Vec<String> = hosts
            .iter()
            .filter(|h| h.ipv4.ip_type == tag)
            .map(|h| {
                format!(
                    "host {}{} {{\n    hardware ethernet {};\n    fixed-address {};\n}}",
                    h.domain, h.extension, h.mac_address, h.ipv4.ipv4
                )
            })
            .collect();
        out.insert(tag.to_string(), stanzas.join("\n\n"));
    }
    out
}

/// File-name-safe rendition of a type tag: spaces become underscores,
/// common accented letters fold to ASCII, anything else non-ASCII is
/// dropped.
pub fn normalize_tag(tag: &str) -> String {
    tag.chars().filter_map(fold_char).collect()
}

fn fold_char(c: char) -> Option<char> {
    match c {
        ' ' => Some('_'),
        'à' | 'â' | 'ä' => Some('a'),
        'é' | 'è' | 'ê' | 'ë' => Some('e'),
        'î' | 'ï' => Some('i'),
        'ô' | 'ö' => Some('o'),
        'ù' | 'û' | 'ü' => Some('u'),
        'ç' => Some('c'),
        c if c.is_ascii() => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use zonegen_core::{Extension, HostRecord, Ipv4Assignment};

    use super::{normalize_tag, render_leases};

    fn host(domain: &str, extension: &str, mac: &str, ipv4: &str, tag: &str) -> HostRecord {
        HostRecord {
            domain: domain.to_string(),
            extension: extension.to_string(),
            mac_address: mac.to_string(),
            ipv4: Ipv4Assignment {
                ipv4: ipv4.to_string(),
                ip_type: tag.to_string(),
            },
            ipv6: Vec::new(),
        }
    }

    fn extension(tag: &str) -> Extension {
        Extension {
            extension: ".test".to_string(),
            ip_type: tag.to_string(),
            domaine_ip_start: "10.69.0.1".to_string(),
            domaine_ip_stop: "10.69.0.254".to_string(),
        }
    }

    #[test]
    fn stanza_carries_fqdn_mac_and_address() {
        let hosts = vec![host("srv", ".test", "AA:BB:CC:DD:EE:FF", "10.69.0.1", "srv")];
        let leases = render_leases(&hosts, &[extension("srv")]);
        assert_eq!(
            leases["srv"],
            "host srv.test {\n    hardware ethernet AA:BB:CC:DD:EE:FF;\n    fixed-address 10.69.0.1;\n}"
        );
    }

    #[test]
    fn stanzas_are_separated_by_blank_lines() {
        let hosts = vec![
            host("a", ".test", "AA:AA:AA:AA:AA:AA", "10.69.0.1", "srv"),
            host("b", ".test", "BB:BB:BB:BB:BB:BB", "10.69.0.2", "srv"),
        ];
        let leases = render_leases(&hosts, &[extension("srv")]);
        assert_eq!(leases["srv"].matches("\n\n").count(), 1);
    }

    #[test]
    fn hosts_are_grouped_by_type_tag() {
        let hosts = vec![
            host("a", ".test", "AA:AA:AA:AA:AA:AA", "10.69.0.1", "srv"),
            host("b", ".test", "BB:BB:BB:BB:BB:BB", "10.69.0.2", "member"),
        ];
        let leases = render_leases(&hosts, &[extension("srv"), extension("member")]);
        assert!(leases["srv"].contains("host a.test"));
        assert!(!leases["srv"].contains("host b.test"));
        assert!(leases["member"].contains("host b.test"));
    }

    #[test]
    fn declared_tag_without_hosts_still_gets_a_file() {
        let leases = render_leases(&[], &[extension("printer")]);
        assert_eq!(leases["printer"], "");
    }

    #[test]
    fn tags_are_normalized_for_file_names() {
        assert_eq!(normalize_tag("adhérent wifi"), "adherent_wifi");
        assert_eq!(normalize_tag("srv"), "srv");
        assert_eq!(normalize_tag("héb€rgement"), "hebrgement");
    }
}
