//! MAC/IP allow-list regeneration for the firewall.

use log::warn;
use zonegen_core::HostRecord;

use crate::client::AuthClient;
use crate::config::Config;
use crate::error::ServiceError;
use crate::exec;
use crate::fetch::Fetcher;
use crate::output::write_artifact;
use crate::progress::{Progress, Status};

/// Regenerate the allow-list and run the configured firewall refresh
/// command. The refresh is skipped when the list could not be written.
pub fn regen(config: &Config, client: &mut AuthClient, progress: Progress) -> Vec<ServiceError> {
    let mut errors = Vec::new();

    progress.step("Fetching MAC-IP data", Status::Running);
    let hosts = match Fetcher::new(client, &config.server).hosts() {
        Ok(hosts) => {
            progress.step("Fetching MAC-IP data", Status::Ok);
            hosts
        }
        Err(source) => {
            progress.step("Fetching MAC-IP data", Status::Error);
            errors.push(ServiceError::Fetch {
                what: "MAC-IP data",
                source,
            });
            return errors;
        }
    };

    if hosts.is_empty() {
        warn!("empty host list received, skipping MAC-IP list generation");
        return errors;
    }

    let text = render_list(&hosts);
    if let Err(source) = write_artifact(&config.output.dir, "mac-ip.list", &text) {
        errors.push(ServiceError::Write {
            path: config.output.dir.join("mac-ip.list"),
            source,
        });
        return errors;
    }

    progress.step("Refreshing firewall MAC set", Status::Running);
    match exec::check_output(&config.firewall.refresh) {
        Ok(_) => progress.step("Refreshing firewall MAC set", Status::Ok),
        Err(source) => {
            progress.step("Refreshing firewall MAC set", Status::Error);
            errors.push(ServiceError::Apply {
                what: "firewall MAC set".to_string(),
                source,
            });
        }
    }

    errors
}

/// One `<ipv4> <mac>` line per host with a non-empty address type, with a
/// trailing newline.
pub fn render_list(hosts: &[HostRecord]) -> String {
    let lines: Vec<String> = hosts
        .iter()
        .filter(|h| !h.ipv4.ip_type.is_empty())
        .map(|h| format!("{} {}", h.ipv4.ipv4, h.mac_address))
        .collect();
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
