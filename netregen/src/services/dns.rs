//! DNS zone regeneration: fetch, partition, render, write, verify, reload.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{info, warn};
use zonegen_core::{partition, render_forward, render_reverse, ReverseZone, ZoneData, ZoneSerial};

use crate::client::AuthClient;
use crate::config::Config;
use crate::error::ServiceError;
use crate::exec;
use crate::fetch::Fetcher;
use crate::output::write_artifact;
use crate::progress::{Progress, Status};

/// Full DNS regeneration. Every failed step is recorded; a non-empty error
/// list at the end suppresses the nameserver reload.
pub fn regen(config: &Config, client: &mut AuthClient, progress: Progress) -> Vec<ServiceError> {
    let mut run = DnsRegen::new(config, progress);
    run.fetch(client);
    run.render();
    run.write();
    run.check();
    run.reload();
    run.into_errors()
}

/// Render and write zone files only, skipping verification and reload. Used
/// by the `render-zones` dry run.
pub fn render_only(
    config: &Config,
    client: &mut AuthClient,
    progress: Progress,
) -> Vec<ServiceError> {
    let mut run = DnsRegen::new(config, progress);
    run.fetch(client);
    run.render();
    run.write();
    run.into_errors()
}

/// A written zone file awaiting verification.
struct PendingCheck {
    /// Zone origin handed to bind-style checkers.
    origin: String,
    path: PathBuf,
}

pub struct DnsRegen<'a> {
    config: &'a Config,
    progress: Progress,
    serial: ZoneSerial,
    data: Option<ZoneData>,
    forward: BTreeMap<String, String>,
    reverse: Vec<ReverseZone>,
    checks: Vec<PendingCheck>,
    errors: Vec<ServiceError>,
}

impl<'a> DnsRegen<'a> {
    pub fn new(config: &'a Config, progress: Progress) -> Self {
        Self::with_serial(config, progress, ZoneSerial::now())
    }

    /// Start from already-fetched data; used by tests and callers that
    /// manage fetching themselves.
    pub fn with_data(
        config: &'a Config,
        progress: Progress,
        data: ZoneData,
        serial: ZoneSerial,
    ) -> Self {
        let mut run = Self::with_serial(config, progress, serial);
        run.data = Some(data);
        run
    }

    fn with_serial(config: &'a Config, progress: Progress, serial: ZoneSerial) -> Self {
        DnsRegen {
            config,
            progress,
            serial,
            data: None,
            forward: BTreeMap::new(),
            reverse: Vec::new(),
            checks: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn fetch(&mut self, client: &mut AuthClient) {
        self.progress.step("Fetching DNS data", Status::Running);
        match Fetcher::new(client, &self.config.server).zone_data() {
            Ok(data) => {
                self.data = Some(data);
                self.progress.step("Fetching DNS data", Status::Ok);
            }
            Err(source) => {
                self.progress.step("Fetching DNS data", Status::Error);
                self.errors.push(ServiceError::Fetch {
                    what: "DNS data",
                    source,
                });
            }
        }
    }

    /// Render forward zones per extension and reverse zones per merged
    /// range group. Rendering failures are recorded per zone and skip only
    /// that zone.
    pub fn render(&mut self) {
        let Some(data) = self.data.clone() else {
            return;
        };
        if data.extensions.is_empty() {
            warn!("empty extension list received, nothing to render");
            return;
        }

        self.progress.step("Rendering forward zones", Status::Running);
        for extension in data.extension_names() {
            match render_forward(&extension, &data, &self.serial) {
                Ok(text) => {
                    self.forward.insert(extension, text);
                }
                Err(err) => {
                    warn!("skipping forward zone {extension}: {err}");
                    self.errors.push(err.into());
                }
            }
        }
        self.progress.step("Rendering forward zones", Status::Ok);

        self.progress.step("Rendering reverse zones", Status::Running);
        match partition(&data.extensions) {
            Ok(groups) => {
                for group in &groups {
                    match render_reverse(group, &data, &self.serial) {
                        Ok(zone) => self.reverse.push(zone),
                        Err(err) => {
                            warn!("skipping reverse zone {}: {err}", group.key());
                            self.errors.push(err.into());
                        }
                    }
                }
                self.progress.step("Rendering reverse zones", Status::Ok);
            }
            Err(err) => {
                self.progress.step("Rendering reverse zones", Status::Error);
                self.errors.push(err.into());
            }
        }
    }

    /// Write rendered zones under the output directory. A write failure
    /// skips that artifact's verification.
    pub fn write(&mut self) {
        let dir = &self.config.output.dir;
        for (extension, text) in &self.forward {
            let name = format!("db{extension}");
            match write_artifact(dir, &name, text) {
                Ok(path) => {
                    let origin = extension
                        .strip_prefix('.')
                        .unwrap_or(extension)
                        .to_string();
                    self.checks.push(PendingCheck { origin, path });
                }
                Err(source) => self.errors.push(ServiceError::Write {
                    path: dir.join(name),
                    source,
                }),
            }
        }
        for zone in &self.reverse {
            let name = format!("db_{}", zone.key);
            match write_artifact(dir, &name, &zone.text) {
                Ok(path) => self.checks.push(PendingCheck {
                    origin: zone.origin.clone(),
                    path,
                }),
                Err(source) => self.errors.push(ServiceError::Write {
                    path: dir.join(name),
                    source,
                }),
            }
        }
    }

    /// Verify every written zone file with the configured checker.
    pub fn check(&mut self) {
        let command = self.config.dns.checkzone_command();
        for check in &self.checks {
            let label = format!("Checking zone {}", check.origin);
            self.progress.step(&label, Status::Running);
            let path = check.path.display().to_string();
            let result = if self.config.dns.is_knot() {
                exec::check_output_with(&command, &[path.as_str()])
            } else {
                exec::check_output_with(&command, &[check.origin.as_str(), path.as_str()])
            };
            match result {
                Ok(_) => self.progress.step(&label, Status::Ok),
                Err(source) => {
                    self.progress.step(&label, Status::Error);
                    self.errors.push(ServiceError::Check {
                        target: check.origin.clone(),
                        source,
                    });
                }
            }
        }
    }

    /// Reload the nameserver, unless any earlier step recorded an error.
    pub fn reload(&mut self) {
        let server = &self.config.dns.server;
        if !self.errors.is_empty() {
            info!(
                "skipping {server} reload: {} error(s) recorded",
                self.errors.len()
            );
            return;
        }
        let label = format!("Reloading {server}");
        self.progress.step(&label, Status::Running);
        match exec::check_output(&self.config.dns.reload_command()) {
            Ok(_) => self.progress.step(&label, Status::Ok),
            Err(source) => {
                self.progress.step(&label, Status::Error);
                self.errors.push(ServiceError::Reload {
                    service: server.clone(),
                    source,
                });
            }
        }
    }

    pub fn errors(&self) -> &[ServiceError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ServiceError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use zonegen_core::{
        Extension, HostRecord, Ipv4Assignment, SoaMeta, ZoneData, ZoneMeta, ZoneSerial,
    };

    use super::DnsRegen;
    use crate::config::{Config, DnsConfig};
    use crate::progress::Progress;

    fn sample_data() -> ZoneData {
        ZoneData {
            hosts: vec![HostRecord {
                domain: "srv".to_string(),
                extension: ".test".to_string(),
                mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
                ipv4: Ipv4Assignment {
                    ipv4: "10.69.0.1".to_string(),
                    ip_type: "srv".to_string(),
                },
                ipv6: Vec::new(),
            }],
            extensions: vec![Extension {
                extension: ".test".to_string(),
                ip_type: "srv".to_string(),
                domaine_ip_start: "10.69.0.1".to_string(),
                domaine_ip_stop: "10.69.0.1".to_string(),
            }],
            zones: vec![ZoneMeta {
                name: ".test".to_string(),
                soa: SoaMeta {
                    mail: "root.test.".to_string(),
                    param: "    3600 900 604800 86400".to_string(),
                },
                zone_entry: "@               IN  A       10.69.0.1".to_string(),
            }],
            ..ZoneData::default()
        }
    }

    fn serial() -> ZoneSerial {
        ZoneSerial::from_datetime(
            NaiveDate::from_ymd_opt(2024, 3, 7)
                .expect("date")
                .and_hms_opt(10, 0, 0)
                .expect("time"),
        )
    }

    fn test_config(out_dir: &std::path::Path, checkzone: &str, reload: Vec<String>) -> Config {
        let raw = r#"
[server]
url = "http://127.0.0.1:9/"
username = "svc"
password = "secret"
"#;
        let mut config: Config = toml::from_str(raw).expect("config");
        config.output.dir = out_dir.to_path_buf();
        config.dns = DnsConfig {
            server: "bind".to_string(),
            checkzone: vec![checkzone.to_string()],
            reload,
        };
        config
    }

    #[test]
    fn zone_files_land_in_the_output_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir.path().join("generated"), "true", vec!["true".into()]);
        let mut run = DnsRegen::with_data(&config, Progress::new(true), sample_data(), serial());
        run.render();
        run.write();

        let forward = config.output.dir.join("db.test");
        let reverse = config.output.dir.join("db_10.69.0.1");
        let text = std::fs::read_to_string(forward).expect("forward zone");
        assert!(text.contains("srv             IN  A       10.69.0.1"));
        let text = std::fs::read_to_string(reverse).expect("reverse zone");
        assert!(text.contains("IN  PTR     srv.test."));
    }

    #[test]
    fn failed_zone_check_suppresses_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join("reloaded");
        let config = test_config(
            &dir.path().join("generated"),
            "false",
            vec!["touch".to_string(), marker.display().to_string()],
        );
        let mut run = DnsRegen::with_data(&config, Progress::new(true), sample_data(), serial());
        run.render();
        run.write();
        run.check();
        run.reload();

        assert!(!run.errors().is_empty());
        assert!(!marker.exists(), "reload must not run after a failed check");
    }

    #[test]
    fn clean_run_reaches_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join("reloaded");
        let config = test_config(
            &dir.path().join("generated"),
            "true",
            vec!["touch".to_string(), marker.display().to_string()],
        );
        let mut run = DnsRegen::with_data(&config, Progress::new(true), sample_data(), serial());
        run.render();
        run.write();
        run.check();
        run.reload();

        assert!(run.errors().is_empty(), "errors: {:?}", run.errors());
        assert!(marker.exists());
    }

    #[test]
    fn missing_zone_metadata_is_recorded_and_blocks_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join("reloaded");
        let config = test_config(
            &dir.path().join("generated"),
            "true",
            vec!["touch".to_string(), marker.display().to_string()],
        );
        let mut data = sample_data();
        data.zones.clear();
        let mut run = DnsRegen::with_data(&config, Progress::new(true), data, serial());
        run.render();
        run.write();
        run.check();
        run.reload();

        assert!(!run.errors().is_empty());
        assert!(!marker.exists());
    }
}
