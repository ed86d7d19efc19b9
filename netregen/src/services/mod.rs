//! Service orchestration: which services to regenerate and in what order.

use log::{info, warn};

use crate::client::AuthClient;
use crate::config::Config;
use crate::error::ServiceError;
use crate::fetch::Fetcher;
use crate::progress::{Progress, Status};

pub mod dhcp;
pub mod dns;
pub mod mac_ip;
pub mod mailing;
mod mailman;

/// Closed set of regenerable services. Service names coming from the
/// directory or the command line are validated against this set up front, so
/// an unknown name is a reportable error instead of a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Dns,
    Dhcp,
    MacIpList,
    Mailing,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Dns,
        ServiceKind::Dhcp,
        ServiceKind::MacIpList,
        ServiceKind::Mailing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Dns => "dns",
            ServiceKind::Dhcp => "dhcp",
            ServiceKind::MacIpList => "mac_ip_list",
            ServiceKind::Mailing => "mailing",
        }
    }

    pub fn parse(name: &str) -> Result<Self, ServiceError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ServiceError::UnknownService(name.to_string()))
    }
}

/// Orchestrates one regeneration run across the requested services.
pub struct Services<'a> {
    config: &'a Config,
    client: &'a mut AuthClient,
    progress: Progress,
    hostname: String,
    notify: bool,
    to_regen: Vec<ServiceKind>,
    pub errors: Vec<ServiceError>,
}

impl<'a> Services<'a> {
    pub fn new(
        config: &'a Config,
        client: &'a mut AuthClient,
        progress: Progress,
        notify: bool,
    ) -> Self {
        Services {
            config,
            client,
            progress,
            hostname: local_hostname(),
            notify,
            to_regen: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Ask the directory which services this host should regenerate.
    pub fn fetch_to_regen(&mut self) {
        self.progress.step("Services to regenerate", Status::Running);
        let names = Fetcher::new(self.client, &self.config.server)
            .services_to_regen(&self.hostname);
        match names {
            Ok(names) => {
                for name in names {
                    match ServiceKind::parse(&name) {
                        Ok(kind) => self.enqueue(kind),
                        Err(err) => {
                            warn!("{err}");
                            self.errors.push(err);
                        }
                    }
                }
                self.progress.step("Services to regenerate", Status::Ok);
                info!(
                    "services queued for {}: {:?}",
                    self.hostname,
                    self.queued_names()
                );
            }
            Err(source) => {
                self.progress.step("Services to regenerate", Status::Error);
                self.errors.push(ServiceError::Fetch {
                    what: "services to regenerate",
                    source,
                });
            }
        }
    }

    /// Queue one more service by name, e.g. from a CLI argument.
    pub fn force(&mut self, name: &str) {
        match ServiceKind::parse(name) {
            Ok(kind) => self.enqueue(kind),
            Err(err) => {
                warn!("{err}");
                self.errors.push(err);
            }
        }
    }

    pub fn queued_names(&self) -> Vec<&'static str> {
        self.to_regen.iter().map(|kind| kind.name()).collect()
    }

    /// Run every queued service, reporting completed regenerations back to
    /// the directory unless notification is disabled.
    pub fn regen_all(&mut self) {
        let queue = self.to_regen.clone();
        for kind in queue {
            let label = format!("Regenerating {}", kind.name());
            self.progress.step(&label, Status::Running);
            let errors = self.run(kind);
            if errors.is_empty() {
                self.progress.step(&label, Status::Ok);
                if self.notify {
                    self.notify_done(kind);
                }
            } else {
                self.progress.step(&label, Status::Error);
                self.errors.extend(errors);
            }
        }
    }

    fn enqueue(&mut self, kind: ServiceKind) {
        if !self.to_regen.contains(&kind) {
            self.to_regen.push(kind);
        }
    }

    fn run(&mut self, kind: ServiceKind) -> Vec<ServiceError> {
        match kind {
            ServiceKind::Dns => dns::regen(self.config, self.client, self.progress),
            ServiceKind::Dhcp => dhcp::regen(self.config, self.client, self.progress),
            ServiceKind::MacIpList => mac_ip::regen(self.config, self.client, self.progress),
            ServiceKind::Mailing => mailing::regen(self.config, self.client, self.progress),
        }
    }

    /// Failure to deliver the notification is logged but does not fail the
    /// service; the directory will simply re-request the regeneration.
    fn notify_done(&mut self, kind: ServiceKind) {
        let label = format!("Notifying regeneration of {}", kind.name());
        self.progress.step(&label, Status::Running);
        let result = Fetcher::new(self.client, &self.config.server)
            .notify_regen(kind.name(), &self.hostname);
        match result {
            Ok(()) => self.progress.step(&label, Status::Ok),
            Err(err) => {
                warn!("could not notify regeneration of {}: {err}", kind.name());
                self.progress.step(&label, Status::Warning);
            }
        }
    }
}

/// Short local hostname, matching how the directory names servers.
fn local_hostname() -> String {
    let full = hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_default();
    full.split('.').next().unwrap_or("").to_string()
}
