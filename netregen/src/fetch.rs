//! Typed fetch helpers for the directory service endpoints.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use zonegen_core::{Extension, HostRecord, ZoneData};

use crate::client::{AuthClient, FetchError};
use crate::config::ServerConfig;

/// One entry of the per-server regeneration queue.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceStatus {
    pub service: String,
    pub server: String,
    pub need_regen: bool,
}

/// A mailing list as listed by the directory.
#[derive(Debug, Clone, Deserialize)]
pub struct MailingList {
    pub name: String,
}

/// One mailing-list member.
#[derive(Debug, Clone, Deserialize)]
pub struct MailingMember {
    pub email: String,
}

pub struct Fetcher<'a> {
    client: &'a mut AuthClient,
    server: &'a ServerConfig,
}

impl<'a> Fetcher<'a> {
    pub fn new(client: &'a mut AuthClient, server: &'a ServerConfig) -> Self {
        Fetcher { client, server }
    }

    pub fn hosts(&mut self) -> Result<Vec<HostRecord>, FetchError> {
        self.post_json(&self.server.rest_url("mac-ip-dns"))
    }

    pub fn extensions(&mut self) -> Result<Vec<Extension>, FetchError> {
        self.post_json(&self.server.rest_url("corresp"))
    }

    /// Everything the DNS renderers need, fetched in one pass.
    pub fn zone_data(&mut self) -> Result<ZoneData, FetchError> {
        Ok(ZoneData {
            hosts: self.post_json(&self.server.rest_url("mac-ip-dns"))?,
            extensions: self.post_json(&self.server.rest_url("corresp"))?,
            zones: self.post_json(&self.server.rest_url("zones"))?,
            mx: self.post_json(&self.server.rest_url("mx"))?,
            ns: self.post_json(&self.server.rest_url("ns"))?,
            txt: self.post_json(&self.server.rest_url("txt"))?,
            srv: self.post_json(&self.server.rest_url("srv"))?,
            aliases: self.post_json(&self.server.rest_url("alias"))?,
        })
    }

    /// Names of the services the directory marks for regeneration on this
    /// host.
    pub fn services_to_regen(&mut self, hostname: &str) -> Result<Vec<String>, FetchError> {
        let statuses: Vec<ServiceStatus> =
            self.post_json(&self.server.rest_url("service_servers"))?;
        Ok(statuses
            .into_iter()
            .filter(|s| s.need_regen && s.server == hostname)
            .map(|s| s.service)
            .collect())
    }

    /// Report a completed regeneration back to the directory.
    pub fn notify_regen(&mut self, service: &str, hostname: &str) -> Result<(), FetchError> {
        let url = self.server.rest_url("regen-achieved");
        let response = self
            .client
            .post_form(&url, &[("service", service), ("server", hostname)])?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }
        Ok(())
    }

    /// Standard mailing lists known to the directory.
    pub fn standard_mailing_lists(&mut self) -> Result<Vec<MailingList>, FetchError> {
        self.get_json(&self.server.rest_users_url("ml/std"))
    }

    /// Club mailing lists known to the directory.
    pub fn club_mailing_lists(&mut self) -> Result<Vec<MailingList>, FetchError> {
        self.get_json(&self.server.rest_users_url("ml/club"))
    }

    /// Member addresses for one list, e.g. `ml/std/member/<name>`.
    pub fn mailing_members(&mut self, endpoint: &str) -> Result<Vec<String>, FetchError> {
        let members: Vec<MailingMember> = self.get_json(&self.server.rest_users_url(endpoint))?;
        Ok(members.into_iter().map(|m| m.email).collect())
    }

    fn post_json<T: DeserializeOwned>(&mut self, url: &str) -> Result<T, FetchError> {
        let response = self.client.post(url)?;
        decode(url, response)
    }

    fn get_json<T: DeserializeOwned>(&mut self, url: &str) -> Result<T, FetchError> {
        let response = self.client.get(url)?;
        decode(url, response)
    }
}

fn decode<T: DeserializeOwned>(
    url: &str,
    response: reqwest::blocking::Response,
) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }
    response.json().map_err(|source| FetchError::Json {
        url: url.to_string(),
        source,
    })
}
