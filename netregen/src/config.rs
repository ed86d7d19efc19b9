//! Configuration loading and validation.
//!
//! One explicit [`Config`] struct is built at startup and passed by
//! reference into every component; there is no global configuration state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Candidate locations probed in order when `--config` is not given.
const CONFIG_FILES: &[&str] = &["/etc/netregen/config.toml", "./config.toml"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub dhcp: DhcpConfig,
    #[serde(default)]
    pub firewall: FirewallConfig,
    #[serde(default)]
    pub mailing: MailingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Directory service endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    /// Where session cookies are persisted between runs.
    #[serde(default = "default_cookie_file")]
    pub cookie_file: PathBuf,
}

impl ServerConfig {
    pub fn page_url(&self, page: &str) -> String {
        format!("{}{}/", self.url, page)
    }

    pub fn login_url(&self) -> String {
        self.page_url("login")
    }

    pub fn rest_url(&self, endpoint: &str) -> String {
        format!("{}machines/rest/{}/", self.url, endpoint)
    }

    pub fn rest_users_url(&self, endpoint: &str) -> String {
        format!("{}users/rest/{}/", self.url, endpoint)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    /// Nameserver flavor, doubling as the systemd unit name ("bind" or
    /// "knot").
    pub server: String,
    /// Zone checker invocation override. For bind-style checkers the zone
    /// origin and file path are appended; for knot only the file path.
    pub checkzone: Vec<String>,
    /// Reload command override.
    pub reload: Vec<String>,
}

impl Default for DnsConfig {
    fn default() -> Self {
        DnsConfig {
            server: "bind".to_string(),
            checkzone: Vec::new(),
            reload: Vec::new(),
        }
    }
}

impl DnsConfig {
    pub fn is_knot(&self) -> bool {
        self.server == "knot"
    }

    pub fn checkzone_command(&self) -> Vec<String> {
        if !self.checkzone.is_empty() {
            return self.checkzone.clone();
        }
        if self.is_knot() {
            vec!["kzonecheck".to_string()]
        } else {
            vec!["named-checkzone".to_string()]
        }
    }

    pub fn reload_command(&self) -> Vec<String> {
        if !self.reload.is_empty() {
            return self.reload.clone();
        }
        vec![
            "systemctl".to_string(),
            "reload".to_string(),
            self.server.clone(),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DhcpConfig {
    /// Syntax check for the full server configuration.
    pub check: Vec<String>,
    pub reload: Vec<String>,
}

impl Default for DhcpConfig {
    fn default() -> Self {
        DhcpConfig {
            check: vec![
                "/usr/sbin/dhcpd".to_string(),
                "-t".to_string(),
                "-cf".to_string(),
                "/etc/dhcp/dhcpd.conf".to_string(),
            ],
            reload: vec![
                "systemctl".to_string(),
                "restart".to_string(),
                "isc-dhcp-server".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    /// Command run after the MAC/IP allow-list has been written.
    pub refresh: Vec<String>,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        FirewallConfig {
            refresh: vec!["/usr/local/firewall/refreshmac.sh".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailingConfig {
    /// When set, only lists named here are managed; otherwise every list not
    /// on the blacklist is.
    pub use_whitelist: bool,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    /// Membership manager applying the generated files. Only "mailman" is
    /// supported; absent means files are written but not applied.
    pub manager: Option<String>,
    pub mailman_home: Option<PathBuf>,
    pub admin: String,
    pub password: String,
}

impl MailingConfig {
    /// Whether a list name passes the configured white/blacklist.
    pub fn allows(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if self.use_whitelist {
            self.whitelist.iter().any(|w| w.to_lowercase() == name)
        } else {
            !self.blacklist.iter().any(|b| b.to_lowercase() == name)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: PathBuf::from("generated"),
        }
    }
}

fn default_cookie_file() -> PathBuf {
    PathBuf::from(".cookies")
}

/// Errors returned when loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration file found (tried {0})")]
    NotFound(String),
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("unknown mailing manager '{0}' (only \"mailman\" is supported)")]
    UnknownMailingManager(String),
}

/// Load the configuration from an explicit path or the first existing
/// candidate location.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_file(path);
    }
    for candidate in CONFIG_FILES {
        let path = Path::new(candidate);
        if path.exists() {
            return load_file(path);
        }
    }
    Err(ConfigError::NotFound(CONFIG_FILES.join(", ")))
}

fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    if !config.server.url.ends_with('/') {
        config.server.url.push('/');
    }
    if let Some(manager) = &config.mailing.manager {
        if manager != "mailman" {
            return Err(ConfigError::UnknownMailingManager(manager.clone()));
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{load, ConfigError};

    #[test]
    fn minimal_config_gets_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
url = "https://directory.example.net"
username = "svc"
password = "secret"
"#,
        )
        .expect("write config");

        let config = load(Some(&path)).expect("config should parse");
        assert_eq!(config.server.url, "https://directory.example.net/");
        assert_eq!(config.dns.server, "bind");
        assert_eq!(config.dns.checkzone_command(), vec!["named-checkzone"]);
        assert_eq!(
            config.dns.reload_command(),
            vec!["systemctl", "reload", "bind"]
        );
        assert_eq!(config.output.dir.to_str(), Some("generated"));
    }

    #[test]
    fn rest_urls_are_built_from_base() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
url = "https://directory.example.net/"
username = "svc"
password = "secret"
"#,
        )
        .expect("write config");

        let config = load(Some(&path)).expect("config");
        assert_eq!(
            config.server.rest_url("mac-ip-dns"),
            "https://directory.example.net/machines/rest/mac-ip-dns/"
        );
        assert_eq!(
            config.server.rest_users_url("ml/std"),
            "https://directory.example.net/users/rest/ml/std/"
        );
        assert_eq!(
            config.server.login_url(),
            "https://directory.example.net/login/"
        );
    }

    #[test]
    fn knot_flavor_switches_checker_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
url = "https://directory.example.net/"
username = "svc"
password = "secret"

[dns]
server = "knot"
"#,
        )
        .expect("write config");

        let config = load(Some(&path)).expect("config");
        assert!(config.dns.is_knot());
        assert_eq!(config.dns.checkzone_command(), vec!["kzonecheck"]);
        assert_eq!(
            config.dns.reload_command(),
            vec!["systemctl", "reload", "knot"]
        );
    }

    #[test]
    fn unknown_mailing_manager_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
url = "https://directory.example.net/"
username = "svc"
password = "secret"

[mailing]
manager = "sympa"
"#,
        )
        .expect("write config");

        let err = load(Some(&path)).expect_err("should reject");
        match err {
            ConfigError::UnknownMailingManager(name) => assert_eq!(name, "sympa"),
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[test]
    fn broken_toml_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").expect("write broken file");

        let err = load(Some(&path)).expect_err("should fail parse");
        match err {
            ConfigError::Parse { .. } => {}
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[test]
    fn whitelist_and_blacklist_filter_case_insensitively() {
        let mut mailing = super::MailingConfig::default();
        mailing.blacklist = vec!["Hidden".to_string()];
        assert!(mailing.allows("members"));
        assert!(!mailing.allows("hidden"));

        mailing.use_whitelist = true;
        mailing.whitelist = vec!["Members".to_string()];
        assert!(mailing.allows("members"));
        assert!(!mailing.allows("club"));
    }
}
