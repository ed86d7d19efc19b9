//! Authenticated HTTP client for the directory service.
//!
//! Redirects are disabled on purpose: the directory answers authenticated
//! requests directly and redirects to its login page when the session is
//! stale, so a redirect status is the re-authentication signal. `get` and
//! `post` re-login once and retry before giving up. Session cookies are
//! persisted between runs so most invocations skip the login round-trip.

use std::collections::HashMap;
use std::fs;
use std::io;

use log::warn;
use reqwest::blocking::{Client, Response};
use reqwest::header::{COOKIE, REFERER, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::Method;
use thiserror::Error;

use crate::config::ServerConfig;

/// Errors surfaced by the data fetcher layer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("response from {url} is not the expected JSON shape: {source}")]
    Json { url: String, source: reqwest::Error },
    #[error("login page did not set a csrf token")]
    MissingCsrfToken,
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

pub struct AuthClient {
    http: Client,
    server: ServerConfig,
    cookies: HashMap<String, String>,
}

impl AuthClient {
    pub fn new(server: ServerConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(FetchError::Client)?;
        let mut client = AuthClient {
            http,
            server,
            cookies: HashMap::new(),
        };
        client.load_cookies();
        Ok(client)
    }

    /// Restore session cookies saved by a previous run. A missing or
    /// unreadable file only costs a fresh login.
    fn load_cookies(&mut self) {
        let path = self.server.cookie_file.clone();
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(cookies) => self.cookies = cookies,
                Err(err) => warn!("ignoring malformed cookie file {}: {err}", path.display()),
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("could not read cookie file {}: {err}", path.display()),
        }
    }

    /// Persist session cookies for the next run. The csrf token is
    /// deliberately not saved; it is re-fetched on login.
    pub fn save_cookies(&self) {
        let mut cookies = self.cookies.clone();
        cookies.remove("csrftoken");
        let raw = match serde_json::to_string(&cookies) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("could not serialize cookies: {err}");
                return;
            }
        };
        if let Err(err) = fs::write(&self.server.cookie_file, raw) {
            warn!(
                "could not write cookie file {}: {err}",
                self.server.cookie_file.display()
            );
        }
    }

    /// Authenticate against the directory: fetch the login page for a csrf
    /// token, then submit the credential form.
    pub fn login(&mut self) -> Result<(), FetchError> {
        let login_url = self.server.login_url();
        self.send(Method::GET, &login_url, None)?;

        let token = self
            .cookies
            .get("csrftoken")
            .cloned()
            .ok_or(FetchError::MissingCsrfToken)?;
        let form = [
            ("username", self.server.username.clone()),
            ("password", self.server.password.clone()),
            ("csrfmiddlewaretoken", token),
        ];

        let mut builder = self
            .http
            .post(&login_url)
            .header(REFERER, login_url.clone())
            .form(&form);
        if !self.cookies.is_empty() {
            builder = builder.header(COOKIE, self.cookie_header());
        }
        let response = builder.send().map_err(|source| FetchError::Http {
            url: login_url.clone(),
            source,
        })?;
        self.absorb_cookies(&response);
        Ok(())
    }

    pub fn get(&mut self, url: &str) -> Result<Response, FetchError> {
        self.request(Method::GET, url, None)
    }

    pub fn post(&mut self, url: &str) -> Result<Response, FetchError> {
        self.request(Method::POST, url, None)
    }

    pub fn post_form(
        &mut self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<Response, FetchError> {
        self.request(Method::POST, url, Some(form))
    }

    fn request(
        &mut self,
        method: Method,
        url: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Response, FetchError> {
        let response = self.send(method.clone(), url, form)?;
        if !response.status().is_redirection() {
            return Ok(response);
        }

        self.login()?;
        let response = self.send(method, url, form)?;
        if response.status().is_redirection() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        Ok(response)
    }

    fn send(
        &mut self,
        method: Method,
        url: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Response, FetchError> {
        let mut builder = self.http.request(method, url);
        if !self.cookies.is_empty() {
            builder = builder.header(COOKIE, self.cookie_header());
        }
        if let Some(form) = form {
            builder = builder.form(form);
        }
        let response = builder.send().map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        self.absorb_cookies(&response);
        Ok(response)
    }

    fn cookie_header(&self) -> String {
        let mut pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        pairs.sort();
        pairs.join("; ")
    }

    fn absorb_cookies(&mut self, response: &Response) {
        for value in response.headers().get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let Some(pair) = raw.split(';').next() else {
                continue;
            };
            if let Some((name, value)) = pair.split_once('=') {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
}
