//! Error taxonomy for regeneration runs.

use std::path::PathBuf;

use thiserror::Error;

use crate::client::FetchError;
use crate::exec::ExecError;

/// One recorded failure from a regeneration step.
///
/// Errors accumulate per service and are returned to the caller; a failed
/// step aborts only its dependents, never the whole run. A non-empty error
/// list suppresses the service's reload (never reload with known-bad
/// config).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("fetching {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: FetchError,
    },
    #[error("rendering zones: {0}")]
    Render(#[from] zonegen_core::ZoneError),
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("checking {target}: {source}")]
    Check {
        target: String,
        #[source]
        source: ExecError,
    },
    #[error("reloading {service}: {source}")]
    Reload {
        service: String,
        #[source]
        source: ExecError,
    },
    #[error("applying {what}: {source}")]
    Apply {
        what: String,
        #[source]
        source: ExecError,
    },
    #[error("unknown service '{0}'")]
    UnknownService(String),
}
